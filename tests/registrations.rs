mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    Action, Flow, login_action, login_admin_action, register_action, seed_admin, seed_course,
    seed_lessons, setup_server, setup_test_db,
};

fn action_path(ctx: &common::FlowContext, key: &str) -> String {
    format!(
        "/api/v1/registrations/{}/action",
        ctx.get(key)["id"].as_str().unwrap()
    )
}

#[tokio::test]
async fn route_registration_create_test() {
    let pool = setup_test_db().await;
    let course_id = seed_course(&pool, "Intro to Pottery").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        // unknown course
        .step(
            register_action("amy@rollcall.test", "longenoughpw", Uuid::new_v4())
                .with_expect(StatusCode::NOT_FOUND),
        )
        // weak password is rejected before anything is created
        .step(
            register_action("amy@rollcall.test", "short", course_id)
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("VALIDATION_ERROR"));
                    assert!(body.contains("password"));
                }),
        )
        .step(
            register_action("amy@rollcall.test", "longenoughpw", course_id).assert_body(|body| {
                assert!(body.contains("pending"));
            }),
        )
        // second live registration for the same pair
        .step(
            register_action("amy@rollcall.test", "longenoughpw", course_id)
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| assert!(body.contains("REGISTRATION_EXISTS"))),
        )
        // account exists but is inactive until approval
        .step(
            login_action("amy@rollcall.test", "longenoughpw")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("ACCOUNT_INACTIVE"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_registration_missing_field_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("register_no_course", "POST", "/api/v1/registrations")
                .with_body(json!({
                    "email": "amy@rollcall.test",
                    "password": "longenoughpw",
                    "first_name": "Amy",
                    "last_name": "Pond",
                }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("VALIDATION_ERROR"));
                    assert!(body.contains("course_id"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_registration_list_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_a = seed_course(&pool, "Course A").await;
    let course_b = seed_course(&pool, "Course B").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("one@rollcall.test", "longenoughpw", course_a))
        .step(register_action("two@rollcall.test", "longenoughpw", course_b))
        // admin only
        .step(
            Action::new("list_anon", "GET", "/api/v1/registrations")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("list", "GET", "/api/v1/registrations")
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("\"total\":2"));
                    assert!(body.contains("items"));
                    assert!(body.contains("pages"));
                }),
        )
        // status and course filters
        .step(
            Action::new("list_filtered", "GET", "/api/v1/registrations")
                .with_bearer_from("admin")
                .with_param("status", "pending")
                .with_param("course_id", &course_a.to_string())
                .assert_body(|body| assert!(body.contains("\"total\":1"))),
        )
        .step(
            Action::new("list_rejected_empty", "GET", "/api/v1/registrations")
                .with_bearer_from("admin")
                .with_param("status", "rejected")
                .assert_body(|body| assert!(body.contains("\"total\":0"))),
        )
        // out-of-range limit
        .step(
            Action::new("list_bad_limit", "GET", "/api/v1/registrations")
                .with_bearer_from("admin")
                .with_param("limit", "500")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_registration_approve_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Approvals 101").await;
    seed_lessons(&pool, course_id, 3).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id).with_save_as("reg"))
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("approve", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg"))
                .with_bearer_from("admin")
                .with_body(json!({ "action": "approve" }))
                .assert_body(|body| assert!(body.contains("approved"))),
        )
        // deciding twice
        .step(
            Action::new("approve_again", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg"))
                .with_bearer_from("admin")
                .with_body(json!({ "action": "approve" }))
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| assert!(body.contains("REGISTRATION_DECIDED"))),
        )
        // approval activated the account
        .step(login_action("amy@rollcall.test", "longenoughpw").with_save_as("student"))
        // and created the enrollment with a primed progress row
        .step(
            Action::new("dashboard", "GET", "/api/v1/students/dashboard")
                .with_bearer_from("student")
                .assert_body(|body| {
                    assert!(body.contains("Approvals 101"));
                    assert!(body.contains("\"total_lessons\":3"));
                    assert!(body.contains("\"completed_lessons\":0"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_registration_reject_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Rejections 101").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id).with_save_as("reg"))
        .step(login_admin_action().with_save_as("admin"))
        // rejection without a usable message
        .step(
            Action::new("reject_no_message", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg"))
                .with_bearer_from("admin")
                .with_body(json!({ "action": "reject" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("at least 10 characters"))),
        )
        .step(
            Action::new("reject_padded_message", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg"))
                .with_bearer_from("admin")
                .with_body(json!({ "action": "reject", "message": "   short    " }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("reject", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg"))
                .with_bearer_from("admin")
                .with_body(json!({
                    "action": "reject",
                    "message": "missing prerequisite coursework",
                }))
                .assert_body(|body| {
                    assert!(body.contains("rejected"));
                    assert!(body.contains("missing prerequisite coursework"));
                }),
        )
        // the rejected account stays locked out
        .step(
            login_action("amy@rollcall.test", "longenoughpw")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // a rejection frees the pair for a fresh attempt
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_registration_action_requires_admin_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Locked Down").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id).with_save_as("reg"))
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("approve", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg"))
                .with_bearer_from("admin")
                .with_body(json!({ "action": "approve" })),
        )
        .step(login_action("amy@rollcall.test", "longenoughpw").with_save_as("student"))
        .step(register_action("bob@rollcall.test", "longenoughpw", course_id).with_save_as("reg2"))
        // a student holding a valid token is still not an admin
        .step(
            Action::new("approve_as_student", "PATCH", "dynamic")
                .with_dyn_path(|ctx| action_path(ctx, "reg2"))
                .with_bearer_from("student")
                .with_body(json!({ "action": "approve" }))
                .with_expect(StatusCode::FORBIDDEN)
                .assert_body(|body| assert!(body.contains("FORBIDDEN"))),
        )
        // unknown registration id
        .step(
            Action::new("approve_unknown", "PATCH", "dynamic")
                .with_dyn_path(|_| {
                    format!("/api/v1/registrations/{}/action", Uuid::new_v4())
                })
                .with_bearer_from("admin")
                .with_body(json!({ "action": "approve" }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
