mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    Action, Flow, FlowContext, login_action, login_admin_action, register_action, seed_admin,
    seed_course, seed_lessons, setup_server, setup_test_db,
};

fn approve_action(key: &'static str) -> Action {
    Action::new("approve", "PATCH", "dynamic")
        .with_dyn_path(move |ctx: &FlowContext| {
            format!(
                "/api/v1/registrations/{}/action",
                ctx.get(key)["id"].as_str().unwrap()
            )
        })
        .with_bearer_from("admin")
        .with_body(json!({ "action": "approve" }))
}

#[tokio::test]
async fn route_dashboard_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Woodworking").await;
    seed_lessons(&pool, course_id, 2).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id).with_save_as("reg"))
        .step(login_admin_action().with_save_as("admin"))
        .step(approve_action("reg"))
        .step(login_action("amy@rollcall.test", "longenoughpw").with_save_as("student"))
        .step(
            Action::new("dashboard", "GET", "/api/v1/students/dashboard")
                .with_bearer_from("student")
                .assert_body(|body| {
                    assert!(body.contains("Woodworking"));
                    assert!(body.contains("enrollments"));
                    assert!(body.contains("\"total_lessons\":2"));
                    assert!(body.contains("\"percent\":0"));
                }),
        )
        // the admin account has no student profile
        .step(
            Action::new("dashboard_admin", "GET", "/api/v1/students/dashboard")
                .with_bearer_from("admin")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_student_detail_access_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Access Control").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id).with_save_as("reg_a"))
        .step(register_action("bob@rollcall.test", "longenoughpw", course_id).with_save_as("reg_b"))
        .step(login_admin_action().with_save_as("admin"))
        .step(approve_action("reg_a"))
        .step(approve_action("reg_b"))
        .step(login_action("amy@rollcall.test", "longenoughpw").with_save_as("amy"))
        // a student can read their own record
        .step(
            Action::new("self_detail", "GET", "dynamic")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/students/{}",
                        ctx.get("reg_a")["student_id"].as_str().unwrap()
                    )
                })
                .with_bearer_from("amy")
                .assert_body(|body| {
                    assert!(body.contains("Jamie"));
                    assert!(body.contains("Access Control"));
                }),
        )
        // but not somebody else's
        .step(
            Action::new("other_detail", "GET", "dynamic")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/students/{}",
                        ctx.get("reg_b")["student_id"].as_str().unwrap()
                    )
                })
                .with_bearer_from("amy")
                .with_expect(StatusCode::FORBIDDEN),
        )
        // the admin can read anybody
        .step(
            Action::new("admin_detail", "GET", "dynamic")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/students/{}",
                        ctx.get("reg_b")["student_id"].as_str().unwrap()
                    )
                })
                .with_bearer_from("admin")
                .with_expect(StatusCode::OK),
        )
        // unknown student id
        .step(
            Action::new("missing_detail", "GET", "dynamic")
                .with_dyn_path(|_| format!("/api/v1/students/{}", Uuid::new_v4()))
                .with_bearer_from("admin")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_lesson_complete_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Lessons Galore").await;
    let lesson_ids = seed_lessons(&pool, course_id, 2).await;
    let other_course = seed_course(&pool, "Not Enrolled").await;
    let other_lessons = seed_lessons(&pool, other_course, 1).await;
    let mut server = setup_server(&pool).await;

    let first_lesson = lesson_ids[0];
    let foreign_lesson = other_lessons[0];

    Flow::new()
        .step(register_action("amy@rollcall.test", "longenoughpw", course_id).with_save_as("reg"))
        .step(login_admin_action().with_save_as("admin"))
        .step(approve_action("reg"))
        .step(login_action("amy@rollcall.test", "longenoughpw").with_save_as("student"))
        .step(
            Action::new("complete", "POST", "dynamic")
                .with_dyn_path(move |_| format!("/api/v1/lessons/{first_lesson}/complete"))
                .with_bearer_from("student")
                .with_expect(StatusCode::NO_CONTENT),
        )
        // completing again changes nothing
        .step(
            Action::new("complete_again", "POST", "dynamic")
                .with_dyn_path(move |_| format!("/api/v1/lessons/{first_lesson}/complete"))
                .with_bearer_from("student")
                .with_expect(StatusCode::NO_CONTENT),
        )
        .step(
            Action::new("dashboard", "GET", "/api/v1/students/dashboard")
                .with_bearer_from("student")
                .assert_body(|body| {
                    assert!(body.contains("\"completed_lessons\":1"));
                    assert!(body.contains("\"percent\":50"));
                }),
        )
        // a lesson in a course the student never enrolled in
        .step(
            Action::new("complete_foreign", "POST", "dynamic")
                .with_dyn_path(move |_| format!("/api/v1/lessons/{foreign_lesson}/complete"))
                .with_bearer_from("student")
                .with_expect(StatusCode::FORBIDDEN),
        )
        // unknown lesson
        .step(
            Action::new("complete_missing", "POST", "dynamic")
                .with_dyn_path(|_| format!("/api/v1/lessons/{}/complete", Uuid::new_v4()))
                .with_bearer_from("student")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
