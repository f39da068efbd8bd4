mod common;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    ADMIN_EMAIL, Action, Flow, login_action, login_admin_action, register_action, seed_admin,
    seed_course, setup_server, setup_test_db,
};

#[tokio::test]
async fn route_login_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            login_admin_action()
                .assert_body(|body| {
                    assert!(body.contains("token"));
                    assert!(body.contains(ADMIN_EMAIL));
                    // the digest must never appear on the wire
                    assert!(!body.contains("password_hash"));
                })
                .with_expect(StatusCode::OK),
        )
        // wrong password
        .step(
            login_action(ADMIN_EMAIL, "WRONGPASSWORD")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("INVALID_CREDENTIALS"))),
        )
        // non-existing account
        .step(
            login_action("nobody@rollcall.test", "nvm")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("INVALID_CREDENTIALS"))),
        )
        // malformed email never reaches the database
        .step(
            login_action("not-an-email", "whatever")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("VALIDATION_ERROR"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_profile_requires_token_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        // no Authorization header at all
        .step(
            Action::new("profile_no_token", "GET", "/api/v1/auth/profile")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("TOKEN_MISSING"))),
        )
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("profile", "GET", "/api/v1/auth/profile")
                .with_bearer_from("admin")
                .with_expect(StatusCode::OK)
                .assert_body(|body| {
                    assert!(body.contains(ADMIN_EMAIL));
                    assert!(!body.contains("password_hash"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_garbage_token_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let server = setup_server(&pool).await;

    let resp = server
        .get("/api/v1/auth/profile")
        .authorization_bearer("definitely.not.a-jwt")
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert!(resp.text().contains("TOKEN_INVALID"));

    drop(pool);
}

#[tokio::test]
async fn route_change_password_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action().with_save_as("admin"))
        // wrong current password
        .step(
            Action::new("change_password_wrong", "POST", "/api/v1/auth/change-password")
                .with_bearer_from("admin")
                .with_body(json!({
                    "current_password": "not it",
                    "new_password": "a new password",
                }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // too weak replacement
        .step(
            Action::new("change_password_weak", "POST", "/api/v1/auth/change-password")
                .with_bearer_from("admin")
                .with_body(json!({
                    "current_password": common::ADMIN_PASSWORD,
                    "new_password": "short",
                }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("VALIDATION_ERROR"))),
        )
        .step(
            Action::new("change_password", "POST", "/api/v1/auth/change-password")
                .with_bearer_from("admin")
                .with_body(json!({
                    "current_password": common::ADMIN_PASSWORD,
                    "new_password": "a new password",
                }))
                .with_expect(StatusCode::OK),
        )
        // old password no longer works
        .step(login_admin_action().with_expect(StatusCode::UNAUTHORIZED))
        .step(login_action(ADMIN_EMAIL, "a new password").with_expect(StatusCode::OK))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_profile_update_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let course_id = seed_course(&pool, "Applied Botany").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("jamie@rollcall.test", "hunter2hunter2", course_id).with_save_as("reg"))
        .step(login_admin_action().with_save_as("admin"))
        // activate the account so the student can sign in
        .step(
            Action::new("approve", "PATCH", "dynamic")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/registrations/{}/action",
                        ctx.get("reg")["id"].as_str().unwrap()
                    )
                })
                .with_bearer_from("admin")
                .with_body(json!({ "action": "approve" })),
        )
        .step(login_action("jamie@rollcall.test", "hunter2hunter2").with_save_as("student"))
        .step(
            Action::new("profile_update", "PUT", "/api/v1/auth/profile")
                .with_bearer_from("student")
                .with_body(json!({
                    "first_name": "Jay",
                    "phone": "+15550100",
                }))
                .with_expect(StatusCode::OK)
                .assert_body(|body| {
                    assert!(body.contains("Jay"));
                    assert!(body.contains("+15550100"));
                    // untouched field keeps its value
                    assert!(body.contains("Doe"));
                }),
        )
        // taking the admin's email must conflict
        .step(
            Action::new("profile_update_dup_email", "PUT", "/api/v1/auth/profile")
                .with_bearer_from("student")
                .with_body(json!({ "email": ADMIN_EMAIL }))
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| assert!(body.contains("DUPLICATE_FIELD"))),
        )
        .run(&mut server, pool)
        .await;
}
