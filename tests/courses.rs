mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    Action, Flow, login_admin_action, seed_admin, seed_course, seed_lessons, setup_server,
    setup_test_db,
};

#[tokio::test]
async fn route_course_list_test() {
    let pool = setup_test_db().await;
    seed_course(&pool, "Course One").await;
    seed_course(&pool, "Course Two").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        // the catalog is public
        .step(
            Action::new("course_list", "GET", "/api/v1/courses").assert_body(|body| {
                assert!(body.contains("\"total\":2"));
                assert!(body.contains("Course One"));
                assert!(body.contains("Course Two"));
            }),
        )
        .step(
            Action::new("course_list_paged", "GET", "/api/v1/courses")
                .with_param("page", "2")
                .with_param("limit", "1")
                .assert_body(|body| {
                    assert!(body.contains("\"total\":2"));
                    assert!(body.contains("\"pages\":2"));
                }),
        )
        .step(
            Action::new("course_list_bad_page", "GET", "/api/v1/courses")
                .with_param("page", "0")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_course_detail_test() {
    let pool = setup_test_db().await;
    let course_id = seed_course(&pool, "Deep Dive").await;
    seed_lessons(&pool, course_id, 2).await;
    let empty_id = seed_course(&pool, "Empty Course").await;
    let mut server = setup_server(&pool).await;

    let detail_path = format!("/api/v1/courses/{course_id}");
    let empty_path = format!("/api/v1/courses/{empty_id}");

    Flow::new()
        .step(
            Action::new("course_detail", "GET", "dynamic")
                .with_dyn_path(move |_| detail_path.clone())
                .assert_body(|body| {
                    assert!(body.contains("Deep Dive"));
                    assert!(body.contains("Module 1"));
                    assert!(body.contains("Lesson 1"));
                    assert!(body.contains("Lesson 2"));
                }),
        )
        // a course with no modules serves an empty list, not null
        .step(
            Action::new("course_detail_empty", "GET", "dynamic")
                .with_dyn_path(move |_| empty_path.clone())
                .assert_body(|body| assert!(body.contains("\"modules\":[]"))),
        )
        .step(
            Action::new("course_detail_missing", "GET", "dynamic")
                .with_dyn_path(|_| format!("/api/v1/courses/{}", Uuid::new_v4()))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_course_crud_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        // writes are admin only
        .step(
            Action::new("create_anon", "POST", "/api/v1/courses")
                .with_body(json!({
                    "title": "Nope",
                    "start_date": "2026-09-01",
                    "end_date": "2026-12-01",
                }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(login_admin_action().with_save_as("admin"))
        // end date before start date
        .step(
            Action::new("create_bad_dates", "POST", "/api/v1/courses")
                .with_bearer_from("admin")
                .with_body(json!({
                    "title": "Time Travel",
                    "start_date": "2026-12-01",
                    "end_date": "2026-09-01",
                }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("end_date must not precede"))),
        )
        .step(
            Action::new("create", "POST", "/api/v1/courses")
                .with_bearer_from("admin")
                .with_body(json!({
                    "title": "Fresh Course",
                    "description": "Brand new",
                    "start_date": "2026-09-01",
                    "end_date": "2026-12-01",
                }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("course"),
        )
        .step(
            Action::new("update", "PUT", "dynamic")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/courses/{}", ctx.get("course")["id"].as_str().unwrap())
                })
                .with_bearer_from("admin")
                .with_body(json!({
                    "title": "Renamed Course",
                    "description": "Brand new",
                    "start_date": "2026-09-01",
                    "end_date": "2026-12-01",
                }))
                .assert_body(|body| assert!(body.contains("Renamed Course"))),
        )
        .step(
            Action::new("delete", "DELETE", "dynamic")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/courses/{}", ctx.get("course")["id"].as_str().unwrap())
                })
                .with_bearer_from("admin")
                .with_expect(StatusCode::NO_CONTENT),
        )
        // gone for real
        .step(
            Action::new("detail_after_delete", "GET", "dynamic")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/courses/{}", ctx.get("course")["id"].as_str().unwrap())
                })
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
