use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{EnrollmentWithCourseRow, Student, StudentProgress},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::students::{CourseProgress, DashboardResponse, StudentDetailResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/{id}", get(student_detail_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/students/dashboard",
    description = "The caller's enrollments and per-course progress",
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "No student profile for this account", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(
        ("bearer" = [])
    )
)]
pub async fn dashboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let student = Student::find_by_user_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    let (enrollments, progress) = tokio::try_join!(
        EnrollmentWithCourseRow::list_for_student(state.pool(), user, student.id()),
        StudentProgress::list_for_student(state.pool(), user, student.id()),
    )
    .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(DashboardResponse {
            student,
            enrollments: enrollments.into_iter().map(Into::into).collect(),
            progress: progress.iter().map(CourseProgress::from).collect(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    description = "One student with their enrollments; self or admin only",
    params(
        ("id" = Uuid, Path, description = "Student to fetch")
    ),
    responses(
        (status = 200, description = "Student found", body = StudentDetailResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(
        ("bearer" = [])
    )
)]
pub async fn student_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let student = Student::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    check_access(state.pool(), user, &student, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;

    let enrollments = EnrollmentWithCourseRow::list_for_student(state.pool(), user, student.id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(StudentDetailResponse {
            student,
            enrollments: enrollments.into_iter().map(Into::into).collect(),
        }),
    ))
}
