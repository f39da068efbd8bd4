use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{Enrollment, Lesson, LessonProgress, Student},
    },
    web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}/complete", post(lesson_complete_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{id}/complete",
    description = "Marks a lesson complete for the caller; repeating it changes nothing",
    params(
        ("id" = Uuid, Path, description = "Lesson to complete")
    ),
    responses(
        (status = 204, description = "Lesson recorded as complete"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not enrolled in this lesson's course", body = ErrorResponse),
        (status = 404, description = "Lesson or student profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("bearer" = [])
    )
)]
pub async fn lesson_complete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course_id = Lesson::course_id_of(state.pool(), user, id)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let student = Student::find_by_user_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    let enrolled = Enrollment::exists(state.pool(), user, student.id(), course_id)
        .await
        .map_err(|e| WebError::from_database(Enrollment::get_resource_type(), e))?;
    if !enrolled {
        return Err(WebError::forbidden());
    }

    LessonProgress::mark_complete(state.pool(), user, student.id(), id, course_id)
        .await
        .map_err(|e| WebError::from_database(LessonProgress::get_resource_type(), e))?;

    Ok(StatusCode::NO_CONTENT)
}
