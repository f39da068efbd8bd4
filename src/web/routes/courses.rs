use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, Page, PaginatableRepository, ResourceTyped,
        entity::{Course, CourseCreateUpdate, CourseDetailRow},
    },
    web::{
        AppState, AuthenticatedUser, PaginationQuery, RequestContext, ValidatedJson,
        ValidatedQuery, WebError, WebResult,
        dto::courses::{CourseBody, CourseDetail},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let admin = Router::new()
        .route("/", post(course_create_handler))
        .route(
            "/{id}",
            axum::routing::put(course_update_handler).delete(course_delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/", get(course_list_handler))
        .route("/{id}", get(course_detail_handler))
        .merge(admin)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    description = "Paginated course catalog, ordered by start date",
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-indexed"),
        ("limit" = Option<i64>, Query, description = "Items per page, 1-100"),
    ),
    responses(
        (status = 200, description = "Returns requested page", body = Page<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
)]
pub async fn course_list_handler(
    ValidatedQuery(query): ValidatedQuery<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let page = Course::page(state.pool(), &admin, query.page(), query.limit())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    description = "One course with its modules and lessons",
    params(
        ("id" = Uuid, Path, description = "Course to fetch")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseDetail),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
)]
pub async fn course_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let row = CourseDetailRow::find_by_id(state.pool(), &admin, id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let detail = CourseDetail::from_row(row)
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    description = "Creates a course",
    request_body = CourseBody,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Dates out of order or title empty", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = [])
    )
)]
pub async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CourseBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;

    let course = Course::create(state.pool(), user, payload.into())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    description = "Replaces a course's catalog fields",
    params(
        ("id" = Uuid, Path, description = "Course to update")
    ),
    request_body = CourseBody,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Dates out of order or title empty", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = [])
    )
)]
pub async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CourseBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;

    let course = Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let course = course
        .update(state.pool(), user, payload.into())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    description = "Deletes a course and everything hanging off it",
    params(
        ("id" = Uuid, Path, description = "Course to delete")
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = [])
    )
)]
pub async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;

    let course = Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    course
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok(StatusCode::NO_CONTENT)
}

impl From<CourseBody> for CourseCreateUpdate {
    fn from(body: CourseBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            start_date: body.start_date,
            end_date: body.end_date,
        }
    }
}
