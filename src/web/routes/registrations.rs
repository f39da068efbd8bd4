use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    auth::hash_password,
    model::{
        CrudRepository, Page, ResourceTyped,
        entity::{
            Course, Registration, RegistrationFilter, Student, StudentCreateUpdate, UserEntity,
            UserEntityCreateUpdate,
        },
    },
    web::{
        AppState, AuthenticatedUser, PaginationQuery, RequestContext, UserRole, UserStatus,
        ValidatedJson, ValidatedQuery, WebError, WebResult,
        dto::registrations::{
            RegistrationAction, RegistrationActionBody, RegistrationCreateBody,
            RegistrationFilterQuery, RegistrationResponse,
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/", get(registration_list_handler))
        .route("/{id}/action", patch(registration_action_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/", post(registration_create_handler))
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    description = "Submits a course registration; creates the account and student profile on first contact",
    request_body = RegistrationCreateBody,
    responses(
        (status = 201, description = "Registration submitted", body = RegistrationResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "A live registration already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "registrations",
)]
pub async fn registration_create_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegistrationCreateBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();

    let course = Course::find_by_id(state.pool(), &admin, payload.course_id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;
    if course.is_none() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    let user = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?;

    let user = match user {
        Some(user) => user,
        None => {
            // account starts inactive with a real digest; approval unlocks it
            let digest = hash_password(&payload.password)?;
            let data = UserEntityCreateUpdate {
                email: payload.email.clone(),
                password_hash: Some(digest),
                role: UserRole::Student.to_string(),
                status: UserStatus::Inactive.to_string(),
            };
            UserEntity::create(state.pool(), &admin, data)
                .await
                .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?
        }
    };

    let student = Student::find_by_user_id(state.pool(), &admin, user.id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;

    let student = match student {
        Some(student) => student,
        None => {
            let data = StudentCreateUpdate {
                user_id: user.id(),
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
            };
            Student::create(state.pool(), &admin, data)
                .await
                .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?
        }
    };

    let live = Registration::find_live(state.pool(), &admin, student.id(), payload.course_id)
        .await
        .map_err(|e| WebError::from_database(Registration::get_resource_type(), e))?;
    if live.is_some() {
        return Err(WebError::RegistrationExists);
    }

    // a concurrent submit still trips uq_registrations_active and lands on
    // the same 409
    let registration =
        Registration::create(state.pool(), &admin, student.id(), payload.course_id)
            .await
            .map_err(|e| WebError::from_database(Registration::get_resource_type(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(&registration)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/registrations",
    description = "Paginated registrations, filterable by status and course",
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-indexed"),
        ("limit" = Option<i64>, Query, description = "Items per page, 1-100"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
        ("status" = Option<String>, Query, description = "pending, approved or rejected"),
        ("course_id" = Option<Uuid>, Query, description = "Restrict to one course"),
    ),
    responses(
        (status = 200, description = "Returns requested page", body = Page<Registration>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "registrations",
    security(
        ("bearer" = [])
    )
)]
pub async fn registration_list_handler(
    ctx: RequestContext,
    ValidatedQuery(pagination): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<RegistrationFilterQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;

    let filter = RegistrationFilter {
        status: filter.status,
        course_id: filter.course_id,
    };
    let page = Registration::page_filtered(
        state.pool(),
        user,
        &filter,
        pagination.page(),
        pagination.limit(),
        pagination.descending(),
    )
    .await
    .map_err(|e| WebError::from_database(Registration::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/registrations/{id}/action",
    description = "Approves or rejects a pending registration",
    params(
        ("id" = Uuid, Path, description = "Registration to decide")
    ),
    request_body = RegistrationActionBody,
    responses(
        (status = 200, description = "Decision applied", body = RegistrationResponse),
        (status = 400, description = "Rejection message too short", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse),
        (status = 409, description = "Registration already decided", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "registrations",
    security(
        ("bearer" = [])
    )
)]
pub async fn registration_action_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RegistrationActionBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;

    let registration = Registration::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::from_database(Registration::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Registration::get_resource_type()))?;

    let decided = match payload.action {
        RegistrationAction::Approve => registration
            .approve(state.pool(), user)
            .await
            .map_err(|e| WebError::from_database(Registration::get_resource_type(), e))?
            .map(|(registration, _enrollment)| registration),
        RegistrationAction::Reject => {
            // the validator guarantees a message of sufficient length here
            let reason = payload.message.as_deref().unwrap_or_default().trim();
            registration
                .reject(state.pool(), user, reason)
                .await
                .map_err(|e| WebError::from_database(Registration::get_resource_type(), e))?
        }
    };

    let Some(decided) = decided else {
        return Err(WebError::RegistrationDecided);
    };

    Ok((StatusCode::OK, Json(RegistrationResponse::from(&decided))))
}
