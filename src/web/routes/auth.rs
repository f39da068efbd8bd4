use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    Config, auth,
    auth::{UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{Student, StudentCreateUpdate, UserEntity},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, ValidatedJson, WebError, WebResult,
        dto::auth::{
            ChangePasswordBody, LoginBody, LoginResponse, ProfileResponse, ProfileUpdateBody,
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/profile", get(profile_get_handler).put(profile_update_handler))
        .route("/change-password", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/login", post(login_handler))
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    description = "Exchanges credentials for a bearer token",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Credentials invalid or account inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?;

    let Some(user) = found else {
        return Err(WebError::auth_invalid_credentials());
    };

    // no digest yet means the account was never given a password
    let Some(digest) = user.digest() else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified = verify_password(digest, &payload.password)?;
    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    if !user.is_active() {
        return Err(WebError::auth_inactive());
    }

    let config = Config::get_or_init(false).await;
    let claims = UserClaims::new(
        user.id().to_string(),
        user.email().to_string(),
        user.role().to_string(),
        config.app().token_ttl_hours(),
    );
    let token = auth::generate_token(claims, config.app().jwt())
        .map_err(|e| WebError::Crypt(e.into()))?;

    Ok((StatusCode::OK, Json(LoginResponse { token, user })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    description = "Account and student profile of the caller",
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = [])
    )
)]
pub async fn profile_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let account = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let student = Student::find_by_user_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            user: account,
            student,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    description = "Updates the caller's account and student profile",
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 409, description = "Email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = [])
    )
)]
pub async fn profile_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProfileUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let mut account = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    if let Some(email) = payload.email {
        account
            .set_email(state.pool(), user, email)
            .await
            .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?;
    }

    let student = Student::find_by_user_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;

    let student = match student {
        Some(s) => {
            let data = StudentCreateUpdate {
                user_id: s.user_id(),
                first_name: payload.first_name.unwrap_or_else(|| s.first_name().to_string()),
                last_name: payload.last_name.unwrap_or_else(|| s.last_name().to_string()),
                phone: payload.phone.unwrap_or_else(|| s.phone().to_string()),
            };
            Some(
                s.update(state.pool(), user, data)
                    .await
                    .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?,
            )
        }
        None => None,
    };

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            user: account,
            student,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    description = "Replaces the caller's password after verifying the current one",
    request_body = ChangePasswordBody,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password too weak", body = ErrorResponse),
        (status = 401, description = "Current password is wrong", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = [])
    )
)]
pub async fn change_password_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let mut account = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let Some(digest) = account.digest() else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified = verify_password(digest, &payload.current_password)?;
    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let new_digest = hash_password(&payload.new_password)?;
    account
        .set_password_hash(state.pool(), user, new_digest)
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
