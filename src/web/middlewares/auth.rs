use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;

use crate::{
    Config, auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{
        AppState, RequestContext,
        context::{AuthFailure, AuthenticatedUser},
        error::WebError,
    },
};

pub static BEARER_PREFIX: &str = "Bearer ";

/// Optional by construction: the request always continues, and the attached
/// [`RequestContext`] records either the identity or the reason there is
/// none. Routes that require authentication call `ctx.user()?`.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let ctx = resolve_context(&state, req.headers()).await?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

async fn resolve_context(
    state: &AppState,
    headers: &header::HeaderMap,
) -> Result<RequestContext, WebError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header) = header else {
        return Ok(RequestContext::anonymous());
    };

    let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
        return Ok(RequestContext::denied(AuthFailure::TokenInvalid));
    };

    let secret = Config::get_or_init(false).await.app().jwt();
    let claims = match auth::process_token(token, secret) {
        Ok(data) => data.claims,
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            return Ok(RequestContext::denied(AuthFailure::TokenExpired));
        }
        Err(_) => {
            return Ok(RequestContext::denied(AuthFailure::TokenInvalid));
        }
    };

    let Ok(id) = claims.sub.parse::<uuid::Uuid>() else {
        return Ok(RequestContext::denied(AuthFailure::TokenInvalid));
    };

    let user = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?;

    let ctx = match user {
        None => RequestContext::denied(AuthFailure::UserMissing),
        Some(user) if !user.is_active() => RequestContext::denied(AuthFailure::Inactive),
        Some(user) => RequestContext::authenticated(AuthenticatedUser::new(
            user.id(),
            user.email().to_string(),
            user.role(),
            user.status(),
        )),
    };

    Ok(ctx)
}
