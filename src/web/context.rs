//! Request context: caller identity, role, and why identity may be absent.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    email: String,
    user_role: UserRole,
    status: UserStatus,
}

impl AuthenticatedUser {
    pub fn new(
        user_id: uuid::Uuid,
        email: String,
        user_role: UserRole,
        status: UserStatus,
    ) -> Self {
        Self {
            user_id,
            email,
            user_role,
            status,
        }
    }

    /// Synthetic actor for server-internal calls (seeding, public flows).
    pub fn admin() -> Self {
        Self {
            user_id: uuid::Uuid::max(),
            email: String::new(),
            user_role: UserRole::Admin,
            status: UserStatus::Active,
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role.clone()
    }

    pub fn status(&self) -> UserStatus {
        self.status.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserRole {
    Admin,
    Student,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            _ => Self::Student,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserStatus {
    Active,
    Inactive,
}

impl From<&str> for UserStatus {
    fn from(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Why the middleware could not attach an identity. Required routes turn
/// this into the matching 401.
#[derive(Debug, Clone, Copy)]
pub enum AuthFailure {
    TokenExpired,
    TokenInvalid,
    UserMissing,
    Inactive,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    identity: Option<AuthenticatedUser>,
    failure: Option<AuthFailure>,
}

impl RequestContext {
    pub fn authenticated(user: AuthenticatedUser) -> Self {
        Self {
            identity: Some(user),
            failure: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            identity: None,
            failure: None,
        }
    }

    pub fn denied(failure: AuthFailure) -> Self {
        Self {
            identity: None,
            failure: Some(failure),
        }
    }

    pub fn admin() -> Self {
        Self::authenticated(AuthenticatedUser::admin())
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.identity.as_ref()
    }

    /// Required-auth gate: distinct 401 per denial reason, `TOKEN_MISSING`
    /// when no bearer header was present at all.
    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        match (&self.identity, self.failure) {
            (Some(user), _) => Ok(user),
            (None, Some(AuthFailure::TokenExpired)) => Err(WebError::auth_token_expired()),
            (None, Some(AuthFailure::TokenInvalid)) => Err(WebError::auth_token_invalid()),
            (None, Some(AuthFailure::UserMissing)) => Err(WebError::auth_user_missing()),
            (None, Some(AuthFailure::Inactive)) => Err(WebError::auth_inactive()),
            (None, None) => Err(WebError::auth_token_missing()),
        }
    }

    /// Admin-only gate on top of [`Self::user`].
    pub fn admin_user(&self) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if user.user_role() != UserRole::Admin {
            return Err(WebError::forbidden());
        }
        Ok(user)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::anonymous())
        }
    }
}
