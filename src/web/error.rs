use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

/// One collected validation violation.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationTokenMissing")]
    TokenMissing,

    #[error("AuthenticationTokenExpired")]
    TokenExpired,

    #[error("AuthenticationTokenInvalid")]
    TokenInvalid,

    #[error("AuthenticationUserMissing")]
    UserMissing,

    #[error("AuthenticationAccountInactive")]
    AccountInactive,

    #[error("AuthenticationInvalidCredentials")]
    InvalidCredentials,
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::UserMissing => "USER_NOT_FOUND",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::TokenMissing => String::from("Authentication required, no bearer token."),
            Self::TokenExpired => String::from("Authentication token has expired."),
            Self::TokenInvalid => String::from("Authentication token is invalid."),
            Self::UserMissing => String::from("Authentication token refers to an unknown account."),
            Self::AccountInactive => String::from("This account is not active."),
            Self::InvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ValidationError: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("MalformedJson: {reason}")]
    MalformedJson { reason: String },

    #[error("PayloadTooLarge")]
    PayloadTooLarge,

    #[error("AuthenticationError - {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Forbidden")]
    Forbidden,

    #[error("NotFound: {resource:?}")]
    NotFound { resource: ResourceType },

    #[error("RegistrationExists")]
    RegistrationExists,

    #[error("RegistrationDecided")]
    RegistrationDecided,

    #[error("DuplicateField: {field}")]
    DuplicateField { field: String },

    #[error("DatabaseError on {resource:?}: {source}")]
    Database {
        resource: ResourceType,
        source: DatabaseError,
    },

    #[error("CryptError: {0}")]
    Crypt(#[from] CryptError),
}

impl WebError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    pub fn validation_single<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation(vec![FieldError {
            field: field.into(),
            message: message.into(),
            value: None,
        }])
    }

    pub fn malformed_json<S: Into<String>>(reason: S) -> Self {
        Self::MalformedJson {
            reason: reason.into(),
        }
    }

    pub fn auth_token_missing() -> Self {
        Self::Authentication(AuthenticationError::TokenMissing)
    }

    pub fn auth_token_expired() -> Self {
        Self::Authentication(AuthenticationError::TokenExpired)
    }

    pub fn auth_token_invalid() -> Self {
        Self::Authentication(AuthenticationError::TokenInvalid)
    }

    pub fn auth_user_missing() -> Self {
        Self::Authentication(AuthenticationError::UserMissing)
    }

    pub fn auth_inactive() -> Self {
        Self::Authentication(AuthenticationError::AccountInactive)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::Authentication(AuthenticationError::InvalidCredentials)
    }

    pub fn forbidden() -> Self {
        Self::Forbidden
    }

    pub fn resource_not_found(resource: ResourceType) -> Self {
        Self::NotFound { resource }
    }

    /// Normalization point for everything the data-access boundary reports.
    /// Known constraints become their business-level conflicts, everything
    /// else keeps its category (conflict, bad reference, unavailable, bug).
    pub fn from_database(resource: ResourceType, source: DatabaseError) -> Self {
        match &source {
            DatabaseError::UniqueViolation { constraint } => match constraint.as_str() {
                "uq_registrations_active" => Self::RegistrationExists,
                "uq_users_email" => Self::DuplicateField {
                    field: String::from("email"),
                },
                _ => Self::Database { resource, source },
            },
            DatabaseError::Forbidden => Self::Forbidden,
            _ => Self::Database { resource, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedJson { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Authentication(e) => e.status_code(),
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RegistrationExists | Self::RegistrationDecided | Self::DuplicateField { .. } => {
                StatusCode::CONFLICT
            }
            Self::Database { source, .. } => match source {
                DatabaseError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DatabaseError::ForeignKeyViolation { .. }
                | DatabaseError::NotNullViolation { .. } => StatusCode::BAD_REQUEST,
                DatabaseError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                DatabaseError::Forbidden => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Crypt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MalformedJson { .. } => "INVALID_JSON",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Authentication(e) => e.code(),
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::RegistrationExists => "REGISTRATION_EXISTS",
            Self::RegistrationDecided => "REGISTRATION_DECIDED",
            Self::DuplicateField { .. } => "DUPLICATE_FIELD",
            Self::Database { source, .. } => match source {
                DatabaseError::UniqueViolation { .. } => "DUPLICATE_FIELD",
                DatabaseError::ForeignKeyViolation { .. } => "INVALID_REFERENCE",
                DatabaseError::NotNullViolation { .. } => "INVALID_DATA",
                DatabaseError::Unavailable(_) => "SERVICE_UNAVAILABLE",
                DatabaseError::Forbidden => "FORBIDDEN",
                _ => "DATABASE_ERROR",
            },
            Self::Crypt(_) => "INTERNAL_ERROR",
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::Validation(_) => String::from("Validation failed, see details."),
            Self::MalformedJson { .. } => String::from("Request body is not valid JSON."),
            Self::PayloadTooLarge => String::from("Request body is too large."),
            Self::Authentication(e) => e.client_display(),
            Self::Forbidden => String::from("You don't have enough permissions to do this."),
            Self::NotFound { .. } => String::from("Resource not found."),
            Self::RegistrationExists => {
                String::from("A registration for this course already exists.")
            }
            Self::RegistrationDecided => {
                String::from("This registration has already been decided.")
            }
            Self::DuplicateField { field } => format!("Value for '{field}' is already taken."),
            Self::Database { source, .. } => match source {
                DatabaseError::UniqueViolation { .. } => String::from("Duplicate value."),
                DatabaseError::ForeignKeyViolation { .. } => {
                    String::from("Referenced resource does not exist.")
                }
                DatabaseError::NotNullViolation { .. } => String::from("Missing required value."),
                DatabaseError::Unavailable(_) => {
                    String::from("Service temporarily unavailable.")
                }
                DatabaseError::Forbidden => {
                    String::from("You don't have enough permissions to do this.")
                }
                _ => String::from("Internal server error."),
            },
            Self::Crypt(_) => String::from("Internal server error."),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            Self::DuplicateField { field } => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

/// Stable wire shape for every failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub error: String,
    /// Stable machine-readable code
    pub code: String,
    /// HTTP status code
    pub status_code: u16,
    /// Structured details (validation errors etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Original error rendering (debug builds only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = if status_code.is_server_error() && !cfg!(debug_assertions) {
            String::from("Internal server error.")
        } else {
            self.client_display()
        };

        let body = ErrorResponse {
            error: display,
            code: self.code().to_string(),
            status_code: status_code.as_u16(),
            details: self.details(),
            stack: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
