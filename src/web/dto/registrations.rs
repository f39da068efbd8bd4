use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::model::entity::{Registration, RegistrationStatus};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegistrationCreateBody {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[validate(schema(function = "validate_decision"))]
pub struct RegistrationActionBody {
    pub action: RegistrationAction,
    pub message: Option<String>,
}

/// A rejection must explain itself; approval needs no message.
fn validate_decision(body: &RegistrationActionBody) -> Result<(), ValidationError> {
    if body.action == RegistrationAction::Reject {
        let len = body
            .message
            .as_deref()
            .map(|m| m.trim().chars().count())
            .unwrap_or(0);
        if len < 10 {
            return Err(ValidationError::new("decision_message").with_message(
                "message of at least 10 characters is required when rejecting".into(),
            ));
        }
    }
    Ok(())
}

/// Filter half of the list query; pagination comes in through its own
/// extractor so unknown keys on either side are simply ignored.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegistrationFilterQuery {
    pub status: Option<RegistrationStatus>,
    pub course_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub status: RegistrationStatus,
    pub decision_reason: Option<String>,
}

impl From<&Registration> for RegistrationResponse {
    fn from(r: &Registration) -> Self {
        Self {
            id: r.id(),
            student_id: r.student_id(),
            course_id: r.course_id(),
            status: r.status(),
            decision_reason: r.decision_reason().map(String::from),
        }
    }
}
