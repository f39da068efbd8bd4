use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::entity::{Student, UserEntity};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginBody {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserEntity,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub user: UserEntity,
    pub student: Option<Student>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ProfileUpdateBody {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ChangePasswordBody {
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub new_password: String,
}
