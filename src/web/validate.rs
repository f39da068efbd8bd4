//! Declarative request validation: extractors that either hand the handler a
//! coerced value or answer 400 with every violation collected.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::web::error::{FieldError, WebError};

/// Flattens `validator`'s nested error tree into `[{field, message, value}]`.
pub fn collect_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    walk(errors, "", &mut out);
    out
}

fn walk(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(violations) => {
                for v in violations {
                    out.push(FieldError {
                        field: path.clone(),
                        message: v
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{path} is invalid")),
                        value: v
                            .params
                            .get("value")
                            .and_then(|v| serde_json::to_value(v).ok()),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => walk(nested, &path, out),
            ValidationErrorsKind::List(map) => {
                for (idx, nested) in map {
                    walk(nested, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                // serde reports one missing field at a time; surface it as a
                // field-level violation rather than "bad json"
                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return WebError::validation_single(field, "is required");
                }

                match rejection {
                    JsonRejection::BytesRejection(_) => WebError::PayloadTooLarge,
                    _ => WebError::malformed_json(error_msg),
                }
            })?;

        value
            .validate()
            .map_err(|errors| WebError::validation(collect_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                WebError::validation_single("query", &rejection.body_text())
            })?;

        value
            .validate()
            .map_err(|errors| WebError::validation(collect_errors(&errors)))?;

        Ok(ValidatedQuery(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    page: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    limit: i64,
    #[serde(default)]
    sort_by: Option<String>,
    #[serde(default)]
    sort_order: SortOrder,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            sort_by: None,
            sort_order: SortOrder::default(),
        }
    }
}

impl PaginationQuery {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.limit
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn descending(&self) -> bool {
        self.sort_order == SortOrder::Desc
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let q: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
        assert!(q.descending());
        assert!(q.validate().is_ok());
    }

    #[test]
    fn pagination_bounds() {
        let q: PaginationQuery = serde_json::from_str(r#"{"page": 0}"#).unwrap();
        let errors = q.validate().unwrap_err();
        let collected = collect_errors(&errors);
        assert!(collected.iter().any(|e| e.field == "page"));

        let q: PaginationQuery = serde_json::from_str(r#"{"limit": 101}"#).unwrap();
        assert!(q.validate().is_err());
    }

    #[test]
    fn offset_follows_page() {
        let q: PaginationQuery = serde_json::from_str(r#"{"page": 3, "limit": 20}"#).unwrap();
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn collects_every_violation_not_just_the_first() {
        let q: PaginationQuery =
            serde_json::from_str(r#"{"page": 0, "limit": 500}"#).unwrap();
        let collected = collect_errors(&q.validate().unwrap_err());
        assert_eq!(collected.len(), 2);
    }
}
