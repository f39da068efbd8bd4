use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::model::{DatabaseResult, entity::CourseDetailRow};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[validate(schema(function = "validate_dates", skip_on_field_errors = false))]
pub struct CourseBody {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_dates(body: &CourseBody) -> Result<(), ValidationError> {
    if body.end_date < body.start_date {
        return Err(ValidationError::new("date_order")
            .with_message("end_date must not precede start_date".into()));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonShort {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleWithLessons {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub lessons: Vec<LessonShort>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub modules: Vec<ModuleWithLessons>,
}

impl TryFrom<CourseDetailRow> for CourseDetail {
    type Error = serde_json::Error;

    fn try_from(value: CourseDetailRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            title: value.title,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            modules: serde_json::from_value(value.modules)?,
        })
    }
}

impl CourseDetail {
    pub fn from_row(row: CourseDetailRow) -> DatabaseResult<Self> {
        Ok(Self::try_from(row)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn course(start: &str, end: &str) -> CourseBody {
        CourseBody {
            title: String::from("Intro to Rust"),
            description: String::new(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
        }
    }

    #[test]
    fn end_date_must_not_precede_start_date() {
        assert!(course("2026-09-01", "2026-12-01").validate().is_ok());
        assert!(course("2026-09-01", "2026-09-01").validate().is_ok());
        assert!(course("2026-12-01", "2026-09-01").validate().is_err());
    }

    #[test]
    fn empty_title_and_bad_dates_are_both_reported() {
        let mut body = course("2026-12-01", "2026-09-01");
        body.title = String::new();
        let errors = body.validate().unwrap_err();
        let collected = crate::web::validate::collect_errors(&errors);
        assert_eq!(collected.len(), 2);
    }
}
