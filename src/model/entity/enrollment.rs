use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Rows are only created inside the registration-approval transaction; the
/// unique (student_id, course_id) constraint guarantees at most one per pair.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    registration_id: Uuid,
    enrolled_at: chrono::DateTime<chrono::Utc>,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub async fn exists(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<bool> {
        let found: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(found.is_some())
    }
}

// Utils

#[derive(Debug, FromRow)]
pub struct EnrollmentWithCourseRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub course_title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl EnrollmentWithCourseRow {
    pub async fn list_for_student(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT e.id, e.course_id, e.enrolled_at, \
                    c.title AS course_title, c.start_date, c.end_date \
             FROM enrollments e \
             JOIN courses c ON c.id = e.course_id \
             WHERE e.student_id = $1 \
             ORDER BY e.enrolled_at DESC",
        )
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
