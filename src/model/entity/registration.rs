use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, Page, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use super::Enrollment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<&str> for RegistrationStatus {
    fn from(value: &str) -> Self {
        match value {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Registration {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    status: String,
    decision_reason: Option<String>,
    decided_by: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    decided_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
    pub course_id: Option<Uuid>,
}

impl ResourceTyped for Registration {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Registration
    }
}

impl Registration {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn status(&self) -> RegistrationStatus {
        RegistrationStatus::from(self.status.as_str())
    }

    pub fn decision_reason(&self) -> Option<&str> {
        self.decision_reason.as_deref()
    }
}

impl Registration {
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO registrations (id, student_id, course_id, status) \
             VALUES ($1,$2,$3,'pending') RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM registrations WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    /// Live registration (pending or approved) for a student/course pair.
    pub async fn find_live(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM registrations \
             WHERE student_id = $1 AND course_id = $2 AND status IN ('pending', 'approved')",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn page_filtered(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &RegistrationFilter,
        page: i64,
        limit: i64,
        descending: bool,
    ) -> DatabaseResult<Page<Self>> {
        let order = if descending { "DESC" } else { "ASC" };
        let status = filter.status.map(|s| s.to_string());
        let offset = (page - 1).max(0) * limit;

        let items = sqlx::query_as(&format!(
            "SELECT * FROM registrations \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR course_id = $2) \
             ORDER BY created_at {order} LIMIT $3 OFFSET $4"
        ))
        .bind(&status)
        .bind(filter.course_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR course_id = $2)",
        )
        .bind(&status)
        .bind(filter.course_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(Page::new(items, total, page, limit))
    }

    /// Approval side effects run in one transaction: status flip, account
    /// activation, enrollment, progress row. Returns `None` when the
    /// registration is no longer pending (already decided, or lost a race).
    pub async fn approve(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Option<(Self, Enrollment)>> {
        let mut tx = mm.executor().begin().await?;

        let updated: Option<Registration> = sqlx::query_as(
            "UPDATE registrations \
             SET status = 'approved', decided_by = $1, decided_at = now() \
             WHERE id = $2 AND status = 'pending' RETURNING *",
        )
        .bind(actor.user_id())
        .bind(self.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE users SET status = 'active' \
             FROM students s \
             WHERE users.id = s.user_id AND s.id = $1 AND users.status = 'inactive'",
        )
        .bind(updated.student_id)
        .execute(&mut *tx)
        .await?;

        let enrollment: Enrollment = sqlx::query_as(
            "INSERT INTO enrollments (id, student_id, course_id, registration_id) \
             VALUES ($1,$2,$3,$4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(updated.student_id)
        .bind(updated.course_id)
        .bind(updated.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO student_progress (id, student_id, course_id, completed_lessons, total_lessons) \
             VALUES ($1, $2, $3, 0, ( \
                 SELECT COUNT(*) FROM lessons l \
                 JOIN course_modules m ON l.module_id = m.id \
                 WHERE m.course_id = $3))",
        )
        .bind(Uuid::new_v4())
        .bind(updated.student_id)
        .bind(updated.course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((updated, enrollment)))
    }

    /// Returns `None` when the registration is no longer pending.
    pub async fn reject(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        reason: &str,
    ) -> DatabaseResult<Option<Self>> {
        let updated = sqlx::query_as(
            "UPDATE registrations \
             SET status = 'rejected', decision_reason = $1, decided_by = $2, decided_at = now() \
             WHERE id = $3 AND status = 'pending' RETURNING *",
        )
        .bind(reason)
        .bind(actor.user_id())
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_string_roundtrip() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ] {
            assert_eq!(RegistrationStatus::from(status.to_string().as_str()), status);
        }
    }
}
