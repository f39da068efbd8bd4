use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Aggregate completion per student and course. Created with the enrollment
/// during approval, recounted when lessons are completed.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StudentProgress {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    completed_lessons: i64,
    total_lessons: i64,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ResourceTyped for StudentProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::StudentProgress
    }
}

impl StudentProgress {
    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn completed_lessons(&self) -> i64 {
        self.completed_lessons
    }

    pub fn total_lessons(&self) -> i64 {
        self.total_lessons
    }

    pub async fn list_for_student(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as("SELECT * FROM student_progress WHERE student_id = $1")
            .bind(student_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    student_id: Uuid,
    lesson_id: Uuid,
    completed_at: chrono::DateTime<chrono::Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    /// Idempotent completion: the per-lesson row insert and the aggregate
    /// recount commit together or not at all.
    pub async fn mark_complete(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
        lesson_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<()> {
        let mut tx = mm.executor().begin().await?;

        sqlx::query(
            "INSERT INTO lesson_progress (id, student_id, lesson_id) VALUES ($1,$2,$3) \
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_pair DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(lesson_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE student_progress \
             SET completed_lessons = ( \
                 SELECT COUNT(*) FROM lesson_progress lp \
                 JOIN lessons l ON lp.lesson_id = l.id \
                 JOIN course_modules m ON l.module_id = m.id \
                 WHERE lp.student_id = $1 AND m.course_id = $2), \
                 updated_at = now() \
             WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
