use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    title: String,
    description: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreateUpdate {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreateUpdate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO courses (id, title, description, start_date, end_date) \
             VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE courses SET title = $1, description = $2, start_date = $3, end_date = $4 \
             WHERE id = $5",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.start_date = data.start_date;
        self.end_date = data.end_date;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM courses ORDER BY start_date LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Course, CourseCreateUpdate, Uuid);

#[async_trait]
impl HasOwner for Course {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // catalog entries have no per-user owner
    }
}

// Utils

/// One row per course with modules and their lessons folded into json.
#[derive(FromRow)]
pub struct CourseDetailRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub modules: serde_json::Value,
}

impl CourseDetailRow {
    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT
                c.id,
                c.title,
                c.description,
                c.start_date,
                c.end_date,
                COALESCE(
                    json_agg(
                        json_build_object(
                            'id', m.id,
                            'title', m.title,
                            'description', m.description,
                            'order_index', m.order_index,
                            'lessons', m.lessons
                        )
                        ORDER BY m.order_index
                    ) FILTER (WHERE m.id IS NOT NULL),
                    '[]'
                ) AS modules
            FROM courses c
            LEFT JOIN (
                SELECT
                    cm.id,
                    cm.course_id,
                    cm.title,
                    cm.description,
                    cm.order_index,
                    COALESCE(
                        json_agg(
                            json_build_object(
                                'id', l.id,
                                'title', l.title,
                                'order_index', l.order_index
                            )
                            ORDER BY l.order_index
                        ) FILTER (WHERE l.id IS NOT NULL),
                        '[]'
                    ) AS lessons
                FROM course_modules cm
                LEFT JOIN lessons l ON l.module_id = cm.id
                GROUP BY cm.id
            ) m ON m.course_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(id)
        .fetch_one(mm.executor())
        .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }
}
