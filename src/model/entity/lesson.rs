use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    module_id: Uuid,
    title: String,
    content: String,
    order_index: i32,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreateUpdate {
    pub module_id: Uuid,
    pub title: String,
    pub content: String,
    pub order_index: Option<i32>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreateUpdate, Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO lessons (id, module_id, title, content, order_index) \
             VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreateUpdate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE lessons SET title = $1, content = $2, order_index = $3 WHERE id = $4")
            .bind(&data.title)
            .bind(&data.content)
            .bind(data.order_index.unwrap_or(0))
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.title = data.title;
        self.content = data.content;
        self.order_index = data.order_index.unwrap_or(0);
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
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
            sqlx::query_as("SELECT * FROM lessons ORDER BY order_index LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Lesson, LessonCreateUpdate, Uuid);

#[async_trait]
impl HasOwner for Lesson {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // catalog entries have no per-user owner
    }
}

impl Lesson {
    /// Course the lesson belongs to, through its module.
    pub async fn course_id_of(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Uuid>> {
        let result: Option<Uuid> = sqlx::query_scalar(
            "SELECT m.course_id FROM lessons l \
             JOIN course_modules m ON l.module_id = m.id \
             WHERE l.id = $1",
        )
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }
}
