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
pub struct Student {
    id: Uuid,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    phone: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StudentCreateUpdate {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl ResourceTyped for Student {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Student
    }
}

impl Student {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

#[async_trait]
impl CrudRepository<Student, StudentCreateUpdate, Uuid> for Student {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StudentCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO students (id, user_id, first_name, last_name, phone) \
             VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.phone)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StudentCreateUpdate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE students SET first_name = $1, last_name = $2, phone = $3 WHERE id = $4")
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.phone)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.phone = data.phone;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM students WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM students WHERE id = $1")
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
            sqlx::query_as("SELECT * FROM students ORDER BY created_at LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Student, StudentCreateUpdate, Uuid);

#[async_trait]
impl HasOwner for Student {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id) // a student record belongs to its linked account
    }
}

impl Student {
    pub async fn find_by_user_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }
        Ok(Some(result?))
    }
}
