//! Directory repository: Postgres-backed user/item lookups

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::item::ItemSummary,
    repository::{bounded, ResourceDirectory},
};

#[derive(Clone)]
pub struct DirectoryRepository {
    pool: Pool<Postgres>,
    timeout: Duration,
}

impl DirectoryRepository {
    pub fn new(pool: Pool<Postgres>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn user_exists_inner(&self, user_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_item_inner(&self, item_id: i64) -> AppResult<Option<ItemSummary>> {
        let row = sqlx::query("SELECT id, owner_id, available FROM items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| ItemSummary {
            id: r.get("id"),
            owner_id: r.get("owner_id"),
            available: r.get("available"),
        }))
    }
}

#[async_trait]
impl ResourceDirectory for DirectoryRepository {
    async fn user_exists(&self, user_id: i64) -> AppResult<bool> {
        bounded(self.timeout, "user lookup", self.user_exists_inner(user_id)).await
    }

    async fn find_item(&self, item_id: i64) -> AppResult<Option<ItemSummary>> {
        bounded(self.timeout, "item lookup", self.find_item_inner(item_id)).await
    }
}
