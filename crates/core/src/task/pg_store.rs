//! PostgreSQL task storage implementation
//!
//! Tasks live in a single table:
//!
//! ```sql
//! CREATE TABLE todolist (
//!     id          BIGSERIAL PRIMARY KEY,
//!     name        TEXT    NOT NULL DEFAULT '',
//!     description TEXT    NOT NULL DEFAULT '',
//!     done        BOOLEAN NOT NULL DEFAULT FALSE,
//!     author      TEXT    NOT NULL DEFAULT ''
//! );
//! ```
//!
//! The service never creates or migrates this table.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::model::{NewTask, Task};
use super::repository::TaskRepository;
use crate::{Error, Result};

/// PostgreSQL-backed task store
///
/// Reads share the lock and every write holds it exclusively, so mutations
/// issued through one store are serialized within this process.
#[derive(Debug)]
pub struct PgTaskStore {
    pool: PgPool,
    lock: RwLock<()>,
}

impl PgTaskStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock: RwLock::new(()),
        }
    }

    /// Open a pool with the given options and verify the database is reachable
    pub async fn connect(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new().connect_with(options).await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        tracing::debug!("Connected to PostgreSQL");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TaskRepository for PgTaskStore {
    async fn get(&self, id: i64) -> Result<Task> {
        let _guard = self.lock.read().await;

        sqlx::query_as::<_, Task>(
            "SELECT id, name, description, done, author FROM todolist WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::TaskNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let _guard = self.lock.read().await;

        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, name, description, done, author FROM todolist",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn create(&self, task: NewTask) -> Result<i64> {
        let _guard = self.lock.write().await;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO todolist (name, description, done, author) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.done)
        .bind(&task.author)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: i64, task: NewTask) -> Result<()> {
        let _guard = self.lock.write().await;

        let result = sqlx::query(
            "UPDATE todolist SET name = $1, description = $2, done = $3, author = $4 \
             WHERE id = $5",
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.done)
        .bind(&task.author)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.lock.write().await;

        let result = sqlx::query("DELETE FROM todolist WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let _guard = self.lock.write().await;

        let result = sqlx::query("DELETE FROM todolist")
            .execute(&self.pool)
            .await?;
        tracing::debug!(rows = result.rows_affected(), "Deleted all tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests need a running PostgreSQL instance with the `todolist` table.

    async fn connect() -> PgTaskStore {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());
        let pool = PgPool::connect(&database_url).await.unwrap();
        PgTaskStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_create_and_get() {
        let store = connect().await;

        let id = store
            .create(NewTask::new("Buy milk").with_author("bob"))
            .await
            .unwrap();
        assert!(id > 0);

        let task = store.get(id).await.unwrap();
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.author, "bob");
        assert!(!task.done);

        store.delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_update_replaces_all_fields() {
        let store = connect().await;

        let id = store.create(NewTask::new("Draft")).await.unwrap();
        let replacement = NewTask::new("Final")
            .with_description("done at last")
            .with_author("carol")
            .with_done(true);
        store.update(id, replacement.clone()).await.unwrap();

        assert_eq!(store.get(id).await.unwrap(), replacement.into_task(id));

        store.delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_missing_rows_are_not_found() {
        let store = connect().await;

        let id = store.create(NewTask::new("Short lived")).await.unwrap();
        store.delete(id).await.unwrap();

        assert!(matches!(store.get(id).await, Err(Error::TaskNotFound(_))));
        assert!(matches!(
            store.update(id, NewTask::new("x")).await,
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(store.delete(id).await, Err(Error::TaskNotFound(_))));
    }
}
