//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{NewTask, Task};
use crate::Result;

/// Repository interface for task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get a task by ID
    ///
    /// Fails with `Error::TaskNotFound` when no row matches.
    async fn get(&self, id: i64) -> Result<Task>;

    /// Get all tasks, in the order the backend returns them
    async fn list(&self) -> Result<Vec<Task>>;

    /// Insert a new task and return the identifier assigned to it
    async fn create(&self, task: NewTask) -> Result<i64>;

    /// Replace every mutable field of an existing task
    async fn update(&self, id: i64, task: NewTask) -> Result<()>;

    /// Delete a task by ID
    async fn delete(&self, id: i64) -> Result<()>;

    /// Delete every task
    async fn delete_all(&self) -> Result<()>;
}
