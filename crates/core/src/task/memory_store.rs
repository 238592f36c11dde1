//! In-process task storage implementation
//!
//! Keeps tasks in a map guarded by a reader/writer lock. Identifiers come
//! from a counter that only moves forward, so deleted ids are never reused.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::model::{NewTask, Task};
use super::repository::TaskRepository;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MemoryState {
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

/// Task store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    state: RwLock<MemoryState>,
}

impl MemoryTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn get(&self, id: i64) -> Result<Task> {
        let state = self.state.read().await;
        state.tasks.get(&id).cloned().ok_or(Error::TaskNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn create(&self, task: NewTask) -> Result<i64> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        state.tasks.insert(id, task.into_task(id));
        Ok(id)
    }

    async fn update(&self, id: i64, task: NewTask) -> Result<()> {
        let mut state = self.state.write().await;
        match state.tasks.get_mut(&id) {
            Some(existing) => {
                *existing = task.into_task(id);
                Ok(())
            }
            None => Err(Error::TaskNotFound(id)),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::TaskNotFound(id))
    }

    async fn delete_all(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.tasks.clear();
        Ok(())
    }
}
