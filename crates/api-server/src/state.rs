//! Application state

use std::sync::Arc;

use todolist_core::task::TaskRepository;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: Arc<dyn TaskRepository>,
}

impl AppState {
    /// Create a new AppState around the given task store
    pub fn new(task_store: Arc<dyn TaskRepository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { task_store }),
        }
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &dyn TaskRepository {
        self.inner.task_store.as_ref()
    }
}
