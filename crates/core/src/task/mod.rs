//! Task module
//!
//! This module contains the task record and its stores.

mod memory_store;
mod model;
mod pg_store;
mod repository;

pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use pg_store::PgTaskStore;
pub use repository::TaskRepository;
