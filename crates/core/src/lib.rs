//! Core library for the todolist service
//!
//! This crate contains the persistence side of the service:
//! - The task model
//! - The `TaskRepository` interface and its PostgreSQL implementation

pub mod error;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
