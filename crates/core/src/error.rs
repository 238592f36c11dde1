//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("task {0} not found")]
    TaskNotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Whether the error means the addressed task does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound(_) | Self::Database(sqlx::Error::RowNotFound)
        )
    }
}
