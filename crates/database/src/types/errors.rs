//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Message store errors
///
/// Every failure a repository operation can surface falls into one of
/// three classes: the addressed record does not exist, the record to be
/// created collides with an existing identifier, or the backing store
/// itself failed.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message not found")]
    NotFound,

    #[error("Message already exists")]
    AlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
