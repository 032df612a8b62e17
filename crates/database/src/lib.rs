//! Chatvault Database Crate
//!
//! This crate provides database functionality for the Chatvault message
//! service, including connection management, migrations, and the message
//! repository.

use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::MessageRepository;

// Re-export entities
pub use entities::{Message, MessageRole};

// Re-export types
pub use types::{
    errors::{DatabaseError, MessageError},
    DatabaseResult, MessageResult,
};

// Re-export the configuration section consumed by this crate
pub use chatvault_config::DatabaseConfig;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
