//! Shared application state for the gateway

use std::sync::Arc;

use chatvault_database::{initialize_database, DatabaseConfig, MessageRepository};
use sqlx::SqlitePool;

use crate::error::{GatewayError, GatewayResult};

/// Shared application state handed to every request handler.
///
/// Constructed once at startup from an injected pool; handlers never reach
/// for process-global storage.
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Message repository
    pub message_repository: Arc<MessageRepository>,
}

impl GatewayState {
    /// Create a new gateway state from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        let message_repository = Arc::new(MessageRepository::new(pool.clone()));
        Self {
            pool,
            message_repository,
        }
    }

    /// Create gateway state from database configuration
    pub async fn from_config(config: &DatabaseConfig) -> GatewayResult<Self> {
        let pool = initialize_database(config).await.map_err(|e| {
            GatewayError::InternalError(format!("failed to initialize database: {e}"))
        })?;

        Ok(Self::new(pool))
    }

    /// Get a message repository reference
    pub fn message_repository(&self) -> &MessageRepository {
        &self.message_repository
    }
}

/// Create a gateway state backed by an in-memory database for testing
pub async fn create_test_gateway_state() -> GatewayResult<GatewayState> {
    let config = DatabaseConfig {
        url: "sqlite://:memory:".to_string(),
        max_connections: 1,
    };

    GatewayState::from_config(&config).await
}
