use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::SavedSearch;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Item not found")]
    NotFound,
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A connection remembered across application restarts.
///
/// Credentials are stored as entered; encrypting them is the embedding
/// shell's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConnection {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub created_at: i64,
    pub last_used_at: i64,
}

/// Storage key for a connection's saved searches.
#[must_use]
pub fn saved_searches_key(connection_id: &str) -> String {
    format!("saved_searches_{connection_id}")
}

/// Persistence for saved searches, namespaced by connection.
///
/// Each connection's searches are stored as one JSON array under
/// `saved_searches_<connectionId>`; writes replace the whole array.
#[async_trait]
pub trait SavedSearchStore: Send + Sync {
    /// Load the saved searches for a connection; missing key means none.
    async fn load_searches(&self, connection_id: &str) -> Result<Vec<SavedSearch>, StorageError>;

    /// Replace the saved searches for a connection.
    async fn store_searches(
        &self,
        connection_id: &str,
        searches: &[SavedSearch],
    ) -> Result<(), StorageError>;
}

/// Persistence for remembered connections.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn save_connection(&self, connection: &SavedConnection) -> Result<(), StorageError>;

    /// All remembered connections, most recently used first.
    async fn list_connections(&self) -> Result<Vec<SavedConnection>, StorageError>;

    async fn delete_connection(&self, id: &str) -> Result<(), StorageError>;

    /// Bump a connection's last-used timestamp.
    async fn touch_last_used(&self, id: &str) -> Result<(), StorageError>;
}

/// Combined store surface the console hands to sessions.
pub trait ConsoleStore: SavedSearchStore + ConnectionStore {}

impl<T: SavedSearchStore + ConnectionStore> ConsoleStore for T {}
