use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::traits::{
    saved_searches_key, ConnectionStore, SavedConnection, SavedSearchStore, StorageError,
};
use crate::search::SavedSearch;

/// In-memory store for tests and ephemeral sessions.
pub struct InMemoryStore {
    searches: DashMap<String, Vec<SavedSearch>>,
    connections: DashMap<String, SavedConnection>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            searches: DashMap::new(),
            connections: DashMap::new(),
        }
    }

    /// Clear everything.
    pub fn clear(&self) {
        self.searches.clear();
        self.connections.clear();
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SavedSearchStore for InMemoryStore {
    async fn load_searches(&self, connection_id: &str) -> Result<Vec<SavedSearch>, StorageError> {
        Ok(self
            .searches
            .get(&saved_searches_key(connection_id))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn store_searches(
        &self,
        connection_id: &str,
        searches: &[SavedSearch],
    ) -> Result<(), StorageError> {
        self.searches
            .insert(saved_searches_key(connection_id), searches.to_vec());
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for InMemoryStore {
    async fn save_connection(&self, connection: &SavedConnection) -> Result<(), StorageError> {
        self.connections
            .insert(connection.id.clone(), connection.clone());
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<SavedConnection>, StorageError> {
        let mut connections: Vec<SavedConnection> = self
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        connections.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(connections)
    }

    async fn delete_connection(&self, id: &str) -> Result<(), StorageError> {
        self.connections.remove(id);
        Ok(())
    }

    async fn touch_last_used(&self, id: &str) -> Result<(), StorageError> {
        match self.connections.get_mut(id) {
            Some(mut entry) => {
                entry.last_used_at = Utc::now().timestamp();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}
