//! SQLite-backed store for saved connections and saved searches.
//!
//! Saved searches live in a key/value table so the on-disk layout matches
//! the storage contract: one JSON array per `saved_searches_<connectionId>`
//! key, replaced wholesale on save.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::traits::{
    saved_searches_key, ConnectionStore, SavedConnection, SavedSearchStore, StorageError,
};
use crate::search::SavedSearch;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (and if necessary create) the database at `url`,
    /// e.g. `sqlite:console.db`.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Backend(format!("invalid sqlite url: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to open database: {e}")))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Backend(format!("failed to create kv table: {e}")))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS connections (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                host TEXT NOT NULL,
                port INTEGER NOT NULL,
                username TEXT,
                password TEXT,
                created_at INTEGER NOT NULL,
                last_used_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Backend(format!("failed to create connections table: {e}")))?;

        debug!(url, "sqlite store opened");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SavedSearchStore for SqliteStore {
    async fn load_searches(&self, connection_id: &str) -> Result<Vec<SavedSearch>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(saved_searches_key(connection_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to load searches: {e}")))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                serde_json::from_str(&value)
                    .map_err(|e| StorageError::Backend(format!("corrupt saved searches: {e}")))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn store_searches(
        &self,
        connection_id: &str,
        searches: &[SavedSearch],
    ) -> Result<(), StorageError> {
        let value = serde_json::to_string(searches)
            .map_err(|e| StorageError::Backend(format!("failed to encode searches: {e}")))?;

        sqlx::query("INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)")
            .bind(saved_searches_key(connection_id))
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to store searches: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for SqliteStore {
    async fn save_connection(&self, connection: &SavedConnection) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT OR REPLACE INTO connections (
                id, name, host, port, username, password, created_at, last_used_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&connection.id)
        .bind(&connection.name)
        .bind(&connection.host)
        .bind(i64::from(connection.port))
        .bind(&connection.username)
        .bind(&connection.password)
        .bind(connection.created_at)
        .bind(connection.last_used_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(format!("failed to save connection: {e}")))?;
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<SavedConnection>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, name, host, port, username, password, created_at, last_used_at
             FROM connections
             ORDER BY last_used_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(format!("failed to list connections: {e}")))?;

        rows.into_iter()
            .map(|row| {
                let port: i64 = row
                    .try_get("port")
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                Ok(SavedConnection {
                    id: row
                        .try_get("id")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                    name: row
                        .try_get("name")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                    host: row
                        .try_get("host")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                    port: port as u16,
                    username: row
                        .try_get("username")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                    password: row
                        .try_get("password")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                    created_at: row
                        .try_get("created_at")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                    last_used_at: row
                        .try_get("last_used_at")
                        .map_err(|e| StorageError::Backend(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn delete_connection(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to delete connection: {e}")))?;
        Ok(())
    }

    async fn touch_last_used(&self, id: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE connections SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now().timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to update last used: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
