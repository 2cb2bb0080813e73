// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection registry: the command surface a GUI shell drives.
//!
//! Holds one live [`EsClient`] per connection id and hands out
//! [`SearchSession`]s bound to the shared store. Remembered connections are
//! persisted separately from live ones: connecting never writes to disk,
//! saving never connects.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{info, warn};
use url::Url;

use crate::client::{ConnectionInfo, EsClient};
use crate::config::EsConnectionConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::metrics;
use crate::session::SearchSession;
use crate::storage::{ConsoleStore, SavedConnection};

pub struct ConnectionManager {
    clients: DashMap<String, Arc<EsClient>>,
    store: Arc<dyn ConsoleStore>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(store: Arc<dyn ConsoleStore>) -> Self {
        Self {
            clients: DashMap::new(),
            store,
        }
    }

    /// Connect to a cluster and register the client under its connection id.
    pub async fn connect(
        &self,
        config: EsConnectionConfig,
        info: ConnectionInfo,
    ) -> ConsoleResult<()> {
        let id = info.id.clone();
        match EsClient::connect(config, info).await {
            Ok(client) => {
                metrics::record_connection("connect", "success");
                info!(connection = %id, "connection established");
                self.clients.insert(id, Arc::new(client));
                Ok(())
            }
            Err(e) => {
                metrics::record_connection("connect", "error");
                warn!(connection = %id, error = %e, "connection failed");
                Err(e)
            }
        }
    }

    /// Drop a live connection. False when the id was unknown.
    pub fn disconnect(&self, connection_id: &str) -> bool {
        let removed = self.clients.remove(connection_id).is_some();
        if removed {
            metrics::record_connection("disconnect", "success");
        }
        removed
    }

    #[must_use]
    pub fn list_connections(&self) -> Vec<ConnectionInfo> {
        self.clients
            .iter()
            .map(|entry| entry.value().info().clone())
            .collect()
    }

    /// Ping a live connection; unknown ids report as not connected.
    pub async fn test_connection(&self, connection_id: &str) -> ConsoleResult<bool> {
        match self.client_opt(connection_id) {
            Some(client) => client.test_connection().await,
            None => Ok(false),
        }
    }

    #[must_use]
    pub fn current_config(&self, connection_id: &str) -> Option<EsConnectionConfig> {
        self.client_opt(connection_id)
            .map(|client| client.config().clone())
    }

    /// The live client for a connection id.
    pub fn client(&self, connection_id: &str) -> ConsoleResult<Arc<EsClient>> {
        self.client_opt(connection_id).ok_or_else(|| {
            ConsoleError::Connection("not connected to Elasticsearch".to_string())
        })
    }

    fn client_opt(&self, connection_id: &str) -> Option<Arc<EsClient>> {
        self.clients
            .get(connection_id)
            .map(|entry| entry.value().clone())
    }

    /// Open a search session bound to a live connection.
    pub async fn open_session(&self, connection_id: &str) -> ConsoleResult<SearchSession> {
        let client = self.client(connection_id)?;
        SearchSession::open(connection_id, client, self.store.clone()).await
    }

    // ───────────────────────────────────────────────────────────────────
    // Remembered connections
    // ───────────────────────────────────────────────────────────────────

    /// Persist a connection for later sessions. Host and port are taken
    /// from the first configured endpoint.
    pub async fn save_connection_info(
        &self,
        info: &ConnectionInfo,
        config: &EsConnectionConfig,
    ) -> ConsoleResult<()> {
        let host = config
            .hosts
            .first()
            .ok_or_else(|| ConsoleError::Validation("no host provided".to_string()))?;
        let url = Url::parse(host)
            .map_err(|e| ConsoleError::Validation(format!("invalid host URL: {e}")))?;

        let now = Utc::now().timestamp();
        let saved = SavedConnection {
            id: info.id.clone(),
            name: info.name.clone(),
            host: url
                .host_str()
                .ok_or_else(|| ConsoleError::Validation("invalid host".to_string()))?
                .to_string(),
            port: url.port().unwrap_or(9200),
            username: config.username.clone(),
            password: config.password.clone(),
            created_at: now,
            last_used_at: now,
        };

        self.store.save_connection(&saved).await?;
        Ok(())
    }

    pub async fn load_saved_connections(&self) -> ConsoleResult<Vec<SavedConnection>> {
        Ok(self.store.list_connections().await?)
    }

    pub async fn delete_saved_connection(&self, id: &str) -> ConsoleResult<()> {
        self.store.delete_connection(id).await?;
        Ok(())
    }

    pub async fn touch_saved_connection(&self, id: &str) -> ConsoleResult<()> {
        self.store.touch_last_used(id).await?;
        Ok(())
    }
}
