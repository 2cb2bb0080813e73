//! Connection configuration.
//!
//! # Example
//!
//! ```
//! use es_console::EsConnectionConfig;
//!
//! // Minimal config (uses defaults)
//! let config = EsConnectionConfig::default();
//! assert_eq!(config.hosts, vec!["http://localhost:9200".to_string()]);
//!
//! // Full config
//! let config = EsConnectionConfig {
//!     hosts: vec!["https://es.internal:9200".into()],
//!     username: Some("admin".into()),
//!     password: Some("secret".into()),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

/// Configuration for one Elasticsearch connection.
///
/// Authentication is tri-modal: username + password, an API key, or none.
/// An API key takes precedence when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsConnectionConfig {
    /// Cluster endpoints, scheme and port included
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// Basic-auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,

    /// API key, sent as `Authorization: ApiKey <key>`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Path to a CA certificate for TLS verification
    #[serde(default)]
    pub ca_cert_path: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

fn default_hosts() -> Vec<String> {
    vec!["http://localhost:9200".to_string()]
}

fn default_timeout_secs() -> Option<u64> {
    Some(30)
}

impl Default for EsConnectionConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            username: None,
            password: None,
            api_key: None,
            ca_cert_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EsConnectionConfig {
    /// Check the config is usable before a connection attempt.
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.hosts.is_empty() {
            return Err(ConsoleError::Validation(
                "no Elasticsearch hosts provided".to_string(),
            ));
        }

        for host in &self.hosts {
            if !host.starts_with("http://") && !host.starts_with("https://") {
                return Err(ConsoleError::Validation(format!(
                    "invalid host URL: {host}. Must start with http:// or https://"
                )));
            }
        }

        Ok(())
    }
}
