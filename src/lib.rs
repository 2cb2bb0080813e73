//! # es-console
//!
//! Engine core for a desktop Elasticsearch administration client.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ConnectionManager                       │
//! │  • One live EsClient per connection id                     │
//! │  • Remembered connections via ConnectionStore              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SearchSession                         │
//! │  • Active index + generation-guarded fetches               │
//! │  • Condition list → normalize → compile → Query DSL        │
//! │  • Column model for rendered results                       │
//! │  • Saved searches via SavedSearchStore                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         EsClient                            │
//! │  • reqwest plumbing over the cluster REST API              │
//! │  • _cat/indices, _cluster/*, _search, _snapshot/*          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use es_console::{
//!     ConnectionInfo, ConnectionManager, EsConnectionConfig, SqliteStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::connect("sqlite:console.db").await?);
//!     let console = ConnectionManager::new(store);
//!
//!     let info = ConnectionInfo {
//!         id: "local".into(),
//!         name: "Local cluster".into(),
//!         hosts: vec!["http://localhost:9200".into()],
//!         is_active: true,
//!     };
//!     console.connect(EsConnectionConfig::default(), info).await?;
//!
//!     let session = console.open_session("local").await?;
//!     session.refresh_indices().await?;
//!     let stats = session.search().await?;
//!     println!("{stats}");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`console`]: the [`ConnectionManager`] command surface
//! - [`session`]: per-connection [`session::SearchSession`] orchestration
//! - [`search`]: the pure condition → Query DSL pipeline
//! - [`columns`]: result projection and the column model
//! - [`client`]: HTTP client for the cluster REST API
//! - [`storage`]: saved searches and remembered connections

pub mod client;
pub mod columns;
pub mod config;
pub mod console;
pub mod error;
pub mod metrics;
pub mod search;
pub mod session;
pub mod storage;

pub use client::{
    ClusterHealth, ClusterInfo, ConnectionInfo, EsClient, IndexInfo, NodeInfo, SearchHit,
    SearchResponse, ShardInfo, Snapshot, SnapshotRepository,
};
pub use columns::{ColumnModel, ColumnState, PinSide};
pub use config::EsConnectionConfig;
pub use console::ConnectionManager;
pub use error::{ConsoleError, ConsoleResult};
pub use search::{
    operator_options, FieldMetadata, FieldType, Operator, QueryError, SavedSearch,
    SearchCondition,
};
pub use session::{SearchSession, SearchStats};
pub use storage::{InMemoryStore, SavedConnection, SqliteStore, StorageError};
