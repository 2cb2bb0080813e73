//! Persistence for saved searches and remembered connections.

pub mod memory;
pub mod sql;
pub mod traits;

pub use memory::InMemoryStore;
pub use sql::SqliteStore;
pub use traits::{
    saved_searches_key, ConnectionStore, ConsoleStore, SavedConnection, SavedSearchStore,
    StorageError,
};
