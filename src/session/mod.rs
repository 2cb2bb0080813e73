// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Per-connection search session.
//!
//! The [`SearchSession`] owns everything one search view needs: the active
//! index, the condition list, inferred field metadata, the last result
//! batch, the column model, and the saved searches for its connection.
//!
//! # Lifecycle
//!
//! ```text
//! open ──► refresh_indices ──► select_index ──► search ◄──┐
//!                                   │                     │
//!                                   └── (sample + infer)  └── edit conditions
//! ```
//!
//! # Stale responses
//!
//! Index selection races its own fetches: switching indices twice in quick
//! succession must never let the first sample overwrite the second index's
//! schema. Every `select_index` bumps a generation counter; a response is
//! applied only while its generation is still the latest.

mod types;

pub use types::SearchStats;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::client::{EsClient, IndexInfo, SearchHit};
use crate::columns::{ColumnModel, PinSide};
use crate::error::{ConsoleError, ConsoleResult};
use crate::metrics;
use crate::search::{
    compile, compile_value, infer_fields, normalize, FieldMetadata, SavedSearch, SearchCondition,
};
use crate::storage::{ConsoleStore, StorageError};

/// Mutable view state, owned exclusively by the session.
struct SessionState {
    index: String,
    indices: Vec<IndexInfo>,
    fields: Vec<FieldMetadata>,
    conditions: Vec<SearchCondition>,
    saved: Vec<SavedSearch>,
    results: Vec<SearchHit>,
    stats: Option<SearchStats>,
    columns: ColumnModel,
}

impl SessionState {
    fn new(saved: Vec<SavedSearch>) -> Self {
        Self {
            index: String::new(),
            indices: Vec::new(),
            fields: Vec::new(),
            conditions: vec![SearchCondition::blank()],
            saved,
            results: Vec::new(),
            stats: None,
            columns: ColumnModel::new(),
        }
    }

    /// Back to a single blank condition and an empty result view.
    /// Saved searches and the cached index list survive.
    fn reset_search(&mut self) {
        self.fields.clear();
        self.conditions = vec![SearchCondition::blank()];
        self.results.clear();
        self.stats = None;
        self.columns.reset();
    }
}

/// Orchestrator for one connection's search view.
///
/// All remote calls run without holding the state lock; results are applied
/// afterwards under a generation check so superseded responses are dropped.
pub struct SearchSession {
    connection_id: String,
    client: Arc<EsClient>,
    store: Arc<dyn ConsoleStore>,
    generation: AtomicU64,
    state: RwLock<SessionState>,
}

impl SearchSession {
    /// Open a session, loading the connection's saved searches.
    pub async fn open(
        connection_id: impl Into<String>,
        client: Arc<EsClient>,
        store: Arc<dyn ConsoleStore>,
    ) -> ConsoleResult<Self> {
        let connection_id = connection_id.into();
        let saved = store.load_searches(&connection_id).await?;
        debug!(connection = %connection_id, saved = saved.len(), "session opened");
        Ok(Self {
            connection_id,
            client,
            store,
            generation: AtomicU64::new(0),
            state: RwLock::new(SessionState::new(saved)),
        })
    }

    #[must_use]
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    // ───────────────────────────────────────────────────────────────────
    // Index selection
    // ───────────────────────────────────────────────────────────────────

    /// Reload the index list. When nothing is selected yet, the first
    /// index becomes active.
    pub async fn refresh_indices(&self) -> ConsoleResult<Vec<IndexInfo>> {
        let indices = self.client.list_indices().await?;
        let select_first = {
            let mut state = self.state.write();
            state.indices = indices.clone();
            state.index.is_empty() && !indices.is_empty()
        };
        if select_first {
            self.select_index(&indices[0].name).await?;
        }
        Ok(indices)
    }

    /// Cached index list, filtered by case-insensitive substring.
    #[must_use]
    pub fn filter_indices(&self, term: &str) -> Vec<IndexInfo> {
        let needle = term.to_lowercase();
        self.state
            .read()
            .indices
            .iter()
            .filter(|index| index.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Switch the active index: reset search state, sample the index to
    /// infer field metadata, then run the initial match-all search.
    ///
    /// Superseded by any later `select_index`; a stale sample or result is
    /// discarded instead of applied.
    pub async fn select_index(&self, name: &str) -> ConsoleResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write();
            state.index = name.to_string();
            state.reset_search();
        }
        info!(index = name, "index selected");

        let sample = self.client.sample_document(name).await?;
        if self.is_stale(generation) {
            metrics::record_stale_response("sample");
            debug!(index = name, "discarding stale field sample");
            return Ok(());
        }
        if let Some(document) = &sample {
            let fields = infer_fields(document);
            metrics::record_fields_inferred(fields.len());
            let mut state = self.state.write();
            if !self.is_stale(generation) {
                state.fields = fields;
            }
        }

        self.run_search(generation).await?;
        Ok(())
    }

    #[must_use]
    pub fn index(&self) -> String {
        self.state.read().index.clone()
    }

    #[must_use]
    pub fn fields(&self) -> Vec<FieldMetadata> {
        self.state.read().fields.clone()
    }

    /// Distinct field groups, `"all"` first, in field order.
    #[must_use]
    pub fn field_groups(&self) -> Vec<String> {
        let state = self.state.read();
        let mut groups = vec!["all".to_string()];
        for field in &state.fields {
            if let Some(group) = &field.group {
                if !groups.contains(group) {
                    groups.push(group.clone());
                }
            }
        }
        groups
    }

    // ───────────────────────────────────────────────────────────────────
    // Conditions
    // ───────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn conditions(&self) -> Vec<SearchCondition> {
        self.state.read().conditions.clone()
    }

    pub fn add_condition(&self) {
        self.state.write().conditions.push(SearchCondition::blank());
    }

    /// Replace the condition at `position`. False when out of range.
    pub fn update_condition(&self, position: usize, condition: SearchCondition) -> bool {
        let mut state = self.state.write();
        match state.conditions.get_mut(position) {
            Some(slot) => {
                *slot = condition;
                true
            }
            None => false,
        }
    }

    /// Remove the condition at `position`. False when out of range.
    pub fn remove_condition(&self, position: usize) -> bool {
        let mut state = self.state.write();
        if position < state.conditions.len() {
            state.conditions.remove(position);
            true
        } else {
            false
        }
    }

    pub fn set_conditions(&self, conditions: Vec<SearchCondition>) {
        self.state.write().conditions = conditions;
    }

    /// Compile the current conditions without executing them.
    pub fn current_query(&self) -> ConsoleResult<String> {
        let state = self.state.read();
        let normalized = normalize(&state.conditions, &state.fields)?;
        Ok(compile(&normalized))
    }

    // ───────────────────────────────────────────────────────────────────
    // Search execution
    // ───────────────────────────────────────────────────────────────────

    /// Compile the current conditions and execute them against the active
    /// index. Compilation errors abort before any remote call.
    pub async fn search(&self) -> ConsoleResult<SearchStats> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.run_search(generation).await
    }

    async fn run_search(&self, generation: u64) -> ConsoleResult<SearchStats> {
        let (index, conditions, fields) = {
            let state = self.state.read();
            (
                state.index.clone(),
                state.conditions.clone(),
                state.fields.clone(),
            )
        };
        if index.trim().is_empty() {
            return Err(ConsoleError::NoIndexSelected);
        }

        let normalized = normalize(&conditions, &fields)?;
        let body = compile_value(&normalized);
        let response = self.client.search(index.trim(), body).await?;

        let stats = SearchStats {
            total: response.hits.total.value,
            took: response.took,
        };
        if self.is_stale(generation) {
            metrics::record_stale_response("search");
            debug!(index = %index, "discarding stale search response");
            return Ok(stats);
        }

        let mut state = self.state.write();
        if !self.is_stale(generation) {
            if let Some(first) = response.hits.hits.first() {
                state.columns.observe(&first.source);
            }
            state.results = response.hits.hits;
            state.stats = Some(stats);
        }
        Ok(stats)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    #[must_use]
    pub fn results(&self) -> Vec<SearchHit> {
        self.state.read().results.clone()
    }

    #[must_use]
    pub fn stats(&self) -> Option<SearchStats> {
        self.state.read().stats
    }

    // ───────────────────────────────────────────────────────────────────
    // Columns
    // ───────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn columns(&self) -> ColumnModel {
        self.state.read().columns.clone()
    }

    pub fn move_column(&self, dragged: &str, target: &str) -> bool {
        self.state.write().columns.move_column(dragged, target)
    }

    pub fn set_column_visible(&self, key: &str, visible: bool) -> bool {
        self.state.write().columns.set_visible(key, visible)
    }

    pub fn set_column_width(&self, key: &str, width: u32) -> bool {
        self.state.write().columns.set_width(key, width)
    }

    pub fn set_column_pinned(&self, key: &str, pinned: Option<PinSide>) -> bool {
        self.state.write().columns.set_pinned(key, pinned)
    }

    // ───────────────────────────────────────────────────────────────────
    // Saved searches
    // ───────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn saved_searches(&self) -> Vec<SavedSearch> {
        self.state.read().saved.clone()
    }

    /// Snapshot the current conditions under a name.
    ///
    /// Conditions are persisted raw; coercion happens only at compile time.
    pub async fn save_search(&self, name: &str) -> ConsoleResult<SavedSearch> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::Validation(
                "search name must not be empty".to_string(),
            ));
        }

        let (conditions, mut saved) = {
            let state = self.state.read();
            (state.conditions.clone(), state.saved.clone())
        };
        let entry = SavedSearch {
            id: Utc::now().timestamp_millis().to_string(),
            name: name.to_string(),
            conditions,
        };
        saved.push(entry.clone());

        self.store
            .store_searches(&self.connection_id, &saved)
            .await?;
        self.state.write().saved = saved;
        info!(connection = %self.connection_id, name = %entry.name, "search saved");
        Ok(entry)
    }

    /// Load a saved search's conditions and execute them.
    pub async fn apply_saved(&self, id: &str) -> ConsoleResult<SearchStats> {
        let conditions = {
            let state = self.state.read();
            state
                .saved
                .iter()
                .find(|search| search.id == id)
                .map(|search| search.conditions.clone())
        }
        .ok_or(StorageError::NotFound)?;

        self.state.write().conditions = conditions;
        self.search().await
    }

    pub async fn delete_saved(&self, id: &str) -> ConsoleResult<()> {
        let mut saved = self.state.read().saved.clone();
        let before = saved.len();
        saved.retain(|search| search.id != id);
        if saved.len() == before {
            return Err(StorageError::NotFound.into());
        }

        self.store
            .store_searches(&self.connection_id, &saved)
            .await?;
        self.state.write().saved = saved;
        Ok(())
    }
}
