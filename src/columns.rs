//! Result projection: the column model for rendered hit tables.
//!
//! Columns are derived from the first document of a result batch: `_id`
//! plus every key of that document's source map, in source order. Order,
//! visibility, width, and pin side are user-driven state; mutations are
//! pure transitions validated only against "key exists in the candidate
//! set". Reordering is a standalone reducer so it stays testable without
//! any event layer.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

/// Synthetic identifier column, always first in a fresh order.
pub const ID_COLUMN: &str = "_id";

const DEFAULT_WIDTH: u32 = 200;

/// Which edge a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSide {
    Left,
    Right,
}

/// Per-column presentation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnState {
    /// Rendered width in pixels
    pub width: u32,
    /// Pin side, if pinned
    pub pinned: Option<PinSide>,
}

impl Default for ColumnState {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            pinned: None,
        }
    }
}

/// Column set, order, visibility, and per-column state for one result shape.
#[derive(Debug, Clone, Default)]
pub struct ColumnModel {
    order: Vec<String>,
    visible: HashSet<String>,
    states: HashMap<String, ColumnState>,
    initialized: bool,
}

impl ColumnModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all columns and user state; the next [`observe`](Self::observe)
    /// reinitializes from scratch.
    pub fn reset(&mut self) {
        self.order.clear();
        self.visible.clear();
        self.states.clear();
        self.initialized = false;
    }

    /// Feed the first document of a result batch into the model.
    ///
    /// After a reset this initializes the candidate set (all visible,
    /// default widths, no pins). Without a reset, existing column state is
    /// preserved and newly seen keys are appended at the end.
    pub fn observe(&mut self, source: &Map<String, Value>) {
        if !self.initialized {
            self.order.push(ID_COLUMN.to_string());
            self.visible.insert(ID_COLUMN.to_string());
            self.states.insert(ID_COLUMN.to_string(), ColumnState::default());
            self.initialized = true;
        }
        for key in source.keys() {
            if !self.states.contains_key(key) {
                self.order.push(key.clone());
                self.visible.insert(key.clone());
                self.states.insert(key.clone(), ColumnState::default());
            }
        }
    }

    /// Current column keys in display order.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Column keys that are both ordered and visible.
    #[must_use]
    pub fn visible_columns(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|key| self.visible.contains(key.as_str()))
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    #[must_use]
    pub fn state(&self, key: &str) -> Option<&ColumnState> {
        self.states.get(key)
    }

    /// Show or hide a column. Returns false for unknown keys.
    pub fn set_visible(&mut self, key: &str, visible: bool) -> bool {
        if !self.states.contains_key(key) {
            return false;
        }
        if visible {
            self.visible.insert(key.to_string());
        } else {
            self.visible.remove(key);
        }
        true
    }

    /// Resize a column. Returns false for unknown keys.
    pub fn set_width(&mut self, key: &str, width: u32) -> bool {
        match self.states.get_mut(key) {
            Some(state) => {
                state.width = width;
                true
            }
            None => false,
        }
    }

    /// Pin or unpin a column. Returns false for unknown keys.
    pub fn set_pinned(&mut self, key: &str, pinned: Option<PinSide>) -> bool {
        match self.states.get_mut(key) {
            Some(state) => {
                state.pinned = pinned;
                true
            }
            None => false,
        }
    }

    /// Apply a drag-to-reorder gesture. Returns false when either key is
    /// unknown (the order is left untouched).
    pub fn move_column(&mut self, dragged: &str, target: &str) -> bool {
        match reorder(&self.order, dragged, target) {
            Some(next) => {
                self.order = next;
                true
            }
            None => false,
        }
    }
}

/// Pure reorder reducer: move `dragged` to `target`'s slot.
///
/// `None` when either key is missing from the order. Dropping a column on
/// itself is a no-op.
#[must_use]
pub fn reorder(order: &[String], dragged: &str, target: &str) -> Option<Vec<String>> {
    let from = order.iter().position(|key| key == dragged)?;
    let to = order.iter().position(|key| key == target)?;
    let mut next = order.to_vec();
    let column = next.remove(from);
    next.insert(to, column);
    Some(next)
}
