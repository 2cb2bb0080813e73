//! Value types for the search session.

use serde::{Deserialize, Serialize};

/// Summary line for the last executed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total matching documents as reported by the cluster
    pub total: i64,
    /// Server-side execution time in milliseconds
    pub took: i64,
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} hits in {} ms", self.total, self.took)
    }
}
