use thiserror::Error;

use crate::search::QueryError;
use crate::storage::StorageError;

/// Console-level error taxonomy.
///
/// Remote failures pass through verbatim in [`Elasticsearch`](ConsoleError::Elasticsearch);
/// retries and timeouts are the transport's concern, not ours.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("elasticsearch error: {0}")]
    Elasticsearch(String),

    /// Search attempted with no index chosen; no remote call is issued.
    #[error("no index selected")]
    NoIndexSelected,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_converts() {
        let err: ConsoleError = QueryError::InvalidDateFormat {
            field: "created".into(),
            value: "nope".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid date format for field 'created': 'nope'"
        );
    }

    #[test]
    fn test_no_index_selected_display() {
        assert_eq!(ConsoleError::NoIndexSelected.to_string(), "no index selected");
    }
}
