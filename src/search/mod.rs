// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query-condition pipeline.
//!
//! Turns user-entered `(field, operator, value)` rows into a Query DSL
//! document the cluster can execute:
//!
//! ```text
//! sample document ──► schema::infer_fields ──► FieldMetadata
//!                                                   │
//! conditions ─────► normalize::normalize ◄──────────┘
//!                          │
//!                          ▼
//!                  compiler::compile ──► {"query":{"bool":{"must":[…]}}}
//! ```
//!
//! The pipeline is pure and synchronous. [`operator_options`] restricts the
//! operators offered per field type; [`normalize`] filters incomplete rows
//! and coerces values; [`compile`] emits deterministic JSON.
//!
//! # Example
//!
//! ```rust
//! use es_console::search::{
//!     compile, infer_fields, normalize, Operator, SearchCondition,
//! };
//! use serde_json::json;
//!
//! let sample = json!({"price": 12.0, "status": "open"});
//! let fields = infer_fields(sample.as_object().unwrap());
//!
//! let conditions = vec![SearchCondition::new("price", Operator::Gte, "9.5")];
//! let normalized = normalize(&conditions, &fields).unwrap();
//! assert_eq!(
//!     compile(&normalized),
//!     r#"{"query":{"bool":{"must":[{"range":{"price":{"gte":9.5}}}]}}}"#
//! );
//! ```

mod compiler;
mod condition;
mod normalize;
mod schema;

pub use compiler::{compile, compile_value};
pub use condition::{operator_options, Operator, OperatorOption, SavedSearch, SearchCondition};
pub use normalize::{normalize, CoercedValue, NormalizedCondition, QueryError};
pub use schema::{
    display_name, infer_fields, well_known, FieldMetadata, FieldType, DEFAULT_GROUP,
};
