//! Field metadata and type inference.
//!
//! Every index gets a schema snapshot built from a one-document sample:
//! well-known field names resolve through a fixed catalog, everything else
//! is inferred from the sample value's JSON shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic type of a document field.
///
/// Closed set; drives the operator catalog and value coercion. Inference is
/// best-effort, so downstream code must treat a wrong guess as [`Text`](FieldType::Text)
/// rather than fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Full-text field, matched analyzed
    Text,
    /// Numeric field (supports range queries)
    Number,
    /// Date field (range queries with day expansion on equality)
    Date,
    /// Boolean field (equality only)
    Boolean,
    /// Exact-match keyword field
    Keyword,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Number => write!(f, "number"),
            FieldType::Date => write!(f, "date"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Keyword => write!(f, "keyword"),
        }
    }
}

/// Description of one discovered or well-known document field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Field name, unique within an index's inferred schema
    pub name: String,
    /// Human-readable label
    pub display_name: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Grouping label for display; `None` means the catch-all group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FieldMetadata {
    fn known(name: &str, display_name: &str, field_type: FieldType, group: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            field_type,
            group: Some(group.to_string()),
        }
    }
}

/// Group assigned to fields with no well-known definition.
pub const DEFAULT_GROUP: &str = "Other";

/// Look up a field in the well-known catalog.
///
/// Catalog entries win over inference: a field named `timestamp` is a date
/// no matter what the sampled value looks like.
pub fn well_known(name: &str) -> Option<FieldMetadata> {
    let meta = match name {
        "timestamp" => FieldMetadata::known("timestamp", "Timestamp", FieldType::Date, "System"),
        "message" => FieldMetadata::known("message", "Message", FieldType::Text, "Content"),
        "level" => FieldMetadata::known("level", "Log Level", FieldType::Keyword, "System"),
        "logger" => FieldMetadata::known("logger", "Logger", FieldType::Keyword, "System"),
        "create_time" => FieldMetadata::known("create_time", "Created At", FieldType::Date, "Time"),
        "update_time" => FieldMetadata::known("update_time", "Updated At", FieldType::Date, "Time"),
        "status" => FieldMetadata::known("status", "Status", FieldType::Keyword, "Basic"),
        "title" => FieldMetadata::known("title", "Title", FieldType::Text, "Basic"),
        "description" => FieldMetadata::known("description", "Description", FieldType::Text, "Basic"),
        "type" => FieldMetadata::known("type", "Type", FieldType::Keyword, "Basic"),
        "category" => FieldMetadata::known("category", "Category", FieldType::Keyword, "Basic"),
        "tags" => FieldMetadata::known("tags", "Tags", FieldType::Keyword, "Basic"),
        "price" => FieldMetadata::known("price", "Price", FieldType::Number, "Business"),
        "quantity" => FieldMetadata::known("quantity", "Quantity", FieldType::Number, "Business"),
        "is_active" => FieldMetadata::known("is_active", "Active", FieldType::Boolean, "Status"),
        _ => return None,
    };
    Some(meta)
}

/// Build field metadata from a one-document sample.
///
/// One entry per key of the sample, in the sample's own key order.
/// An empty sample produces no fields.
pub fn infer_fields(sample: &Map<String, Value>) -> Vec<FieldMetadata> {
    sample
        .iter()
        .map(|(name, value)| {
            well_known(name).unwrap_or_else(|| FieldMetadata {
                name: name.clone(),
                display_name: display_name(name),
                field_type: infer_type(value),
                group: Some(DEFAULT_GROUP.to_string()),
            })
        })
        .collect()
}

/// Guess a field's type from one sampled value.
fn infer_type(value: &Value) -> FieldType {
    match value {
        Value::Number(_) => FieldType::Number,
        Value::Bool(_) => FieldType::Boolean,
        Value::String(s) if looks_like_iso_date(s) => FieldType::Date,
        _ => FieldType::Text,
    }
}

/// True when the string starts with a `YYYY-MM-DD` prefix.
fn looks_like_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[0..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
}

/// Synthesize a display label: split on `_`, capitalize each segment.
pub fn display_name(field: &str) -> String {
    field
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object sample")
    }

    #[test]
    fn test_well_known_wins_over_inference() {
        // "timestamp" would infer as date anyway, but "level" holds a plain
        // string and still resolves to keyword through the catalog.
        let doc = sample(json!({"level": "warn"}));
        let fields = infer_fields(&doc);
        assert_eq!(fields[0].field_type, FieldType::Keyword);
        assert_eq!(fields[0].display_name, "Log Level");
        assert_eq!(fields[0].group.as_deref(), Some("System"));
    }

    #[test]
    fn test_inference_by_value_shape() {
        let doc = sample(json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "count": 5,
            "active": true,
            "note": "hi"
        }));
        let fields = infer_fields(&doc);
        let types: Vec<_> = fields.iter().map(|f| (f.name.as_str(), f.field_type)).collect();
        assert_eq!(
            types,
            vec![
                ("timestamp", FieldType::Date),
                ("count", FieldType::Number),
                ("active", FieldType::Boolean),
                ("note", FieldType::Text),
            ]
        );
    }

    #[test]
    fn test_unknown_field_gets_default_group() {
        let doc = sample(json!({"shipment_id": "abc-1"}));
        let fields = infer_fields(&doc);
        assert_eq!(fields[0].group.as_deref(), Some(DEFAULT_GROUP));
        assert_eq!(fields[0].display_name, "Shipment Id");
    }

    #[test]
    fn test_date_prefix_detection() {
        assert!(looks_like_iso_date("2024-03-01"));
        assert!(looks_like_iso_date("2024-03-01T10:00:00+08:00"));
        assert!(!looks_like_iso_date("03-01-2024"));
        assert!(!looks_like_iso_date("2024-3-1"));
        assert!(!looks_like_iso_date("not a date"));
    }

    #[test]
    fn test_empty_sample_produces_no_fields() {
        let doc = Map::new();
        assert!(infer_fields(&doc).is_empty());
    }

    #[test]
    fn test_key_order_preserved() {
        let doc = sample(json!({"zulu": 1, "alpha": 2, "mike": 3}));
        let names: Vec<_> = infer_fields(&doc).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_display_name_synthesis() {
        assert_eq!(display_name("create_time"), "Create Time");
        assert_eq!(display_name("note"), "Note");
        assert_eq!(display_name("a_b_c"), "A B C");
    }

    #[test]
    fn test_null_and_object_values_fall_back_to_text() {
        let doc = sample(json!({"meta": {"nested": true}, "gone": null}));
        let fields = infer_fields(&doc);
        assert!(fields.iter().all(|f| f.field_type == FieldType::Text));
    }
}
