//! Query compiler: normalized conditions → Query DSL document.
//!
//! # Output shape
//!
//! ```text
//! []            →  {"query":{"match_all":{}}}
//! [c1, c2, …]   →  {"query":{"bool":{"must":[clause(c1), clause(c2), …]}}}
//! ```
//!
//! Clause order follows input order and compilation is deterministic: the
//! same normalized input always yields byte-identical output.

use serde_json::{json, Map, Value};

use super::condition::Operator;
use super::normalize::{CoercedValue, NormalizedCondition};
use super::schema::FieldType;

/// Compile a normalized condition list to a DSL document string.
#[must_use]
pub fn compile(conditions: &[NormalizedCondition]) -> String {
    compile_value(conditions).to_string()
}

/// Compile to a JSON value instead of a string.
#[must_use]
pub fn compile_value(conditions: &[NormalizedCondition]) -> Value {
    if conditions.is_empty() {
        return json!({"query": {"match_all": {}}});
    }
    let must: Vec<Value> = conditions.iter().map(clause).collect();
    json!({"query": {"bool": {"must": must}}})
}

/// One DSL clause per condition, keyed by `(field type, operator)`.
fn clause(condition: &NormalizedCondition) -> Value {
    if condition.field_type == FieldType::Date {
        return date_clause(condition);
    }

    match condition.operator {
        Some(Operator::Eq) => equality(condition),
        Some(Operator::Ne) => wrap("bool", wrap("must_not", equality(condition))),
        Some(Operator::Gt) => range(condition, "gt"),
        Some(Operator::Gte) => range(condition, "gte"),
        Some(Operator::Lt) => range(condition, "lt"),
        Some(Operator::Lte) => range(condition, "lte"),
        Some(Operator::Contains) => leaf("match", condition),
        Some(Operator::StartsWith) => leaf("prefix", condition),
        Some(Operator::EndsWith) => wrap(
            "wildcard",
            wrap(&condition.field, Value::String(format!("*{}", text_of(condition)))),
        ),
        // Unrecognized operator: fall back to a match clause
        None => leaf("match", condition),
    }
}

fn date_clause(condition: &NormalizedCondition) -> Value {
    match &condition.value {
        CoercedValue::DayRange { start, end } => {
            let mut bounds = Map::new();
            bounds.insert("gte".into(), Value::String(start.clone()));
            bounds.insert("lte".into(), Value::String(end.clone()));
            wrap("range", wrap(&condition.field, Value::Object(bounds)))
        }
        CoercedValue::Instant(_) => match condition.operator {
            Some(Operator::Gt) => range(condition, "gt"),
            Some(Operator::Gte) => range(condition, "gte"),
            Some(Operator::Lt) => range(condition, "lt"),
            Some(Operator::Lte) => range(condition, "lte"),
            // Anything else degrades to a point range
            _ => {
                let value = value_of(condition);
                let mut bounds = Map::new();
                bounds.insert("gte".into(), value.clone());
                bounds.insert("lte".into(), value);
                wrap("range", wrap(&condition.field, Value::Object(bounds)))
            }
        },
        // A date condition always coerces to an instant or a day range;
        // keep the degenerate case total anyway.
        _ => leaf("match", condition),
    }
}

/// `match` for text-typed fields, `term` for everything else.
fn equality(condition: &NormalizedCondition) -> Value {
    let kind = if condition.field_type == FieldType::Text {
        "match"
    } else {
        "term"
    };
    leaf(kind, condition)
}

fn range(condition: &NormalizedCondition, bound: &str) -> Value {
    wrap(
        "range",
        wrap(&condition.field, wrap(bound, value_of(condition))),
    )
}

fn leaf(kind: &str, condition: &NormalizedCondition) -> Value {
    wrap(kind, wrap(&condition.field, value_of(condition)))
}

fn wrap(key: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(key.to_string(), value);
    Value::Object(object)
}

fn value_of(condition: &NormalizedCondition) -> Value {
    match &condition.value {
        CoercedValue::Text(s) => Value::String(s.clone()),
        CoercedValue::Number(n) => Value::Number(n.clone()),
        CoercedValue::Instant(s) => Value::String(s.clone()),
        // Range values are handled by the date branch; collapse to the start
        // bound if one ever reaches a scalar position.
        CoercedValue::DayRange { start, .. } => Value::String(start.clone()),
    }
}

fn text_of(condition: &NormalizedCondition) -> String {
    match value_of(condition) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
