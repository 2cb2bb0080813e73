//! Condition normalization: completeness filtering and per-type value coercion.
//!
//! Coercion follows the field's declared type:
//!
//! - `number` values parse as `f64`; a failed parse substitutes `0`
//!   (long-standing quirk, kept for compatibility — see DESIGN.md)
//! - `date` values with `=` expand to the closed calendar-day interval
//! - `date` values with any other operator keep the single parsed instant,
//!   preserving an explicit offset when the input carried one
//! - a `date` value that fails to parse aborts the whole compilation
//! - everything else passes through as the raw string

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Number;
use thiserror::Error;

use super::condition::{Operator, SearchCondition};
use super::schema::{FieldMetadata, FieldType};

/// Errors raised while turning user conditions into a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A `date`-typed condition value could not be parsed. Unlike numeric
    /// coercion this is fatal: no partial query is produced.
    #[error("invalid date format for field '{field}': '{value}'")]
    InvalidDateFormat { field: String, value: String },
}

/// A condition that passed completeness filtering, with its value coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCondition {
    /// Field name
    pub field: String,
    /// Declared type; unknown fields fall back to [`FieldType::Text`]
    pub field_type: FieldType,
    /// Parsed operator; `None` for tokens outside the catalog
    pub operator: Option<Operator>,
    /// Coerced value
    pub value: CoercedValue,
}

/// A condition value after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// Raw string (text, keyword, boolean, unknown)
    Text(String),
    /// Parsed numeric value
    Number(Number),
    /// A single date instant, ISO-8601 with millisecond precision
    Instant(String),
    /// A closed calendar-day interval, both bounds inclusive
    DayRange { start: String, end: String },
}

/// Filter a condition list to the well-formed subset and coerce each value.
///
/// Never mutates the input; returns a new collection in input order.
pub fn normalize(
    conditions: &[SearchCondition],
    fields: &[FieldMetadata],
) -> Result<Vec<NormalizedCondition>, QueryError> {
    conditions
        .iter()
        .filter(|c| c.is_complete())
        .map(|c| {
            let field_type = fields
                .iter()
                .find(|f| f.name == c.field)
                .map(|f| f.field_type)
                .unwrap_or(FieldType::Text);
            let operator = Operator::parse(&c.operator);
            let value = match field_type {
                FieldType::Number => CoercedValue::Number(coerce_number(&c.value)),
                FieldType::Date => coerce_date(&c.field, &c.value, operator)?,
                _ => CoercedValue::Text(c.value.clone()),
            };
            Ok(NormalizedCondition {
                field: c.field.clone(),
                field_type,
                operator,
                value,
            })
        })
        .collect()
}

/// Parse a numeric condition value; failures become `0`.
fn coerce_number(raw: &str) -> Number {
    let parsed = raw.trim().parse::<f64>().unwrap_or(0.0);
    let value = if parsed.is_finite() { parsed } else { 0.0 };
    // Integral values serialize without a trailing ".0"
    if value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0 {
        Number::from(value as i64)
    } else {
        Number::from_f64(value).unwrap_or_else(|| Number::from(0))
    }
}

fn coerce_date(
    field: &str,
    raw: &str,
    operator: Option<Operator>,
) -> Result<CoercedValue, QueryError> {
    let instant = parse_instant(raw).ok_or_else(|| QueryError::InvalidDateFormat {
        field: field.to_string(),
        value: raw.to_string(),
    })?;

    if operator == Some(Operator::Eq) {
        let (start, end) = instant.day_range();
        Ok(CoercedValue::DayRange { start, end })
    } else {
        Ok(CoercedValue::Instant(instant.to_iso_millis()))
    }
}

/// A parsed date value, remembering which time frame the input was in.
///
/// The frame decides how the value is rendered back out: `Z` inputs stay
/// UTC, explicit offsets are preserved, and offset-less inputs stay naive
/// rather than being pinned to the host timezone.
enum ParsedInstant {
    Utc(DateTime<Utc>),
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl ParsedInstant {
    fn to_iso_millis(&self) -> String {
        match self {
            ParsedInstant::Utc(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            ParsedInstant::Offset(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            ParsedInstant::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        }
    }

    /// Expand to the enclosing calendar day in the value's own frame.
    fn day_range(&self) -> (String, String) {
        match self {
            ParsedInstant::Utc(dt) => day_bounds(dt.date_naive(), "Z"),
            ParsedInstant::Offset(dt) => {
                let suffix = dt.offset().to_string();
                day_bounds(dt.date_naive(), &suffix)
            }
            ParsedInstant::Naive(dt) => day_bounds(dt.date(), ""),
        }
    }
}

fn day_bounds(date: NaiveDate, suffix: &str) -> (String, String) {
    let day = date.format("%Y-%m-%d");
    (
        format!("{day}T00:00:00.000{suffix}"),
        format!("{day}T23:59:59.999{suffix}"),
    )
}

fn parse_instant(raw: &str) -> Option<ParsedInstant> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        if trimmed.ends_with('Z') || trimmed.ends_with('z') {
            return Some(ParsedInstant::Utc(dt.with_timezone(&Utc)));
        }
        return Some(ParsedInstant::Offset(dt));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ParsedInstant::Naive(dt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(ParsedInstant::Naive(date.and_time(NaiveTime::MIN)));
    }

    None
}
