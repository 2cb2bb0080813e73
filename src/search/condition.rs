//! Search conditions, the operator catalog, and saved searches.

use serde::{Deserialize, Serialize};

use super::schema::FieldType;

/// Comparison operator token.
///
/// User input carries operators as raw tokens (see [`SearchCondition`]); this
/// enum is the parsed form. Tokens outside this set are tolerated downstream
/// by the compiler's match-all-fields fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `contains`
    Contains,
    /// `starts_with`
    StartsWith,
    /// `ends_with`
    EndsWith,
}

impl Operator {
    /// The wire/UI token for this operator.
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
        }
    }

    /// Parse a token; `None` for anything outside the catalog.
    #[must_use]
    pub fn parse(token: &str) -> Option<Operator> {
        match token {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Gte),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Lte),
            "contains" => Some(Operator::Contains),
            "starts_with" => Some(Operator::StartsWith),
            "ends_with" => Some(Operator::EndsWith),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One catalog entry: the operator plus its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorOption {
    pub value: Operator,
    pub label: &'static str,
}

const fn opt(value: Operator, label: &'static str) -> OperatorOption {
    OperatorOption { value, label }
}

const NUMBER_OPERATORS: &[OperatorOption] = &[
    opt(Operator::Eq, "equals"),
    opt(Operator::Gt, "greater than"),
    opt(Operator::Gte, "greater or equal"),
    opt(Operator::Lt, "less than"),
    opt(Operator::Lte, "less or equal"),
];

const DATE_OPERATORS: &[OperatorOption] = &[
    opt(Operator::Eq, "on"),
    opt(Operator::Gt, "later than"),
    opt(Operator::Gte, "later or equal"),
    opt(Operator::Lt, "earlier than"),
    opt(Operator::Lte, "earlier or equal"),
];

const BOOLEAN_OPERATORS: &[OperatorOption] = &[opt(Operator::Eq, "equals")];

const KEYWORD_OPERATORS: &[OperatorOption] = &[
    opt(Operator::Eq, "equals"),
    opt(Operator::Ne, "not equals"),
];

const TEXT_OPERATORS: &[OperatorOption] = &[
    opt(Operator::Eq, "equals"),
    opt(Operator::Contains, "contains"),
    opt(Operator::StartsWith, "starts with"),
    opt(Operator::EndsWith, "ends with"),
];

/// Legal operators for a field type.
///
/// Total over [`FieldType`]; the text entry doubles as the behavior for
/// fields whose type was guessed wrong.
#[must_use]
pub fn operator_options(field_type: FieldType) -> &'static [OperatorOption] {
    match field_type {
        FieldType::Number => NUMBER_OPERATORS,
        FieldType::Date => DATE_OPERATORS,
        FieldType::Boolean => BOOLEAN_OPERATORS,
        FieldType::Keyword => KEYWORD_OPERATORS,
        FieldType::Text => TEXT_OPERATORS,
    }
}

/// One row of user input, raw and uncoerced.
///
/// A condition participates in compilation only when both `field` and
/// `value` are non-empty; anything else is silently skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCondition {
    /// Field name, or empty for an incomplete row
    #[serde(default)]
    pub field: String,
    /// Operator token, defaults to `=`
    #[serde(default = "default_operator")]
    pub operator: String,
    /// Value exactly as typed
    #[serde(default)]
    pub value: String,
}

fn default_operator() -> String {
    Operator::Eq.token().to_string()
}

impl SearchCondition {
    /// A fresh, incomplete condition row.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            field: String::new(),
            operator: default_operator(),
            value: String::new(),
        }
    }

    /// A fully specified condition.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.token().to_string(),
            value: value.into(),
        }
    }

    /// True when both field and value are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.field.is_empty() && !self.value.is_empty()
    }
}

impl Default for SearchCondition {
    fn default() -> Self {
        Self::blank()
    }
}

/// A named, persisted snapshot of a condition list.
///
/// Immutable once saved; re-saving creates a new entry. Conditions are
/// stored raw, never coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    /// Opaque unique identifier (millisecond timestamp)
    pub id: String,
    /// User-supplied label
    pub name: String,
    /// Conditions captured at save time
    pub conditions: Vec<SearchCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_token_round_trip() {
        for op in [
            Operator::Eq,
            Operator::Ne,
            Operator::Gt,
            Operator::Gte,
            Operator::Lt,
            Operator::Lte,
            Operator::Contains,
            Operator::StartsWith,
            Operator::EndsWith,
        ] {
            assert_eq!(Operator::parse(op.token()), Some(op));
        }
        assert_eq!(Operator::parse("between"), None);
    }

    #[test]
    fn test_number_operators() {
        let tokens: Vec<_> = operator_options(FieldType::Number)
            .iter()
            .map(|o| o.value.token())
            .collect();
        assert_eq!(tokens, vec!["=", ">", ">=", "<", "<="]);
    }

    #[test]
    fn test_date_operators_use_temporal_labels() {
        let options = operator_options(FieldType::Date);
        let tokens: Vec<_> = options.iter().map(|o| o.value.token()).collect();
        assert_eq!(tokens, vec!["=", ">", ">=", "<", "<="]);
        assert!(options.iter().any(|o| o.label == "later than"));
        assert!(options.iter().any(|o| o.label == "earlier than"));
    }

    #[test]
    fn test_boolean_only_equality() {
        let options = operator_options(FieldType::Boolean);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, Operator::Eq);
    }

    #[test]
    fn test_keyword_operators() {
        let tokens: Vec<_> = operator_options(FieldType::Keyword)
            .iter()
            .map(|o| o.value.token())
            .collect();
        assert_eq!(tokens, vec!["=", "!="]);
    }

    #[test]
    fn test_text_operators() {
        let tokens: Vec<_> = operator_options(FieldType::Text)
            .iter()
            .map(|o| o.value.token())
            .collect();
        assert_eq!(tokens, vec!["=", "contains", "starts_with", "ends_with"]);
    }

    #[test]
    fn test_blank_condition() {
        let c = SearchCondition::blank();
        assert_eq!(c.operator, "=");
        assert!(!c.is_complete());
    }

    #[test]
    fn test_completeness() {
        assert!(SearchCondition::new("price", Operator::Gte, "9.5").is_complete());
        assert!(!SearchCondition::new("", Operator::Eq, "x").is_complete());
        assert!(!SearchCondition::new("price", Operator::Eq, "").is_complete());
    }

    #[test]
    fn test_condition_deserializes_with_defaults() {
        let c: SearchCondition = serde_json::from_str("{}").expect("parse");
        assert_eq!(c, SearchCondition::blank());
    }
}
