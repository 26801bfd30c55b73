//! Field value types for documents.
//!
//! Every value has a canonical text form (see [`FieldValue::to_index_text`])
//! which is what the field's analyzer sees at index time. Querying a
//! numeric or date field therefore uses the same text: `42`, `3.5`, or an
//! RFC 3339 timestamp.
//!
//! ```
//! use tessera::document::field_value::FieldValue;
//!
//! let text_value = FieldValue::Text("hello".to_string());
//! assert_eq!(text_value.as_text(), Some("hello"));
//!
//! let int_value = FieldValue::Integer(42);
//! assert_eq!(int_value.to_index_text(), "42");
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Represents a value for a field in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Date and time value in UTC
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Get the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the datetime if this is a datetime value.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The canonical text handed to the analyzer.
    pub fn to_index_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    /// Short type name, used in CLI output.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::DateTime(_) => "datetime",
        }
    }

    /// Convert to a JSON value for display.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Value::from(*f),
            FieldValue::DateTime(_) => serde_json::Value::String(self.to_index_text()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_index_text())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_canonical_text() {
        assert_eq!(FieldValue::from("abc").to_index_text(), "abc");
        assert_eq!(FieldValue::from(-7i64).to_index_text(), "-7");
        assert_eq!(FieldValue::from(2.5f64).to_index_text(), "2.5");

        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            FieldValue::from(dt).to_index_text(),
            "2024-03-01T12:00:00Z"
        );
    }

    #[test]
    fn test_accessors() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_text(), None);
        assert_eq!(value.type_name(), "integer");
        assert_eq!(value.to_json(), serde_json::json!(42));
    }

    #[test]
    fn test_bincode_roundtrip_of_datetime() {
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let bytes = bincode::serialize(&FieldValue::DateTime(dt)).unwrap();
        let back: FieldValue = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, FieldValue::DateTime(dt));
    }
}
