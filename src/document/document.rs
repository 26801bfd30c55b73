//! Document structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::field_value::FieldValue;
use crate::error::{Result, TesseraError};

/// Key that carries the document type in JSON input.
pub const TYPE_KEY: &str = "_type";

/// A named field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// A document to be indexed.
///
/// Field order is insertion order; adding a field whose name already exists
/// replaces the value in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    doc_type: Option<String>,
    fields: Vec<Field>,
}

impl Document {
    /// Create an empty document with the given ID.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Document {
            id: id.into(),
            doc_type: None,
            fields: Vec::new(),
        }
    }

    /// Start building a document.
    pub fn builder<S: Into<String>>(id: S) -> DocumentBuilder {
        DocumentBuilder::new(id)
    }

    /// Build a document from a JSON object.
    ///
    /// Nested objects are flattened with dotted names (`{"a":{"b":1}}`
    /// yields field `a.b`). Strings become text, integers and floats keep
    /// their numeric type, booleans become the text `true`/`false`. Arrays
    /// and nulls are skipped. A top-level `_type` string sets the document
    /// type.
    ///
    /// ```
    /// use serde_json::json;
    /// use tessera::document::document::Document;
    ///
    /// let doc = Document::from_json("7", &json!({
    ///     "_type": "email",
    ///     "From": "a@b.c",
    ///     "meta": {"size": 12}
    /// })).unwrap();
    ///
    /// assert_eq!(doc.doc_type(), Some("email"));
    /// assert_eq!(doc.get_field("meta.size").and_then(|v| v.as_integer()), Some(12));
    /// ```
    pub fn from_json<S: Into<String>>(id: S, value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| TesseraError::index("document JSON must be an object"))?;

        let mut document = Document::new(id);
        for (key, value) in object {
            if key == TYPE_KEY {
                if let Some(doc_type) = value.as_str() {
                    document.doc_type = Some(doc_type.to_string());
                }
                continue;
            }
            document.flatten_json(key, value);
        }
        Ok(document)
    }

    fn flatten_json(&mut self, name: &str, value: &Value) {
        match value {
            Value::String(s) => self.add_field(name, FieldValue::Text(s.clone())),
            Value::Bool(b) => self.add_field(name, FieldValue::Text(b.to_string())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.add_field(name, FieldValue::Integer(i));
                } else if let Some(f) = n.as_f64() {
                    self.add_field(name, FieldValue::Float(f));
                }
            }
            Value::Object(map) => {
                for (key, nested) in map {
                    self.flatten_json(&format!("{name}.{key}"), nested);
                }
            }
            Value::Array(_) | Value::Null => {}
        }
    }

    /// The document identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document type used for mapping resolution, if any.
    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    /// Set the document type.
    pub fn set_doc_type<S: Into<String>>(&mut self, doc_type: S) {
        self.doc_type = Some(doc_type.into());
    }

    /// Add a field, replacing any existing field of the same name.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.value = value,
            None => self.fields.push(Field { name, value }),
        }
    }

    /// Get a field value by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Check whether the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Remove a field, returning its value.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(idx).value)
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject documents that cannot be indexed.
    ///
    /// Non-finite floats are rejected too: they have no JSON form, so the
    /// write-ahead log could not replay them.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(TesseraError::index("document ID must not be empty"));
        }
        if let Some(field) = self.fields.iter().find(|f| f.name.is_empty()) {
            return Err(TesseraError::index(format!(
                "document '{}' has a field with an empty name (value {})",
                self.id, field.value
            )));
        }
        if let Some(field) = self
            .fields
            .iter()
            .find(|f| matches!(f.value, FieldValue::Float(v) if !v.is_finite()))
        {
            return Err(TesseraError::index(format!(
                "document '{}' field '{}' holds a non-finite float ({})",
                self.id, field.name, field.value
            )));
        }
        Ok(())
    }
}

/// Builder for [`Document`].
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a builder for a document with the given ID.
    pub fn new<S: Into<String>>(id: S) -> Self {
        DocumentBuilder {
            document: Document::new(id),
        }
    }

    /// Set the document type.
    pub fn doc_type<S: Into<String>>(mut self, doc_type: S) -> Self {
        self.document.set_doc_type(doc_type);
        self
    }

    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document
            .add_field(name, FieldValue::Text(value.into()));
        self
    }

    pub fn add_integer<S: Into<String>>(mut self, name: S, value: i64) -> Self {
        self.document.add_field(name, FieldValue::Integer(value));
        self
    }

    pub fn add_float<S: Into<String>>(mut self, name: S, value: f64) -> Self {
        self.document.add_field(name, FieldValue::Float(value));
        self
    }

    pub fn add_datetime<S: Into<String>>(mut self, name: S, value: DateTime<Utc>) -> Self {
        self.document.add_field(name, FieldValue::DateTime(value));
        self
    }

    pub fn add_field<S: Into<String>>(mut self, name: S, value: FieldValue) -> Self {
        self.document.add_field(name, value);
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_preserves_order() {
        let doc = Document::builder("1")
            .add_text("From", "aouyang1@gmail.com")
            .add_text("Body", "I'm Trying to learn bleve")
            .build();

        assert_eq!(doc.id(), "1");
        assert_eq!(doc.field_names(), vec!["From", "Body"]);
        assert_eq!(doc.doc_type(), None);
    }

    #[test]
    fn test_add_field_replaces() {
        let mut doc = Document::new("1");
        doc.add_field("Body", FieldValue::from("old"));
        doc.add_field("From", FieldValue::from("x"));
        doc.add_field("Body", FieldValue::from("new"));

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get_field("Body").and_then(|v| v.as_text()), Some("new"));
        assert_eq!(doc.field_names(), vec!["Body", "From"]);
    }

    #[test]
    fn test_from_json_flattens_and_skips() {
        let doc = Document::from_json(
            "x",
            &json!({"a": {"b": "deep"}, "n": 1.5, "flag": true, "list": [1, 2], "none": null}),
        )
        .unwrap();

        assert_eq!(doc.get_field("a.b").and_then(|v| v.as_text()), Some("deep"));
        assert_eq!(doc.get_field("n").and_then(|v| v.as_float()), Some(1.5));
        assert_eq!(doc.get_field("flag").and_then(|v| v.as_text()), Some("true"));
        assert!(!doc.has_field("list"));
        assert!(!doc.has_field("none"));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Document::from_json("x", &json!("text")).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Document::new("").validate().is_err());
        assert!(Document::builder("ok").add_text("", "v").build().validate().is_err());
        assert!(Document::builder("ok").add_text("f", "v").build().validate().is_ok());
        assert!(Document::builder("ok").add_float("score", 0.5).build().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_floats() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let doc = Document::builder("1").add_float("score", value).build();
            let err = doc.validate().unwrap_err();
            assert!(err.to_string().contains("non-finite"), "{err}");
        }
    }

    #[test]
    fn test_remove_field() {
        let mut doc = Document::builder("1").add_integer("n", 3).build();
        assert_eq!(doc.remove_field("n"), Some(FieldValue::Integer(3)));
        assert!(doc.is_empty());
    }
}
