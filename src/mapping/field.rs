//! Field mapping definition.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Options for a single named field.
///
/// `analyzer = None` inherits from the enclosing document mapping, then
/// from the index default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,

    /// Keep the raw value in the document store.
    #[serde(default = "default_true")]
    pub store: bool,

    /// Analyze the value into the inverted index.
    #[serde(default = "default_true")]
    pub index: bool,
}

impl FieldMapping {
    /// A stored, indexed field with an inherited analyzer.
    pub fn text() -> Self {
        FieldMapping {
            analyzer: None,
            store: true,
            index: true,
        }
    }

    /// Set an explicit analyzer.
    pub fn with_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Set whether the raw value is stored.
    pub fn stored(mut self, store: bool) -> Self {
        self.store = store;
        self
    }

    /// Set whether the value is indexed.
    pub fn indexed(mut self, index: bool) -> Self {
        self.index = index;
        self
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let mapping: FieldMapping = serde_json::from_str("{}").unwrap();
        assert_eq!(mapping, FieldMapping::text());
        assert!(mapping.store);
        assert!(mapping.index);
    }

    #[test]
    fn test_builder() {
        let mapping = FieldMapping::text().with_analyzer("keyword").stored(false);
        assert_eq!(mapping.analyzer.as_deref(), Some("keyword"));
        assert!(!mapping.store);
        assert!(mapping.index);
    }
}
