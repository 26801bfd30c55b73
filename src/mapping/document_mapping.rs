//! Per-document-type mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::field::FieldMapping;

fn default_true() -> bool {
    true
}

/// Mapping for one document type.
///
/// - `enabled = false` indexes and stores nothing for documents of this type.
/// - `dynamic = true` indexes and stores undeclared fields with the
///   inherited analyzer; `dynamic = false` ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMapping {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub dynamic: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_analyzer: Option<String>,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldMapping>,
}

impl DocumentMapping {
    /// An enabled, dynamic mapping with no declared fields.
    pub fn new() -> Self {
        DocumentMapping {
            enabled: true,
            dynamic: true,
            default_analyzer: None,
            fields: BTreeMap::new(),
        }
    }

    /// A mapping that ignores every document of its type.
    pub fn disabled() -> Self {
        DocumentMapping {
            enabled: false,
            ..Self::new()
        }
    }

    /// Declare a field.
    pub fn add_field<S: Into<String>>(mut self, name: S, mapping: FieldMapping) -> Self {
        self.fields.insert(name.into(), mapping);
        self
    }

    /// Set the default analyzer for fields of this type.
    pub fn with_default_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.default_analyzer = Some(analyzer.into());
        self
    }

    /// Set whether undeclared fields are indexed.
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(name)
    }
}

impl Default for DocumentMapping {
    fn default() -> Self {
        Self::new()
    }
}
