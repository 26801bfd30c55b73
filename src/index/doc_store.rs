//! Stored field values keyed by document ID.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::{Document, FieldValue};

/// Field-name wildcard selecting every stored field.
pub const ALL_FIELDS: &str = "*";

/// Stored documents. Only fields mapped with `store = true` ever reach
/// this store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStore {
    documents: AHashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        DocumentStore::default()
    }

    /// Store a document, replacing any previous version.
    pub fn store(&mut self, document: Document) {
        self.documents.insert(document.id().to_string(), document);
    }

    /// Requested stored fields of `doc_id`, or `None` if the document is
    /// unknown. `*` selects every stored field; unstored or missing names
    /// are absent from the result.
    pub fn fetch<S: AsRef<str>>(
        &self,
        doc_id: &str,
        field_names: &[S],
    ) -> Option<BTreeMap<String, FieldValue>> {
        let document = self.documents.get(doc_id)?;
        let all = field_names.iter().any(|name| name.as_ref() == ALL_FIELDS);

        Some(
            document
                .fields()
                .iter()
                .filter(|f| all || field_names.iter().any(|name| name.as_ref() == f.name))
                .map(|f| (f.name.clone(), f.value.clone()))
                .collect(),
        )
    }

    /// The whole stored document.
    pub fn fetch_all(&self, doc_id: &str) -> Option<&Document> {
        self.documents.get(doc_id)
    }

    /// Remove a document. Returns whether it existed.
    pub fn delete(&mut self, doc_id: &str) -> bool {
        self.documents.remove(doc_id).is_some()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.documents.contains_key(doc_id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
