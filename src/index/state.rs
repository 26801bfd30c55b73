//! The in-memory state of an index: postings plus stored documents.

use serde::{Deserialize, Serialize};

use crate::index::analyzed::AnalyzedDocument;
use crate::index::doc_store::DocumentStore;
use crate::index::inverted::InvertedIndex;

/// Everything a snapshot captures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexState {
    pub inverted: InvertedIndex,
    pub documents: DocumentStore,
}

impl IndexState {
    pub fn new() -> Self {
        IndexState::default()
    }

    /// Insert or replace a document. Returns whether it replaced one.
    pub fn apply_put(&mut self, document: &AnalyzedDocument) -> bool {
        let replaced = self.apply_delete(document.id());
        self.inverted.insert(document);
        self.documents.store(document.stored.clone());
        replaced
    }

    /// Remove a document. Returns whether it existed.
    pub fn apply_delete(&mut self, doc_id: &str) -> bool {
        let had_postings = self.inverted.remove(doc_id);
        self.documents.delete(doc_id) || had_postings
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.documents.contains(doc_id)
    }

    /// Document and per-field term counts.
    pub fn stats(&self) -> IndexStats {
        let fields = self
            .inverted
            .field_names()
            .into_iter()
            .filter_map(|name| {
                let field = self.inverted.field(name)?;
                Some(FieldStats {
                    name: name.to_string(),
                    documents: field.doc_count(),
                    terms: field.term_count(),
                })
            })
            .collect();

        IndexStats {
            documents: self.doc_count(),
            fields,
        }
    }
}

/// Summary of an index's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    /// Indexed fields, sorted by name.
    pub fields: Vec<FieldStats>,
}

/// Summary of one indexed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub name: String,
    /// Documents with at least one token in the field.
    pub documents: usize,
    /// Distinct terms.
    pub terms: usize,
}
