//! In-memory inverted index: (field, term) → posting list.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::index::analyzed::AnalyzedDocument;
use crate::index::posting::{Posting, PostingList, merge_by_document};

/// Terms and statistics of one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldIndex {
    terms: BTreeMap<String, PostingList>,
    /// Token count of this field per document.
    lengths: AHashMap<String, u32>,
    /// Analyzers that produced this field's terms, with their document
    /// counts.
    analyzers: BTreeMap<String, usize>,
}

impl FieldIndex {
    /// The posting list of `term`, if any document contains it.
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.terms.get(term)
    }

    /// Number of documents with at least one token in this field.
    pub fn doc_count(&self) -> usize {
        self.lengths.len()
    }

    /// Token count of this field in `doc_id`.
    pub fn field_length(&self, doc_id: &str) -> Option<u32> {
        self.lengths.get(doc_id).copied()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Distinct terms in order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Names of the analyzers this field was indexed with, sorted. More
    /// than one when document types analyze the field differently.
    pub fn analyzers(&self) -> impl Iterator<Item = &str> {
        self.analyzers.keys().map(String::as_str)
    }
}

/// What one document put into one field, kept so a delete can undo it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocField {
    field: String,
    analyzer: String,
    terms: Vec<String>,
}

/// The inverted index of every field.
///
/// A per-document registry of the fields and terms each document holds
/// lets a delete touch only the posting lists the document appears in.
/// Empty posting lists and empty fields are pruned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    fields: AHashMap<String, FieldIndex>,
    doc_terms: AHashMap<String, Vec<DocField>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Add the postings of an analyzed document, replacing any postings a
    /// document with the same ID already has.
    pub fn insert(&mut self, document: &AnalyzedDocument) {
        let doc_id = document.id();
        self.remove(doc_id);

        let mut doc_fields = Vec::with_capacity(document.fields.len());
        for field in &document.fields {
            let field_index = self.fields.entry(field.name.clone()).or_default();
            for (term, positions) in &field.terms {
                field_index
                    .terms
                    .entry(term.clone())
                    .or_default()
                    .add_posting(Posting::with_positions(doc_id, positions.clone()));
            }
            field_index.lengths.insert(doc_id.to_string(), field.length);
            *field_index
                .analyzers
                .entry(field.analyzer.clone())
                .or_default() += 1;

            doc_fields.push(DocField {
                field: field.name.clone(),
                analyzer: field.analyzer.clone(),
                terms: field.terms.keys().cloned().collect(),
            });
        }

        if !doc_fields.is_empty() {
            self.doc_terms.insert(doc_id.to_string(), doc_fields);
        }
    }

    /// Remove every posting of `doc_id`. Returns whether any existed.
    pub fn remove(&mut self, doc_id: &str) -> bool {
        let Some(doc_fields) = self.doc_terms.remove(doc_id) else {
            return false;
        };

        for doc_field in doc_fields {
            let Some(field_index) = self.fields.get_mut(&doc_field.field) else {
                continue;
            };
            for term in &doc_field.terms {
                if let Some(list) = field_index.terms.get_mut(term) {
                    list.remove(doc_id);
                    if list.is_empty() {
                        field_index.terms.remove(term);
                    }
                }
            }
            field_index.lengths.remove(doc_id);
            if let Some(count) = field_index.analyzers.get_mut(&doc_field.analyzer) {
                *count -= 1;
                if *count == 0 {
                    field_index.analyzers.remove(&doc_field.analyzer);
                }
            }
            if field_index.terms.is_empty() {
                self.fields.remove(&doc_field.field);
            }
        }
        true
    }

    /// Postings of `term` in `field`, sorted by document ID; empty if
    /// unknown.
    pub fn postings_for(&self, field: &str, term: &str) -> Vec<Posting> {
        self.field(field)
            .and_then(|f| f.postings(term))
            .map(|list| list.postings().to_vec())
            .unwrap_or_default()
    }

    /// Postings of `term` across all fields, merged per document.
    pub fn postings_for_term(&self, term: &str) -> Vec<Posting> {
        merge_by_document(self.fields.values().filter_map(|f| f.postings(term)))
    }

    /// Documents in `field` containing `term`.
    pub fn doc_frequency(&self, field: &str, term: &str) -> usize {
        self.field(field)
            .and_then(|f| f.postings(term))
            .map_or(0, PostingList::doc_frequency)
    }

    /// The index of one field.
    pub fn field(&self, field: &str) -> Option<&FieldIndex> {
        self.fields.get(field)
    }

    /// Names of the fields that have postings, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether `doc_id` has any postings.
    pub fn contains(&self, doc_id: &str) -> bool {
        self.doc_terms.contains_key(doc_id)
    }

    /// Whether the index holds no postings at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::mapping::{DocumentMapping, IndexMapping, ResolvedMapping};

    fn analyzed(id: &str, from: &str, body: &str) -> AnalyzedDocument {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let doc = Document::builder(id)
            .add_text("From", from)
            .add_text("Body", body)
            .build();
        AnalyzedDocument::analyze(&doc, &mapping).unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = InvertedIndex::new();
        index.insert(&analyzed("0", "marty", "bleve indexing is easy"));
        index.insert(&analyzed("2", "souyang", "why is bleve hard"));

        let postings = index.postings_for("Body", "bleve");
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].doc_id, "0");
        assert_eq!(postings[1].doc_id, "2");
        assert_eq!(index.doc_frequency("Body", "bleve"), 2);
        assert!(index.postings_for("From", "bleve").is_empty());
        assert!(index.postings_for("Nope", "bleve").is_empty());
        assert_eq!(index.field_names(), vec!["Body", "From"]);
        assert_eq!(index.field("Body").unwrap().field_length("0"), Some(3));
    }

    #[test]
    fn test_replace_removes_old_terms() {
        let mut index = InvertedIndex::new();
        index.insert(&analyzed("0", "a", "old words"));
        index.insert(&analyzed("0", "a", "new text"));

        assert!(index.postings_for("Body", "old").is_empty());
        assert_eq!(index.postings_for("Body", "new").len(), 1);
        assert_eq!(index.field("Body").unwrap().doc_count(), 1);
    }

    #[test]
    fn test_remove_prunes_everything() {
        let mut index = InvertedIndex::new();
        index.insert(&analyzed("0", "marty", "bleve"));

        assert!(index.remove("0"));
        assert!(!index.remove("0"));
        assert!(index.is_empty());
        assert!(!index.contains("0"));
        assert!(index.field_names().is_empty());
    }

    #[test]
    fn test_records_analyzer_per_field() {
        let mapping = ResolvedMapping::new(
            IndexMapping::new().add_type_mapping(
                "raw",
                DocumentMapping::new().with_default_analyzer("keyword"),
            ),
        )
        .unwrap();
        let typed = |id: &str, doc_type: Option<&str>| {
            let mut doc = Document::builder(id).add_text("Subject", "Hello World").build();
            if let Some(doc_type) = doc_type {
                doc.set_doc_type(doc_type);
            }
            AnalyzedDocument::analyze(&doc, &mapping).unwrap()
        };

        let mut index = InvertedIndex::new();
        index.insert(&typed("a", Some("raw")));
        index.insert(&typed("b", None));
        let analyzers: Vec<&str> = index.field("Subject").unwrap().analyzers().collect();
        assert_eq!(analyzers, vec!["keyword", "standard"]);

        index.remove("a");
        let analyzers: Vec<&str> = index.field("Subject").unwrap().analyzers().collect();
        assert_eq!(analyzers, vec!["standard"]);
        assert!(index.postings_for("Subject", "Hello World").is_empty());
    }

    #[test]
    fn test_postings_for_term_merges_fields() {
        let mut index = InvertedIndex::new();
        index.insert(&analyzed("0", "bleve", "bleve bleve"));

        let merged = index.postings_for_term("bleve");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].frequency, 3);
    }
}
