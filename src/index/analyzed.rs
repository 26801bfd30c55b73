//! Documents after analysis, ready to be applied to the index.
//!
//! Analysis runs before any index lock is taken; the result is a plain
//! value that the writer swaps into the index state.

use std::collections::BTreeMap;

use log::trace;

use crate::document::Document;
use crate::error::Result;
use crate::mapping::ResolvedMapping;

/// Terms of one indexed field with the positions each occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedField {
    pub name: String,
    /// Name of the analyzer that produced `terms`.
    pub analyzer: String,
    pub terms: BTreeMap<String, Vec<u32>>,
    /// Number of surviving tokens, n-gram expansions included.
    pub length: u32,
}

/// A document split into its stored part and its indexed terms.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedDocument {
    /// The stored fields only, with the document type kept.
    pub stored: Document,
    pub fields: Vec<AnalyzedField>,
}

impl AnalyzedDocument {
    /// The document ID.
    pub fn id(&self) -> &str {
        self.stored.id()
    }

    /// Analyze every field of `document` with the analyzer the mapping
    /// resolves for it.
    ///
    /// Fields the mapping ignores are dropped; fields that analyze to no
    /// tokens are stored but contribute no postings.
    pub fn analyze(document: &Document, mapping: &ResolvedMapping) -> Result<Self> {
        document.validate()?;

        let mut stored = Document::new(document.id());
        if let Some(doc_type) = document.doc_type() {
            stored.set_doc_type(doc_type);
        }

        let mut fields = Vec::new();
        for field in document.fields() {
            let Some(options) = mapping.resolve_field(document.doc_type(), &field.name) else {
                trace!("document '{}': field '{}' not mapped", document.id(), field.name);
                continue;
            };

            if options.store {
                stored.add_field(field.name.clone(), field.value.clone());
            }
            if !options.index {
                continue;
            }

            let tokens = options
                .analyzer
                .analyze_to_vec(&field.value.to_index_text())?;
            let mut terms: BTreeMap<String, Vec<u32>> = BTreeMap::new();
            for token in &tokens {
                terms
                    .entry(token.text.clone())
                    .or_default()
                    .push(token.position as u32);
            }
            if terms.is_empty() {
                continue;
            }

            fields.push(AnalyzedField {
                name: field.name.clone(),
                analyzer: options.analyzer_name.to_string(),
                terms,
                length: tokens.len() as u32,
            });
        }

        Ok(AnalyzedDocument { stored, fields })
    }
}
