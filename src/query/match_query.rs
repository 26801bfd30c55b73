//! Match query: analyzed free text, OR-of-terms by default.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::trace;

use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, TesseraError};
use crate::query::query::{CompiledQuery, Operator, Query, QueryContext, validate_boost};

/// A query whose text is analyzed with the analyzer bound to the target
/// field, the same one used at index time.
///
/// The index records which analyzers produced each field's terms. When
/// document types analyze a field differently, the text is analyzed with
/// each of them and the resulting terms are combined, each distinct term
/// once per field.
///
/// Without a field every indexed field is searched, each with its own
/// analyzer, and the contributions are summed.
///
/// # Examples
///
/// ```
/// use tessera::query::{MatchQuery, Operator, Query};
///
/// let query = MatchQuery::new("bleve hard")
///     .with_field("Body")
///     .with_operator(Operator::And);
/// assert!(query.validate().is_ok());
/// assert_eq!(query.field(), Some("Body"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    text: String,
    field: Option<String>,
    operator: Operator,
    boost: f32,
}

impl MatchQuery {
    pub fn new<S: Into<String>>(text: S) -> Self {
        MatchQuery {
            text: text.into(),
            field: None,
            operator: Operator::Or,
            boost: 1.0,
        }
    }

    /// Restrict the query to one field.
    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }
}

impl Query for MatchQuery {
    fn validate(&self) -> Result<()> {
        if matches!(self.field.as_deref(), Some("")) {
            return Err(TesseraError::query("match query field name is empty"));
        }
        validate_boost(self.boost)
    }

    fn compile(&self, ctx: &QueryContext<'_>) -> Result<CompiledQuery> {
        let fields: Vec<&str> = match self.field.as_deref() {
            Some(field) => vec![field],
            None => ctx.inverted.field_names(),
        };

        let mut compiled = CompiledQuery::new(self.operator, self.boost);
        for field in fields {
            let mut covered = BTreeSet::new();
            for analyzer in field_analyzers(ctx, field) {
                let fresh: Vec<String> = analyzer
                    .analyze_to_vec(&self.text)?
                    .into_iter()
                    .map(|token| token.text)
                    .filter(|term| !covered.contains(term))
                    .collect();
                for term in &fresh {
                    compiled.add_clause(field, term.clone());
                }
                covered.extend(fresh);
            }
        }
        trace!(
            "compiled {} into {} clauses",
            self.description(),
            compiled.clauses.len()
        );
        Ok(compiled)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        match &self.field {
            Some(field) => format!("match({field}:{:?})", self.text),
            None => format!("match({:?})", self.text),
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

/// Analyzers that produced the terms of `field`; the mapping's query
/// analyzer when the field has no postings yet.
fn field_analyzers(ctx: &QueryContext<'_>, field: &str) -> Vec<Arc<dyn Analyzer>> {
    let recorded: Vec<Arc<dyn Analyzer>> = ctx
        .inverted
        .field(field)
        .map(|index| {
            index
                .analyzers()
                .filter_map(|name| ctx.mapping.registry().get(name))
                .collect()
        })
        .unwrap_or_default();

    if recorded.is_empty() {
        vec![ctx.mapping.query_analyzer(field)]
    } else {
        recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::analyzed::AnalyzedDocument;
    use crate::index::inverted::InvertedIndex;
    use crate::mapping::{DocumentMapping, IndexMapping, ResolvedMapping};

    fn index_of(mapping: &ResolvedMapping, docs: &[(&str, &str, &str)]) -> InvertedIndex {
        let mut inverted = InvertedIndex::new();
        for (id, from, body) in docs {
            let doc = Document::builder(*id)
                .add_text("From", *from)
                .add_text("Body", *body)
                .build();
            inverted.insert(&AnalyzedDocument::analyze(&doc, mapping).unwrap());
        }
        inverted
    }

    #[test]
    fn test_compile_covers_every_field() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let inverted = index_of(&mapping, &[("0", "marty", "bleve indexing")]);
        let ctx = QueryContext {
            mapping: &mapping,
            inverted: &inverted,
            total_docs: 1,
        };

        let compiled = MatchQuery::new("Bleve bleve").compile(&ctx).unwrap();
        // Two fields, two tokens each.
        assert_eq!(compiled.clauses.len(), 4);
        assert_eq!(compiled.distinct_terms(), 1);

        let scoped = MatchQuery::new("bleve").with_field("From").compile(&ctx).unwrap();
        assert_eq!(scoped.clauses.len(), 1);
        assert_eq!(scoped.clauses[0].field, "From");
    }

    #[test]
    fn test_duplicate_terms_weigh_twice() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let inverted = index_of(
            &mapping,
            &[("0", "a", "bleve indexing"), ("1", "b", "other text")],
        );
        let ctx = QueryContext {
            mapping: &mapping,
            inverted: &inverted,
            total_docs: 2,
        };

        let once = MatchQuery::new("bleve").compile(&ctx).unwrap().execute(&ctx);
        let twice = MatchQuery::new("bleve bleve")
            .compile(&ctx)
            .unwrap()
            .execute(&ctx);
        assert_eq!(once.len(), 1);
        assert!((twice[0].score - 2.0 * once[0].score).abs() < 1e-5);
    }

    #[test]
    fn test_and_operator_requires_every_term() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let inverted = index_of(
            &mapping,
            &[("0", "a", "bleve indexing easy"), ("2", "b", "why bleve hard")],
        );
        let ctx = QueryContext {
            mapping: &mapping,
            inverted: &inverted,
            total_docs: 2,
        };

        let or = MatchQuery::new("bleve hard").compile(&ctx).unwrap().execute(&ctx);
        assert_eq!(or.len(), 2);

        let and = MatchQuery::new("bleve hard")
            .with_operator(Operator::And)
            .compile(&ctx)
            .unwrap()
            .execute(&ctx);
        assert_eq!(and.len(), 1);
        assert_eq!(and[0].doc_id, "2");
    }

    #[test]
    fn test_type_default_analyzer_is_used_at_query_time() {
        let mapping = ResolvedMapping::new(IndexMapping::new().add_type_mapping(
            "email",
            DocumentMapping::new().with_default_analyzer("keyword"),
        ))
        .unwrap();
        let mut inverted = InvertedIndex::new();
        let mut doc = Document::builder("1").add_text("Subject", "Hello World").build();
        doc.set_doc_type("email");
        inverted.insert(&AnalyzedDocument::analyze(&doc, &mapping).unwrap());
        let ctx = QueryContext {
            mapping: &mapping,
            inverted: &inverted,
            total_docs: 1,
        };

        let hits = MatchQuery::new("Hello World")
            .with_field("Subject")
            .compile(&ctx)
            .unwrap()
            .execute(&ctx);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "1");

        // A lowercased query no longer equals the keyword term.
        let miss = MatchQuery::new("hello world")
            .with_field("Subject")
            .compile(&ctx)
            .unwrap()
            .execute(&ctx);
        assert!(miss.is_empty());
    }

    #[test]
    fn test_mixed_analyzers_are_combined() {
        let mapping = ResolvedMapping::new(IndexMapping::new().add_type_mapping(
            "raw",
            DocumentMapping::new().with_default_analyzer("keyword"),
        ))
        .unwrap();
        let mut inverted = InvertedIndex::new();
        let mut raw = Document::builder("a").add_text("Title", "bleve").build();
        raw.set_doc_type("raw");
        inverted.insert(&AnalyzedDocument::analyze(&raw, &mapping).unwrap());
        let plain = Document::builder("b").add_text("Title", "Bleve").build();
        inverted.insert(&AnalyzedDocument::analyze(&plain, &mapping).unwrap());
        let ctx = QueryContext {
            mapping: &mapping,
            inverted: &inverted,
            total_docs: 2,
        };

        // keyword yields "bleve", standard yields "bleve" too: one clause.
        let compiled = MatchQuery::new("bleve").with_field("Title").compile(&ctx).unwrap();
        assert_eq!(compiled.clauses.len(), 1);
        let hits = compiled.execute(&ctx);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_validation() {
        assert!(MatchQuery::new("x").with_field("").validate().is_err());
        assert!(MatchQuery::new("x").with_boost(-2.0).validate().is_err());
        assert!(MatchQuery::new("").validate().is_ok());
    }
}
