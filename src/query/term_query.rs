//! Term query implementation for exact term matching.

use crate::error::{Result, TesseraError};
use crate::query::query::{CompiledQuery, Operator, Query, QueryContext, validate_boost};

/// A query that matches documents containing a specific term.
///
/// The term is not analyzed; it must already be in indexed form (e.g.
/// lowercased, stemmed).
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    field: String,
    term: String,
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn validate(&self) -> Result<()> {
        if self.field.is_empty() {
            return Err(TesseraError::query("term query needs a field name"));
        }
        if self.term.is_empty() {
            return Err(TesseraError::query("term query needs a non-empty term"));
        }
        validate_boost(self.boost)
    }

    fn compile(&self, _ctx: &QueryContext<'_>) -> Result<CompiledQuery> {
        let mut compiled = CompiledQuery::new(Operator::Or, self.boost);
        compiled.add_clause(&self.field, &self.term);
        Ok(compiled)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.term)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(TermQuery::new("Body", "bleve").validate().is_ok());
        assert!(TermQuery::new("", "bleve").validate().is_err());
        assert!(TermQuery::new("Body", "").validate().is_err());
        assert!(
            TermQuery::new("Body", "bleve")
                .with_boost(f32::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_description() {
        let query = TermQuery::new("From", "marty");
        assert_eq!(query.description(), "From:marty");
        assert_eq!(query.field(), Some("From"));
        assert_eq!(query.term(), "marty");
    }
}
