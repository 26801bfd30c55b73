//! Search request builder.

use crate::error::Result;
use crate::query::{MatchQuery, Query};

/// Hits returned when no limit is set.
pub const DEFAULT_LIMIT: usize = 10;

/// A query plus paging and the stored fields to return with each hit.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: Box<dyn Query>,
    /// Stored fields to return; `*` returns all of them.
    pub fields: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

impl SearchRequest {
    /// Create a request for `query` with default paging and no fields.
    pub fn new<Q: Query + 'static>(query: Q) -> Self {
        Self::from_boxed(Box::new(query))
    }

    /// Create a request from an already boxed query.
    pub fn from_boxed(query: Box<dyn Query>) -> Self {
        SearchRequest {
            query,
            fields: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// A match query over all fields.
    pub fn match_text<S: Into<String>>(text: S) -> Self {
        Self::new(MatchQuery::new(text))
    }

    /// Set the stored fields returned with each hit.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Validate the query. Runs before the index is touched.
    pub fn validate(&self) -> Result<()> {
        self.query.validate()
    }
}
