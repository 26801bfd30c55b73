//! Base query trait and the compiled form shared by all queries.

use std::collections::BTreeSet;
use std::fmt::Debug;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::index::inverted::InvertedIndex;
use crate::mapping::ResolvedMapping;
use crate::query::collector::ScoredDoc;
use crate::query::scorer::{Scorer, TfIdfScorer};

/// How the terms of a query combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// A document matching any term matches.
    #[default]
    Or,
    /// A document must match every distinct term.
    And,
}

/// What a query can see while it compiles and runs.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub mapping: &'a ResolvedMapping,
    pub inverted: &'a InvertedIndex,
    /// Number of documents in the index.
    pub total_docs: usize,
}

/// Trait for search queries.
pub trait Query: Send + Sync + Debug {
    /// Reject malformed queries. Runs before any index access.
    fn validate(&self) -> Result<()>;

    /// Turn the query into term clauses against the current index state.
    fn compile(&self, ctx: &QueryContext<'_>) -> Result<CompiledQuery>;

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// The field this query is restricted to, if any.
    fn field(&self) -> Option<&str> {
        None
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Shared boost validation.
pub(crate) fn validate_boost(boost: f32) -> Result<()> {
    if !boost.is_finite() || boost < 0.0 {
        return Err(TesseraError::query(format!(
            "boost must be a finite, non-negative number (got {boost})"
        )));
    }
    Ok(())
}

/// One `(field, term)` clause. `group` identifies the distinct query term
/// the clause came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermClause {
    pub field: String,
    pub term: String,
    pub group: usize,
}

/// A query reduced to term clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub clauses: Vec<TermClause>,
    pub operator: Operator,
    pub boost: f32,
    groups: Vec<String>,
}

impl CompiledQuery {
    pub fn new(operator: Operator, boost: f32) -> Self {
        CompiledQuery {
            clauses: Vec::new(),
            operator,
            boost,
            groups: Vec::new(),
        }
    }

    /// Add a clause. Clauses for the same term text share a group.
    pub fn add_clause<F: Into<String>, T: Into<String>>(&mut self, field: F, term: T) {
        let term = term.into();
        let group = match self.groups.iter().position(|g| *g == term) {
            Some(group) => group,
            None => {
                self.groups.push(term.clone());
                self.groups.len() - 1
            }
        };
        self.clauses.push(TermClause {
            field: field.into(),
            term,
            group,
        });
    }

    /// Number of distinct query terms.
    pub fn distinct_terms(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Score every matching document. Documents matching no clause, or not
    /// every distinct term under [`Operator::And`], are left out. The
    /// result is in no particular order.
    pub fn execute(&self, ctx: &QueryContext<'_>) -> Vec<ScoredDoc> {
        let scorer = TfIdfScorer::new(ctx.total_docs as u64).with_boost(self.boost);
        let mut matches: AHashMap<&str, (f32, BTreeSet<usize>)> = AHashMap::new();

        for clause in &self.clauses {
            let Some(list) = ctx
                .inverted
                .field(&clause.field)
                .and_then(|f| f.postings(&clause.term))
            else {
                continue;
            };
            let doc_freq = list.doc_frequency() as u64;
            for posting in list {
                let entry = matches.entry(posting.doc_id.as_str()).or_default();
                entry.0 += scorer.score(posting.frequency as f32, doc_freq);
                entry.1.insert(clause.group);
            }
        }

        let required = match self.operator {
            Operator::Or => 1,
            Operator::And => self.distinct_terms().max(1),
        };
        matches
            .into_iter()
            .filter(|(_, (_, groups))| groups.len() >= required)
            .map(|(doc_id, (score, _))| ScoredDoc::new(doc_id, score))
            .collect()
    }
}
