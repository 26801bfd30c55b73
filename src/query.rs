//! Query system for searching documents.
//!
//! A [`Query`] is validated before the index is touched, then compiled
//! against the index state into a [`CompiledQuery`]: a flat list of
//! `(field, term)` clauses. Scoring every candidate document is
//!
//! ```text
//! score(doc) = boost × Σ over clauses tf(doc, field, term) × ln(1 + N / df(field, term))
//! ```
//!
//! where `N` is the number of documents in the index. A query term that
//! appears twice in the analyzed query text is looked up twice.

pub mod collector;
pub mod match_query;
#[allow(clippy::module_inception)]
pub mod query;
pub mod scorer;
pub mod term_query;

pub use collector::{Collector, ScoredDoc, TopDocsCollector};
pub use match_query::MatchQuery;
pub use query::{CompiledQuery, Operator, Query, QueryContext, TermClause};
pub use scorer::{Scorer, TfIdfScorer};
pub use term_query::TermQuery;
