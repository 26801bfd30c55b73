//! Scoring implementations for ranking search results.

use std::fmt::Debug;

/// Trait for term scorers.
pub trait Scorer: Send + Debug {
    /// Score one term occurrence count in a document, given how many
    /// documents contain the term.
    fn score(&self, term_freq: f32, doc_freq: u64) -> f32;

    /// Get the boost factor for this scorer.
    fn boost(&self) -> f32;

    /// Get the name of this scorer.
    fn name(&self) -> &'static str;
}

/// `tf × ln(1 + N / df)`, scaled by the boost.
#[derive(Debug, Clone)]
pub struct TfIdfScorer {
    /// Total number of documents in the index.
    total_docs: u64,
    boost: f32,
}

impl TfIdfScorer {
    pub fn new(total_docs: u64) -> Self {
        TfIdfScorer {
            total_docs,
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Inverse document frequency, `ln(1 + N / df)`. Zero when no document
    /// contains the term.
    pub fn idf(&self, doc_freq: u64) -> f32 {
        if doc_freq == 0 {
            return 0.0;
        }
        (1.0 + self.total_docs as f32 / doc_freq as f32).ln()
    }
}

impl Scorer for TfIdfScorer {
    fn score(&self, term_freq: f32, doc_freq: u64) -> f32 {
        self.boost * term_freq * self.idf(doc_freq)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn name(&self) -> &'static str {
        "tf-idf"
    }
}
