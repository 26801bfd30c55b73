//! Collector implementations for gathering search results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

/// A document with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: String,
    pub score: f32,
}

impl ScoredDoc {
    pub fn new<S: Into<String>>(doc_id: S, score: f32) -> Self {
        ScoredDoc {
            doc_id: doc_id.into(),
            score,
        }
    }

    /// Result order: higher score first, then ascending document ID.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Heap entry whose maximum is the worst-ranked document.
#[derive(Debug)]
struct Ranked(ScoredDoc);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Trait for collecting search results.
pub trait Collector: Send + Debug {
    /// Collect a matching document.
    fn collect(&mut self, doc: ScoredDoc);

    /// Get the total number of documents collected.
    fn total_hits(&self) -> u64;

    /// Highest score seen, 0 if nothing was collected.
    fn max_score(&self) -> f32;
}

/// Keeps the best `offset + limit` documents and returns the page after
/// `offset`. Ranking is by score, ties by ascending document ID, so the
/// order never depends on the order documents are collected in.
#[derive(Debug)]
pub struct TopDocsCollector {
    offset: usize,
    limit: usize,
    hits: BinaryHeap<Ranked>,
    total_hits: u64,
    max_score: f32,
}

impl TopDocsCollector {
    /// Create a collector for the page `offset..offset + limit`.
    pub fn new(offset: usize, limit: usize) -> Self {
        TopDocsCollector {
            offset,
            limit,
            hits: BinaryHeap::new(),
            total_hits: 0,
            max_score: 0.0,
        }
    }

    fn capacity(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    /// The requested page, best first.
    pub fn into_results(self) -> Vec<ScoredDoc> {
        let offset = self.offset;
        self.hits
            .into_sorted_vec()
            .into_iter()
            .skip(offset)
            .map(|ranked| ranked.0)
            .collect()
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc: ScoredDoc) {
        self.total_hits += 1;
        if self.total_hits == 1 || doc.score > self.max_score {
            self.max_score = doc.score;
        }

        let capacity = self.capacity();
        if capacity == 0 {
            return;
        }

        let candidate = Ranked(doc);
        if self.hits.len() < capacity {
            self.hits.push(candidate);
        } else if let Some(worst) = self.hits.peek() {
            if candidate < *worst {
                self.hits.pop();
                self.hits.push(candidate);
            }
        }
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }

    fn max_score(&self) -> f32 {
        self.max_score
    }
}
