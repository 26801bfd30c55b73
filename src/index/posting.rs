//! Posting lists.
//!
//! A posting list holds one [`Posting`] per document containing a term,
//! sorted by document ID in byte-wise string order.

use serde::{Deserialize, Serialize};

/// A single posting in a posting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Document ID.
    pub doc_id: String,
    /// Term frequency in the document.
    pub frequency: u32,
    /// Token positions of the term, ascending.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting from the positions a term occupies.
    pub fn with_positions<S: Into<String>>(doc_id: S, mut positions: Vec<u32>) -> Self {
        positions.sort_unstable();
        Posting {
            doc_id: doc_id.into(),
            frequency: positions.len() as u32,
            positions,
        }
    }

    /// Fold another posting for the same document into this one.
    pub fn merge(&mut self, other: &Posting) {
        self.frequency += other.frequency;
        self.positions.extend_from_slice(&other.positions);
        self.positions.sort_unstable();
    }

    /// Get the term frequency.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Get the positions.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }
}

/// A posting list for a single (field, term) key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Add a posting, keeping the list sorted by document ID. A second
    /// posting for the same document is merged into the first.
    pub fn add_posting(&mut self, posting: Posting) {
        match self
            .postings
            .binary_search_by(|p| p.doc_id.as_str().cmp(posting.doc_id.as_str()))
        {
            Ok(pos) => self.postings[pos].merge(&posting),
            Err(pos) => self.postings.insert(pos, posting),
        }
    }

    /// Remove the posting for `doc_id`. Returns whether one was present.
    pub fn remove(&mut self, doc_id: &str) -> bool {
        match self
            .postings
            .binary_search_by(|p| p.doc_id.as_str().cmp(doc_id))
        {
            Ok(pos) => {
                self.postings.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// The posting for `doc_id`, if any.
    pub fn get(&self, doc_id: &str) -> Option<&Posting> {
        self.postings
            .binary_search_by(|p| p.doc_id.as_str().cmp(doc_id))
            .ok()
            .map(|pos| &self.postings[pos])
    }

    /// Number of documents containing the term.
    pub fn doc_frequency(&self) -> usize {
        self.postings.len()
    }

    /// Get the length of the posting list.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Get an iterator over the postings.
    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    /// The postings as a slice.
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = &'a Posting;
    type IntoIter = std::slice::Iter<'a, Posting>;

    fn into_iter(self) -> Self::IntoIter {
        self.postings.iter()
    }
}

/// Merge postings from several lists into one list per document, summing
/// frequencies. The result is sorted by document ID.
pub fn merge_by_document<'a, I>(lists: I) -> Vec<Posting>
where
    I: IntoIterator<Item = &'a PostingList>,
{
    let mut merged = PostingList::new();
    for list in lists {
        for posting in list {
            merged.add_posting(posting.clone());
        }
    }
    merged.postings
}
