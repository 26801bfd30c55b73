//! # Tessera
//!
//! An embeddable full-text search engine.
//!
//! ## Features
//!
//! - Configurable analysis: tokenizers and token filters combined into
//!   named analyzers, including n-gram and Porter stemming filters
//! - Index mappings that pick an analyzer per document type and field
//! - An inverted index with positional postings and a stored-field
//!   document store
//! - Match and term queries ranked by TF-IDF
//! - Durable on-disk indexes: checksummed write-ahead log plus snapshots
//! - Safe to share between threads
//!
//! ## Example
//!
//! ```
//! use tessera::document::Document;
//! use tessera::index::Index;
//! use tessera::mapping::IndexMapping;
//! use tessera::search::SearchRequest;
//!
//! # fn main() -> tessera::error::Result<()> {
//! let index = Index::create_in_memory(IndexMapping::new())?;
//! index.put(Document::builder("0").add_text("Body", "bleve indexing is easy").build())?;
//! index.put(Document::builder("1").add_text("Body", "why is bleve hard").build())?;
//!
//! let results = index.search(&SearchRequest::match_text("easy"))?;
//! assert_eq!(results.ids(), vec!["0"]);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod mapping;
pub mod query;
pub mod search;
pub mod storage;

pub mod prelude {
    pub use crate::config::IndexConfig;
    pub use crate::document::{Document, FieldValue};
    pub use crate::error::{Result, TesseraError};
    pub use crate::index::Index;
    pub use crate::mapping::{DocumentMapping, FieldMapping, IndexMapping};
    pub use crate::query::{MatchQuery, Operator, TermQuery};
    pub use crate::search::{SearchRequest, SearchResults};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
