//! Search coordination: analyze → look up → score → rank → fetch fields.
//!
//! ```
//! use tessera::document::Document;
//! use tessera::index::Index;
//! use tessera::mapping::IndexMapping;
//! use tessera::query::MatchQuery;
//! use tessera::search::SearchRequest;
//!
//! # fn main() -> tessera::error::Result<()> {
//! let index = Index::create_in_memory(IndexMapping::new())?;
//! index.put(Document::builder("0").add_text("Body", "bleve indexing is easy").build())?;
//!
//! let request = SearchRequest::new(MatchQuery::new("bleve")).with_fields(["Body"]);
//! let results = index.search(&request)?;
//! assert_eq!(results.total_hits, 1);
//! assert_eq!(results.hits[0].id, "0");
//! # Ok(())
//! # }
//! ```

pub mod request;
pub mod results;
pub mod searcher;

pub use request::{DEFAULT_LIMIT, SearchRequest};
pub use results::{SearchHit, SearchResults};
pub use searcher::Searcher;
