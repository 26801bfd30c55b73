//! The index: mapping + inverted index + document store, with
//! write-ahead logging and snapshot persistence.
//!
//! # Persisted layout
//!
//! ```text
//! <index dir>/
//!   index_meta.json   format version, creation time, mapping
//!   index.wal         framed, checksummed put/delete records
//!   snapshot.bin      full state at a WAL sequence
//! ```

pub mod analyzed;
pub mod doc_store;
#[allow(clippy::module_inception)]
pub mod index;
pub mod inverted;
pub mod meta;
pub mod posting;
pub mod snapshot;
pub mod state;

pub use doc_store::{ALL_FIELDS, DocumentStore};
pub use index::Index;
pub use inverted::InvertedIndex;
pub use posting::{Posting, PostingList};
pub use state::{FieldStats, IndexStats};
