//! Storage abstraction layer for Tessera.
//!
//! An index never touches the file system directly: every byte it persists
//! (metadata, write-ahead log, snapshots) goes through a [`Storage`]
//! backend. File and memory backends can be swapped without touching the
//! index code, which is how [`crate::index::Index::create_in_memory`] works.
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//! use tessera::storage::Storage;
//! use tessera::storage::memory::MemoryStorage;
//!
//! # fn main() -> tessera::error::Result<()> {
//! let storage = MemoryStorage::new_default();
//!
//! let mut output = storage.create_output("index_meta.json")?;
//! output.write_all(b"{}")?;
//! output.close()?;
//!
//! let mut input = storage.open_input("index_meta.json")?;
//! let mut text = String::new();
//! input.read_to_string(&mut text)?;
//! assert_eq!(text, "{}");
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod memory;
pub mod traits;
pub mod wal;

pub use traits::{Storage, StorageConfig, StorageError, StorageInput, StorageOutput};
