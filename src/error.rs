//! Error types for the Tessera library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`TesseraError`] enum. Absence of a document is not an error: fetch and
//! delete report it through `Option` and `bool`.
//!
//! # Examples
//!
//! ```
//! use tessera::error::{Result, TesseraError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TesseraError::configuration("unknown token filter: foo"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Tessera operations.
#[derive(Error, Debug)]
pub enum TesseraError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bad analyzer/filter names, invalid mappings, mapping conflicts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O failure, lock timeout, corruption or a closed index.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Malformed query, reported before the index is touched.
    #[error("Query error: {0}")]
    Query(String),

    /// Invalid document or index operation.
    #[error("Index error: {0}")]
    Index(String),

    /// The index directory does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Binary encoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TesseraError.
pub type Result<T> = std::result::Result<T, TesseraError>;

impl TesseraError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        TesseraError::Configuration(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TesseraError::Storage(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TesseraError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        TesseraError::Query(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        TesseraError::Index(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        TesseraError::NotFound(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TesseraError::Serialization(msg.into())
    }

    /// Create a new timeout error. Timeouts surface as storage errors.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        TesseraError::Storage(format!("Timeout: {}", msg.into()))
    }

    /// The error returned by every operation on a closed index.
    pub fn closed() -> Self {
        TesseraError::Storage("index is closed".to_string())
    }

    /// Whether this error belongs to the storage class (I/O included).
    pub fn is_storage(&self) -> bool {
        matches!(self, TesseraError::Storage(_) | TesseraError::Io(_))
    }

    /// Whether this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TesseraError::Configuration(_))
    }
}

impl From<bincode::Error> for TesseraError {
    fn from(err: bincode::Error) -> Self {
        TesseraError::Serialization(err.to_string())
    }
}
