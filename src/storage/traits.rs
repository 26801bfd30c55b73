//! Storage abstraction trait and common types.

use std::io::{Read, Seek, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};

/// A trait for storage backends that can store and retrieve named files.
///
/// Backends are shared between threads behind an `Arc`, so closing takes
/// `&self`; after [`Storage::close`] every operation fails.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open a file for reading. The file must exist.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing content.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Open a file for appending, creating it if needed.
    fn create_output_append(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file succeeds.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Atomically replace `new_name` with `old_name`.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Create a temporary file that can later be renamed into place.
    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)> {
        for counter in 0..10_000 {
            let temp_name = format!("{prefix}_{counter}.tmp");
            if !self.file_exists(&temp_name) {
                let output = self.create_output(&temp_name)?;
                return Ok((temp_name, output));
            }
        }
        Err(StorageError::IoError("Could not create temporary file".to_string()).into())
    }

    /// Cut a file down to `len` bytes.
    fn truncate(&self, name: &str, len: u64) -> Result<()>;

    /// Sync all pending writes to storage.
    fn sync(&self) -> Result<()>;

    /// Close the storage.
    fn close(&self) -> Result<()>;

    /// Whether [`Storage::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// A trait for reading data from storage.
pub trait StorageInput: Read + Seek + Send + std::fmt::Debug {
    /// Close the input stream.
    fn close(&mut self) -> Result<()>;
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Seek + Send + std::fmt::Debug {
    /// Flush buffered bytes and make them durable.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Get the current position in the output stream.
    fn position(&self) -> Result<u64>;

    /// Close the output stream.
    fn close(&mut self) -> Result<()>;
}

impl StorageOutput for Box<dyn StorageOutput> {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.as_mut().flush_and_sync()
    }

    fn position(&self) -> Result<u64> {
        self.as_ref().position()
    }

    fn close(&mut self) -> Result<()> {
        self.as_mut().close()
    }
}

impl StorageInput for Box<dyn StorageInput> {
    fn close(&mut self) -> Result<()> {
        self.as_mut().close()
    }
}

/// Configuration for storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Buffer size for I/O operations.
    pub buffer_size: usize,

    /// Flush the write buffer after every write call.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            buffer_size: 65536, // 64KB
            sync_writes: false,
        }
    }
}

/// Error types specific to storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// File not found.
    FileNotFound(String),

    /// Permission denied.
    PermissionDenied(String),

    /// I/O error.
    IoError(String),

    /// Storage is closed.
    StorageClosed,
}

impl StorageError {
    /// Classify an I/O error raised while touching `name`.
    pub fn from_io(name: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::FileNotFound(name.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                StorageError::PermissionDenied(name.to_string())
            }
            _ => StorageError::IoError(format!("{name}: {err}")),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "File not found: {name}"),
            StorageError::PermissionDenied(name) => write!(f, "Permission denied: {name}"),
            StorageError::IoError(msg) => write!(f, "I/O error: {msg}"),
            StorageError::StorageClosed => write!(f, "Storage is closed"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for TesseraError {
    fn from(err: StorageError) -> Self {
        TesseraError::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();

        assert_eq!(config.buffer_size, 65536);
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::FileNotFound("test.txt".to_string());
        assert_eq!(err.to_string(), "File not found: test.txt");

        let err = StorageError::StorageClosed;
        assert_eq!(err.to_string(), "Storage is closed");

        let converted: TesseraError = StorageError::IoError("disk full".to_string()).into();
        assert!(converted.is_storage());
    }

    #[test]
    fn test_from_io_classification() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            StorageError::from_io("a.bin", err),
            StorageError::FileNotFound("a.bin".to_string())
        );

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert_eq!(
            StorageError::from_io("a.bin", err),
            StorageError::PermissionDenied("a.bin".to_string())
        );
    }
}
