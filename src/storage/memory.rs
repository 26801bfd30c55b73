//! In-memory storage implementation for tests and ephemeral indexes.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::traits::{Storage, StorageConfig, StorageError, StorageInput, StorageOutput};

type FileMap = Arc<Mutex<HashMap<String, Arc<[u8]>>>>;

/// An in-memory storage implementation.
///
/// Written bytes become visible to readers when the output is flushed,
/// closed or dropped.
#[derive(Debug)]
pub struct MemoryStorage {
    files: FileMap,
    #[allow(dead_code)]
    config: StorageConfig,
    closed: AtomicBool,
}

impl MemoryStorage {
    /// Create a new memory storage.
    pub fn new(config: StorageConfig) -> Self {
        MemoryStorage {
            files: Arc::new(Mutex::new(HashMap::new())),
            config,
            closed: AtomicBool::new(false),
        }
    }

    /// Create a new memory storage with default configuration.
    pub fn new_default() -> Self {
        Self::new(StorageConfig::default())
    }

    fn check_closed(&self) -> Result<()> {
        if self.is_closed() {
            Err(StorageError::StorageClosed.into())
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        self.check_closed()?;

        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;

        Ok(Box::new(MemoryInput::new(Arc::clone(data))))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_closed()?;

        Ok(Box::new(MemoryOutput::new(
            name.to_string(),
            Vec::new(),
            Arc::clone(&self.files),
        )))
    }

    fn create_output_append(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_closed()?;

        let existing = self
            .files
            .lock()
            .get(name)
            .map(|data| data.to_vec())
            .unwrap_or_default();

        Ok(Box::new(MemoryOutput::new(
            name.to_string(),
            existing,
            Arc::clone(&self.files),
        )))
    }

    fn file_exists(&self, name: &str) -> bool {
        if self.is_closed() {
            return false;
        }

        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_closed()?;

        self.files.lock().remove(name);
        Ok(())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.check_closed()?;

        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| StorageError::FileNotFound(old_name.to_string()))?;

        files.insert(new_name.to_string(), data);
        Ok(())
    }

    fn truncate(&self, name: &str, len: u64) -> Result<()> {
        self.check_closed()?;

        let mut files = self.files.lock();
        let data = files
            .get_mut(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;
        let len = (len as usize).min(data.len());
        *data = Arc::from(&data[..len]);
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.check_closed()
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A memory-based input implementation.
#[derive(Debug)]
pub struct MemoryInput {
    cursor: Cursor<Arc<[u8]>>,
}

impl MemoryInput {
    fn new(data: Arc<[u8]>) -> Self {
        MemoryInput {
            cursor: Cursor::new(data),
        }
    }
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemoryInput {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl StorageInput for MemoryInput {
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A memory-based output implementation.
#[derive(Debug)]
pub struct MemoryOutput {
    name: String,
    cursor: Cursor<Vec<u8>>,
    files: FileMap,
    closed: bool,
}

impl MemoryOutput {
    fn new(name: String, existing: Vec<u8>, files: FileMap) -> Self {
        let mut cursor = Cursor::new(existing);
        cursor.set_position(cursor.get_ref().len() as u64);
        MemoryOutput {
            name,
            cursor,
            files,
            closed: false,
        }
    }

    fn publish(&self) {
        let data: Arc<[u8]> = Arc::from(self.cursor.get_ref().as_slice());
        self.files.lock().insert(self.name.clone(), data);
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::other("Output is closed"));
        }
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.closed {
            self.publish();
        }
        Ok(())
    }
}

impl Seek for MemoryOutput {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        if self.closed {
            return Err(std::io::Error::other("Output is closed"));
        }
        self.cursor.seek(pos)
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        if !self.closed {
            self.publish();
        }
        Ok(())
    }

    fn position(&self) -> Result<u64> {
        Ok(self.cursor.position())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.publish();
            self.closed = true;
        }
        Ok(())
    }
}

impl Drop for MemoryOutput {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
