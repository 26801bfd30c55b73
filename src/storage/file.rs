//! File-based storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, TesseraError};
use crate::storage::traits::{Storage, StorageConfig, StorageError, StorageInput, StorageOutput};

/// A file-based storage implementation rooted at one directory.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
    /// Storage configuration.
    config: StorageConfig,
    /// Whether the storage is closed.
    closed: AtomicBool,
}

impl FileStorage {
    /// Create a new file storage in the given directory, creating it if
    /// needed.
    pub fn new<P: AsRef<Path>>(directory: P, config: StorageConfig) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory)
                .map_err(|e| TesseraError::storage(format!("Failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(TesseraError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage {
            directory,
            config,
            closed: AtomicBool::new(false),
        })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    fn check_closed(&self) -> Result<()> {
        if self.is_closed() {
            Err(StorageError::StorageClosed.into())
        } else {
            Ok(())
        }
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        self.check_closed()?;

        let file = File::open(self.file_path(name)).map_err(|e| StorageError::from_io(name, e))?;
        Ok(Box::new(FileInput::new(file, self.config.buffer_size)))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_closed()?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.file_path(name))
            .map_err(|e| StorageError::from_io(name, e))?;

        Ok(Box::new(FileOutput::new(
            file,
            self.config.buffer_size,
            self.config.sync_writes,
        )?))
    }

    fn create_output_append(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_closed()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path(name))
            .map_err(|e| StorageError::from_io(name, e))?;

        Ok(Box::new(FileOutput::new(
            file,
            self.config.buffer_size,
            self.config.sync_writes,
        )?))
    }

    fn file_exists(&self, name: &str) -> bool {
        if self.is_closed() {
            return false;
        }

        self.file_path(name).exists()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_closed()?;

        let path = self.file_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StorageError::IoError(format!("Failed to delete file: {e}")))?;
        }

        Ok(())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.check_closed()?;

        std::fs::rename(self.file_path(old_name), self.file_path(new_name))
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {e}")))?;
        Ok(())
    }

    fn truncate(&self, name: &str, len: u64) -> Result<()> {
        self.check_closed()?;

        let file = OpenOptions::new()
            .write(true)
            .open(self.file_path(name))
            .map_err(|e| StorageError::from_io(name, e))?;
        file.set_len(len)
            .and_then(|_| file.sync_all())
            .map_err(|e| StorageError::IoError(format!("Failed to truncate {name}: {e}")))?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.check_closed()?;
        // Files are synced by their outputs; only the directory entry is left.
        #[cfg(unix)]
        {
            File::open(&self.directory)
                .and_then(|dir| dir.sync_all())
                .map_err(|e| StorageError::IoError(format!("Failed to sync directory: {e}")))?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A file input implementation.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
}

impl FileInput {
    fn new(file: File, buffer_size: usize) -> Self {
        FileInput {
            reader: BufReader::with_capacity(buffer_size, file),
        }
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for FileInput {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl StorageInput for FileInput {
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A file output implementation.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    sync_writes: bool,
    position: u64,
}

impl FileOutput {
    fn new(file: File, buffer_size: usize, sync_writes: bool) -> Result<Self> {
        // Append mode writes land at the end, so start counting from there.
        let position = file
            .metadata()
            .map_err(|e| TesseraError::storage(format!("Failed to get file metadata: {e}")))?
            .len();

        Ok(FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            sync_writes,
            position,
        })
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes_written = self.writer.write(buf)?;
        self.position += bytes_written as u64;

        if self.sync_writes {
            self.writer.flush()?;
        }

        Ok(bytes_written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Seek for FileOutput {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let new_pos = self.writer.seek(pos)?;
        self.position = new_pos;
        Ok(new_pos)
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| TesseraError::storage(format!("Failed to flush: {e}")))?;

        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| TesseraError::storage(format!("Failed to sync: {e}")))?;

        Ok(())
    }

    fn position(&self) -> Result<u64> {
        Ok(self.position)
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}
