//! Write-ahead log of document operations.
//!
//! Every put and delete is appended here, and made durable, before it is
//! applied to the in-memory index. On open the log is replayed on top of
//! the last snapshot.
//!
//! # Record format
//!
//! ```text
//! [payload length: u32 LE][crc32 of payload: u32 LE][payload: JSON WalRecord]
//! ```
//!
//! A record cut short at the end of the file (a crash mid-append) is
//! dropped with a warning and the file is truncated to the last complete
//! record. A checksum mismatch followed by further data is corruption and
//! fails the read.

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Result, TesseraError};
use crate::storage::{Storage, StorageOutput};

/// Name of the log file inside an index directory.
pub const WAL_FILE: &str = "index.wal";

const HEADER_LEN: usize = 8;

pub type SeqNumber = u64;

/// A single operation in the write-ahead log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalEntry {
    /// Insert or replace a document.
    Put { document: Document },
    /// Delete a document.
    Delete { doc_id: String },
}

/// A WAL entry with its sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalRecord {
    pub seq: SeqNumber,
    pub entry: WalEntry,
}

/// Manages the write-ahead log file.
#[derive(Debug)]
pub struct WalManager {
    storage: Arc<dyn Storage>,
    path: String,
    sync_writes: bool,
    writer: Mutex<Option<Box<dyn StorageOutput>>>,
    next_seq: AtomicU64,
}

impl WalManager {
    /// Create a WAL manager for `path`. Nothing is opened until the first
    /// append.
    pub fn new(storage: Arc<dyn Storage>, path: &str, sync_writes: bool) -> Self {
        WalManager {
            storage,
            path: path.to_string(),
            sync_writes,
            writer: Mutex::new(None),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Set the next sequence number (e.g. after loading a snapshot).
    pub fn set_next_seq(&self, seq: SeqNumber) {
        self.next_seq.store(seq, Ordering::SeqCst);
    }

    /// The last sequence number handed out.
    pub fn last_seq(&self) -> SeqNumber {
        self.next_seq.load(Ordering::SeqCst).saturating_sub(1)
    }

    /// Append an entry and return its sequence number.
    ///
    /// On failure the file is cut back to where the record started, so a
    /// failed append leaves no partial record behind.
    pub fn append(&self, entry: &WalEntry) -> Result<SeqNumber> {
        let seq = self.next_seq.load(Ordering::SeqCst);
        let frame = encode_record(&WalRecord {
            seq,
            entry: entry.clone(),
        })?;

        let mut writer_guard = self.writer.lock();
        if writer_guard.is_none() {
            *writer_guard = Some(self.storage.create_output_append(&self.path)?);
        }
        let Some(writer) = writer_guard.as_mut() else {
            return Err(TesseraError::storage("WAL writer is not open"));
        };

        let start = writer.position()?;
        if let Err(e) = write_frame(writer, &frame, self.sync_writes) {
            *writer_guard = None;
            if let Err(cleanup) = self.storage.truncate(&self.path, start) {
                warn!("failed to roll back partial WAL record {seq}: {cleanup}");
            }
            return Err(e);
        }

        self.next_seq.store(seq + 1, Ordering::SeqCst);
        Ok(seq)
    }

    /// Read every complete record, in file order.
    ///
    /// Also moves the next sequence number past the highest one read.
    pub fn read_all(&self) -> Result<Vec<WalRecord>> {
        if !self.storage.file_exists(&self.path) {
            return Ok(Vec::new());
        }

        let mut bytes = Vec::new();
        self.storage.open_input(&self.path)?.read_to_end(&mut bytes)?;

        let (records, valid_len) = decode_records(&bytes)?;
        if valid_len < bytes.len() {
            warn!(
                "discarding {} bytes of torn record at the end of {}",
                bytes.len() - valid_len,
                self.path
            );
            *self.writer.lock() = None;
            self.storage.truncate(&self.path, valid_len as u64)?;
        }

        if let Some(max_seq) = records.iter().map(|r| r.seq).max() {
            if max_seq >= self.next_seq.load(Ordering::SeqCst) {
                self.next_seq.store(max_seq + 1, Ordering::SeqCst);
            }
        }
        debug!("read {} WAL records from {}", records.len(), self.path);

        Ok(records)
    }

    /// Empty the log, typically after a checkpoint. Sequence numbers keep
    /// counting up.
    pub fn truncate(&self) -> Result<()> {
        let mut writer_guard = self.writer.lock();
        *writer_guard = None;

        let mut writer = self.storage.create_output(&self.path)?;
        writer.flush_and_sync()?;
        writer.close()
    }

    /// Flush and release the writer.
    pub fn close(&self) -> Result<()> {
        if let Some(mut writer) = self.writer.lock().take() {
            writer.close()?;
        }
        Ok(())
    }
}

fn encode_record(record: &WalRecord) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(record)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| TesseraError::storage("WAL record exceeds 4 GiB"))?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.write_u32::<LittleEndian>(len)?;
    frame.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    frame.extend_from_slice(&payload);
    Ok(frame)
}

fn write_frame(writer: &mut Box<dyn StorageOutput>, frame: &[u8], sync: bool) -> Result<()> {
    writer.write_all(frame)?;
    if sync {
        writer.flush_and_sync()
    } else {
        writer.flush().map_err(TesseraError::from)
    }
}

/// Decode records from a whole log file. Returns the records and the
/// length of the prefix that holds complete records.
fn decode_records(bytes: &[u8]) -> Result<(Vec<WalRecord>, usize)> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        if bytes.len() - offset < HEADER_LEN {
            break;
        }
        let len = LittleEndian::read_u32(&bytes[offset..offset + 4]) as usize;
        let crc = LittleEndian::read_u32(&bytes[offset + 4..offset + HEADER_LEN]);
        let start = offset + HEADER_LEN;
        let Some(end) = start.checked_add(len).filter(|end| *end <= bytes.len()) else {
            break;
        };

        let payload = &bytes[start..end];
        if crc32fast::hash(payload) != crc {
            if end == bytes.len() {
                break;
            }
            return Err(TesseraError::storage(format!(
                "WAL checksum mismatch at offset {offset}"
            )));
        }

        let record: WalRecord = serde_json::from_slice(payload).map_err(|e| {
            TesseraError::storage(format!("WAL record at offset {offset} is unreadable: {e}"))
        })?;
        records.push(record);
        offset = end;
    }

    Ok((records, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn put(id: &str, body: &str) -> WalEntry {
        WalEntry::Put {
            document: Document::builder(id).add_text("Body", body).build(),
        }
    }

    fn raw_bytes(storage: &MemoryStorage) -> Vec<u8> {
        let mut bytes = Vec::new();
        storage
            .open_input(WAL_FILE)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        bytes
    }

    fn rewrite(storage: &MemoryStorage, bytes: &[u8]) {
        let mut output = storage.create_output(WAL_FILE).unwrap();
        output.write_all(bytes).unwrap();
        output.close().unwrap();
    }

    #[test]
    fn test_wal_append_read_truncate() {
        let storage = Arc::new(MemoryStorage::new_default());
        let wal = WalManager::new(storage.clone(), WAL_FILE, true);

        assert_eq!(wal.append(&put("0", "bleve indexing is easy")).unwrap(), 1);
        assert_eq!(
            wal.append(&WalEntry::Delete {
                doc_id: "9".to_string()
            })
            .unwrap(),
            2
        );

        let records = wal.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entry, put("0", "bleve indexing is easy"));
        assert_eq!(records[1].seq, 2);

        wal.truncate().unwrap();
        assert!(wal.read_all().unwrap().is_empty());

        // Sequence numbers survive truncation.
        assert_eq!(wal.append(&put("1", "x")).unwrap(), 3);
    }

    #[test]
    fn test_torn_tail_is_discarded() {
        let storage = Arc::new(MemoryStorage::new_default());
        let wal = WalManager::new(storage.clone(), WAL_FILE, true);
        wal.append(&put("0", "first")).unwrap();
        wal.append(&put("1", "second")).unwrap();
        wal.close().unwrap();

        let bytes = raw_bytes(&storage);
        rewrite(&storage, &bytes[..bytes.len() - 3]);

        let reopened = WalManager::new(storage.clone(), WAL_FILE, true);
        let records = reopened.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(reopened.last_seq(), 1);

        // The torn bytes are gone, so new appends stay readable.
        reopened.append(&put("2", "third")).unwrap();
        assert_eq!(reopened.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_mid_file_corruption_is_an_error() {
        let storage = Arc::new(MemoryStorage::new_default());
        let wal = WalManager::new(storage.clone(), WAL_FILE, true);
        wal.append(&put("0", "first")).unwrap();
        wal.append(&put("1", "second")).unwrap();
        wal.close().unwrap();

        let mut bytes = raw_bytes(&storage);
        bytes[HEADER_LEN + 2] ^= 0xff;
        rewrite(&storage, &bytes);

        let err = WalManager::new(storage.clone(), WAL_FILE, true)
            .read_all()
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let storage = Arc::new(MemoryStorage::new_default());
        let wal = WalManager::new(storage, WAL_FILE, false);
        assert!(wal.read_all().unwrap().is_empty());
        assert_eq!(wal.last_seq(), 0);
    }
}
