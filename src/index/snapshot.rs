//! Snapshot checkpoints of the full index state.
//!
//! Layout of `snapshot.bin`:
//!
//! ```text
//! [magic "TSNP"][format version: u32 LE][WAL sequence: u64 LE]
//! [bincode IndexState ...][crc32 of everything before it: u32 LE]
//! ```
//!
//! A snapshot is written to a temporary file and renamed into place, so a
//! crash leaves either the old snapshot or the new one.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::debug;

use crate::error::{Result, TesseraError};
use crate::index::state::IndexState;
use crate::storage::Storage;
use crate::storage::wal::SeqNumber;

pub const SNAPSHOT_FILE: &str = "snapshot.bin";
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"TSNP";
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 8;
const TRAILER_LEN: usize = 4;

/// Encode a snapshot of `state` taken at WAL sequence `seq`.
pub fn encode_snapshot(state: &IndexState, seq: SeqNumber) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    bytes.extend_from_slice(SNAPSHOT_MAGIC);
    bytes.write_u32::<LittleEndian>(SNAPSHOT_VERSION)?;
    bytes.write_u64::<LittleEndian>(seq)?;
    bincode::serialize_into(&mut bytes, state)?;

    let crc = crc32fast::hash(&bytes);
    bytes.write_u32::<LittleEndian>(crc)?;
    Ok(bytes)
}

/// Decode a snapshot, verifying magic, version and checksum.
pub fn decode_snapshot(bytes: &[u8]) -> Result<(IndexState, SeqNumber)> {
    if bytes.len() < HEADER_LEN + TRAILER_LEN {
        return Err(TesseraError::storage("snapshot is truncated"));
    }
    if &bytes[..4] != SNAPSHOT_MAGIC {
        return Err(TesseraError::storage("snapshot has a bad magic number"));
    }
    let version = LittleEndian::read_u32(&bytes[4..8]);
    if version != SNAPSHOT_VERSION {
        return Err(TesseraError::storage(format!(
            "unsupported snapshot version {version}"
        )));
    }

    let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
    if crc32fast::hash(body) != LittleEndian::read_u32(trailer) {
        return Err(TesseraError::storage("snapshot checksum mismatch"));
    }

    let seq = LittleEndian::read_u64(&body[8..HEADER_LEN]);
    let state: IndexState = bincode::deserialize(&body[HEADER_LEN..])
        .map_err(|e| TesseraError::storage(format!("snapshot is unreadable: {e}")))?;
    Ok((state, seq))
}

/// Write a snapshot through a temporary file and rename it into place.
pub fn write_snapshot(storage: &dyn Storage, state: &IndexState, seq: SeqNumber) -> Result<()> {
    let bytes = encode_snapshot(state, seq)?;

    let (temp_name, mut output) = storage.create_temp_output("snapshot")?;
    let written = output
        .write_all(&bytes)
        .map_err(TesseraError::from)
        .and_then(|_| output.flush_and_sync())
        .and_then(|_| output.close());
    drop(output);
    if let Err(e) = written {
        let _ = storage.delete_file(&temp_name);
        return Err(e);
    }

    storage.rename_file(&temp_name, SNAPSHOT_FILE)?;
    storage.sync()?;
    debug!("wrote snapshot at sequence {seq} ({} bytes)", bytes.len());
    Ok(())
}

/// Read the snapshot if there is one.
pub fn read_snapshot(storage: &dyn Storage) -> Result<Option<(IndexState, SeqNumber)>> {
    if !storage.file_exists(SNAPSHOT_FILE) {
        return Ok(None);
    }

    let mut bytes = Vec::new();
    storage.open_input(SNAPSHOT_FILE)?.read_to_end(&mut bytes)?;
    decode_snapshot(&bytes).map(Some)
}
