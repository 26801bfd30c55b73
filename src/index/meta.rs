//! Self-describing index metadata (`index_meta.json`).

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::mapping::IndexMapping;
use crate::storage::Storage;

pub const META_FILE: &str = "index_meta.json";
pub const FORMAT_VERSION: u32 = 1;

/// Contents of the metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub mapping: IndexMapping,
}

impl IndexMeta {
    /// Metadata for a new index created now.
    pub fn new(mapping: IndexMapping) -> Self {
        IndexMeta {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            mapping,
        }
    }

    /// Write the metadata file through a temporary file.
    pub fn write(&self, storage: &dyn Storage) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;

        let (temp_name, mut output) = storage.create_temp_output("index_meta")?;
        output.write_all(&json)?;
        output.flush_and_sync()?;
        output.close()?;
        drop(output);

        storage.rename_file(&temp_name, META_FILE)?;
        storage.sync()
    }

    /// Read the metadata file.
    ///
    /// A missing file is `NotFound`; an unreadable or unsupported one is a
    /// storage error, never mistaken for an absent index.
    pub fn read(storage: &dyn Storage) -> Result<Self> {
        if !storage.file_exists(META_FILE) {
            return Err(TesseraError::not_found(format!("{META_FILE} is missing")));
        }

        let mut bytes = Vec::new();
        storage.open_input(META_FILE)?.read_to_end(&mut bytes)?;

        let meta: IndexMeta = serde_json::from_slice(&bytes)
            .map_err(|e| TesseraError::storage(format!("corrupt index metadata: {e}")))?;
        if meta.format_version != FORMAT_VERSION {
            return Err(TesseraError::storage(format!(
                "unsupported index format version {}",
                meta.format_version
            )));
        }
        Ok(meta)
    }
}
