//! Runtime configuration for an index.
//!
//! The mapping describes *what* gets indexed; [`IndexConfig`] describes how
//! the index behaves at runtime (lock timeouts, durability, checkpointing).
//! Neither value is persisted in the WAL: the config is supplied on every
//! open, the mapping is stored in the index metadata.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::StorageConfig;

/// Default bound on lock acquisition.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of WAL records between automatic checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1000;

/// Configuration for opening or creating an index.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tessera::config::IndexConfig;
///
/// let config = IndexConfig::default()
///     .with_lock_timeout(Duration::from_millis(250))
///     .with_checkpoint_interval(0);
/// assert_eq!(config.checkpoint_interval, 0);
/// assert!(config.sync_writes);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Upper bound for acquiring the writer lock and the state lock.
    /// Exceeding it fails the operation with a storage error.
    pub lock_timeout: Duration,

    /// Fsync the write-ahead log after every record.
    pub sync_writes: bool,

    /// WAL records between automatic snapshots. 0 disables automatic
    /// checkpoints; snapshots are then only written by `flush` and `close`.
    pub checkpoint_interval: u64,

    /// Storage backend settings.
    pub storage: StorageConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            sync_writes: true,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            storage: StorageConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Set the lock acquisition timeout.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Set whether each WAL append is fsynced.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Set the automatic checkpoint interval.
    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Set the storage backend settings.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_config_default() {
        let config = IndexConfig::default();
        assert_eq!(config.lock_timeout, DEFAULT_LOCK_TIMEOUT);
        assert_eq!(config.checkpoint_interval, 1000);
        assert!(config.sync_writes);
        assert_eq!(config.storage.buffer_size, 65536);
    }

    #[test]
    fn test_index_config_from_partial_json() {
        let config: IndexConfig = serde_json::from_str(r#"{"checkpoint_interval": 10}"#).unwrap();
        assert_eq!(config.checkpoint_interval, 10);
        assert_eq!(config.lock_timeout, DEFAULT_LOCK_TIMEOUT);
    }
}
