//! The public index handle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use parking_lot::{
    Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockUpgradableReadGuard,
};
use rayon::prelude::*;

use crate::config::IndexConfig;
use crate::document::{Document, FieldValue};
use crate::error::{Result, TesseraError};
use crate::index::analyzed::AnalyzedDocument;
use crate::index::meta::{IndexMeta, META_FILE};
use crate::index::posting::Posting;
use crate::index::snapshot::{SNAPSHOT_FILE, read_snapshot, write_snapshot};
use crate::index::state::{IndexState, IndexStats};
use crate::mapping::{IndexMapping, ResolvedMapping};
use crate::search::{SearchRequest, SearchResults, Searcher};
use crate::storage::Storage;
use crate::storage::file::FileStorage;
use crate::storage::memory::MemoryStorage;
use crate::storage::wal::{WAL_FILE, WalEntry, WalManager};

#[derive(Debug, Default)]
struct WriterState {
    /// WAL records appended since the last snapshot.
    since_checkpoint: u64,
}

/// A full-text index.
///
/// `Index` is `Send + Sync`; share it behind an `Arc` to put, delete and
/// search from several threads. Writes are serialized by a writer lock.
/// Analysis and WAL appends happen while readers keep running; readers
/// are only held off for the in-memory swap, so they never observe a
/// partially applied write. Every lock wait is bounded by
/// [`IndexConfig::lock_timeout`].
///
/// # Examples
///
/// ```
/// use tessera::document::Document;
/// use tessera::index::Index;
/// use tessera::mapping::IndexMapping;
///
/// # fn main() -> tessera::error::Result<()> {
/// let dir = tempfile::TempDir::new()?;
/// let path = dir.path().join("example.tessera");
///
/// let index = Index::open_or_create(&path, IndexMapping::new())?;
/// index.put(Document::builder("1").add_text("Body", "I'm Trying to learn bleve").build())?;
/// index.close()?;
///
/// let index = Index::open_or_create(&path, IndexMapping::new())?;
/// assert_eq!(index.doc_count()?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Index {
    path: Option<PathBuf>,
    storage: Arc<dyn Storage>,
    mapping: ResolvedMapping,
    config: IndexConfig,
    wal: WalManager,
    state: RwLock<IndexState>,
    writer: Mutex<WriterState>,
    closed: AtomicBool,
}

impl Index {
    /// Whether an index exists at `path`.
    ///
    /// Only a missing metadata file counts as "no index"; failing to look
    /// (e.g. permission denied) is a storage error.
    pub fn exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        let meta = path.as_ref().join(META_FILE);
        meta.try_exists().map_err(|e| {
            TesseraError::storage(format!("cannot inspect {}: {e}", meta.display()))
        })
    }

    /// Create a new index at `path`. Fails if one already exists.
    pub fn create<P: AsRef<Path>>(
        path: P,
        mapping: IndexMapping,
        config: IndexConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if Self::exists(path)? {
            return Err(TesseraError::index(format!(
                "an index already exists at {}",
                path.display()
            )));
        }

        let mapping = ResolvedMapping::new(mapping)?;
        let storage: Arc<dyn Storage> =
            Arc::new(FileStorage::new(path, config.storage.clone())?);
        let index = Self::create_with_storage(Some(path.to_path_buf()), storage, mapping, config)?;
        info!("created index at {}", path.display());
        Ok(index)
    }

    /// Create a memory-backed index. Nothing outlives the handle.
    pub fn create_in_memory(mapping: IndexMapping) -> Result<Self> {
        Self::create_in_memory_with_config(mapping, IndexConfig::default())
    }

    /// Create a memory-backed index with an explicit configuration.
    pub fn create_in_memory_with_config(mapping: IndexMapping, config: IndexConfig) -> Result<Self> {
        let mapping = ResolvedMapping::new(mapping)?;
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new(config.storage.clone()));
        Self::create_with_storage(None, storage, mapping, config)
    }

    fn create_with_storage(
        path: Option<PathBuf>,
        storage: Arc<dyn Storage>,
        mapping: ResolvedMapping,
        config: IndexConfig,
    ) -> Result<Self> {
        // Leftovers of an earlier create that died before writing metadata.
        storage.delete_file(WAL_FILE)?;
        storage.delete_file(SNAPSHOT_FILE)?;
        IndexMeta::new(mapping.mapping().clone()).write(storage.as_ref())?;

        let wal = WalManager::new(Arc::clone(&storage), WAL_FILE, config.sync_writes);
        Ok(Self::from_parts(path, storage, mapping, config, wal, IndexState::new(), 0))
    }

    /// Open an existing index with its persisted mapping.
    ///
    /// A missing index is [`TesseraError::NotFound`]; corrupt metadata, a
    /// bad snapshot or a corrupt WAL are storage errors.
    pub fn open<P: AsRef<Path>>(path: P, config: IndexConfig) -> Result<Self> {
        let (storage, meta) = Self::read_existing(path.as_ref(), &config)?;
        let mapping = ResolvedMapping::new(meta.mapping)?;
        Self::recover(Some(path.as_ref().to_path_buf()), storage, mapping, config)
    }

    /// Open the index at `path` if it exists, otherwise create it.
    ///
    /// When it exists, `mapping` must be compatible with the persisted
    /// mapping (see [`IndexMapping::check_compatible`]). What it adds
    /// (new analysis components, types and field declarations) is merged
    /// into the persisted mapping and written back; settings both define
    /// keep their persisted value.
    pub fn open_or_create<P: AsRef<Path>>(path: P, mapping: IndexMapping) -> Result<Self> {
        Self::open_or_create_with_config(path, mapping, IndexConfig::default())
    }

    /// [`Index::open_or_create`] with an explicit configuration.
    pub fn open_or_create_with_config<P: AsRef<Path>>(
        path: P,
        mapping: IndexMapping,
        config: IndexConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !Self::exists(path)? {
            return Self::create(path, mapping, config);
        }

        ResolvedMapping::new(mapping.clone())?;
        let (storage, meta) = Self::read_existing(path, &config)?;
        mapping.check_compatible(&meta.mapping)?;

        let merged = meta.mapping.merge_additions(&mapping);
        let resolved = ResolvedMapping::new(merged.clone())?;
        if merged != meta.mapping {
            IndexMeta {
                mapping: merged,
                ..meta
            }
            .write(storage.as_ref())?;
            info!("added new mapping declarations to {}", path.display());
        }
        if &mapping != resolved.mapping() {
            debug!(
                "mapping for {} differs from the persisted one; persisted settings kept",
                path.display()
            );
        }

        Self::recover(Some(path.to_path_buf()), storage, resolved, config)
    }

    fn read_existing(path: &Path, config: &IndexConfig) -> Result<(Arc<dyn Storage>, IndexMeta)> {
        if !Self::exists(path)? {
            return Err(TesseraError::not_found(format!(
                "no index at {}",
                path.display()
            )));
        }
        let storage: Arc<dyn Storage> =
            Arc::new(FileStorage::new(path, config.storage.clone())?);
        let meta = IndexMeta::read(storage.as_ref())?;
        Ok((storage, meta))
    }

    /// Load the snapshot, then replay newer WAL records on top of it.
    fn recover(
        path: Option<PathBuf>,
        storage: Arc<dyn Storage>,
        mapping: ResolvedMapping,
        config: IndexConfig,
    ) -> Result<Self> {
        let (mut state, snapshot_seq) = read_snapshot(storage.as_ref())?.unwrap_or_default();

        let wal = WalManager::new(Arc::clone(&storage), WAL_FILE, config.sync_writes);
        wal.set_next_seq(snapshot_seq + 1);

        let mut replayed = 0u64;
        for record in wal.read_all()? {
            if record.seq <= snapshot_seq {
                continue;
            }
            match record.entry {
                WalEntry::Put { document } => {
                    state.apply_put(&AnalyzedDocument::analyze(&document, &mapping)?);
                }
                WalEntry::Delete { doc_id } => {
                    state.apply_delete(&doc_id);
                }
            }
            replayed += 1;
        }

        if let Some(path) = &path {
            info!(
                "opened index at {}: {} documents, snapshot at sequence {snapshot_seq}, {replayed} WAL records replayed",
                path.display(),
                state.doc_count()
            );
        }

        Ok(Self::from_parts(path, storage, mapping, config, wal, state, replayed))
    }

    fn from_parts(
        path: Option<PathBuf>,
        storage: Arc<dyn Storage>,
        mapping: ResolvedMapping,
        config: IndexConfig,
        wal: WalManager,
        state: IndexState,
        since_checkpoint: u64,
    ) -> Self {
        Index {
            path,
            storage,
            mapping,
            config,
            wal,
            state: RwLock::new(state),
            writer: Mutex::new(WriterState { since_checkpoint }),
            closed: AtomicBool::new(false),
        }
    }

    /// Insert a document, replacing any document with the same ID.
    pub fn put(&self, document: Document) -> Result<()> {
        self.check_open()?;
        let analyzed = AnalyzedDocument::analyze(&document, &self.mapping)?;

        let mut writer = self.lock_writer()?;
        self.check_open()?;
        let replaced = self.commit(&mut writer, WalEntry::Put { document }, |state| {
            state.apply_put(&analyzed)
        })?;
        if replaced {
            debug!("replaced document '{}'", analyzed.id());
        }

        self.maybe_checkpoint(&mut writer);
        Ok(())
    }

    /// Insert several documents. Analysis runs in parallel; the documents
    /// are then applied one by one in order, so a failure part way leaves
    /// the earlier ones in place. Returns the number applied.
    pub fn put_batch(&self, documents: Vec<Document>) -> Result<usize> {
        self.check_open()?;
        let analyzed = documents
            .par_iter()
            .map(|document| AnalyzedDocument::analyze(document, &self.mapping))
            .collect::<Result<Vec<_>>>()?;

        let mut writer = self.lock_writer()?;
        self.check_open()?;
        let mut applied = 0;
        for (document, analyzed) in documents.into_iter().zip(&analyzed) {
            self.commit(&mut writer, WalEntry::Put { document }, |state| {
                state.apply_put(analyzed)
            })?;
            applied += 1;
        }
        debug!("indexed batch of {applied} documents");

        self.maybe_checkpoint(&mut writer);
        Ok(applied)
    }

    /// Delete a document. Returns `false`, without touching the log, if
    /// no document has this ID.
    pub fn delete(&self, doc_id: &str) -> Result<bool> {
        self.check_open()?;

        let mut writer = self.lock_writer()?;
        self.check_open()?;
        if !self.read_state()?.contains(doc_id) {
            return Ok(false);
        }
        self.commit(
            &mut writer,
            WalEntry::Delete {
                doc_id: doc_id.to_string(),
            },
            |state| state.apply_delete(doc_id),
        )?;

        self.maybe_checkpoint(&mut writer);
        Ok(true)
    }

    /// Run a search.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.check_open()?;
        request.validate()?;

        let state = self.read_state()?;
        Searcher::new(&state, &self.mapping).search(request)
    }

    /// Stored fields of a document; `*` selects all. `None` if there is
    /// no such document.
    pub fn fetch<S: AsRef<str>>(
        &self,
        doc_id: &str,
        fields: &[S],
    ) -> Result<Option<BTreeMap<String, FieldValue>>> {
        self.check_open()?;
        Ok(self.read_state()?.documents.fetch(doc_id, fields))
    }

    /// The stored part of a document, with its type.
    pub fn fetch_all(&self, doc_id: &str) -> Result<Option<Document>> {
        self.check_open()?;
        Ok(self.read_state()?.documents.fetch_all(doc_id).cloned())
    }

    /// Postings of `term` in `field`, sorted by document ID.
    pub fn postings_for(&self, field: &str, term: &str) -> Result<Vec<Posting>> {
        self.check_open()?;
        Ok(self.read_state()?.inverted.postings_for(field, term))
    }

    /// Postings of `term` across all fields, merged per document.
    pub fn postings_for_term(&self, term: &str) -> Result<Vec<Posting>> {
        self.check_open()?;
        Ok(self.read_state()?.inverted.postings_for_term(term))
    }

    /// Number of documents.
    pub fn doc_count(&self) -> Result<usize> {
        self.check_open()?;
        Ok(self.read_state()?.doc_count())
    }

    /// Whether a document with this ID exists.
    pub fn contains(&self, doc_id: &str) -> Result<bool> {
        self.check_open()?;
        Ok(self.read_state()?.contains(doc_id))
    }

    /// Fields that currently have postings, sorted.
    pub fn field_names(&self) -> Result<Vec<String>> {
        self.check_open()?;
        Ok(self
            .read_state()?
            .inverted
            .field_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Document and per-field term counts.
    pub fn stats(&self) -> Result<IndexStats> {
        self.check_open()?;
        Ok(self.read_state()?.stats())
    }

    /// Write a snapshot and empty the WAL.
    pub fn flush(&self) -> Result<()> {
        self.check_open()?;
        let mut writer = self.lock_writer()?;
        self.check_open()?;
        self.checkpoint(&mut writer)
    }

    /// Checkpoint pending changes and close. Every later call, including
    /// a second `close`, fails with "index is closed".
    pub fn close(&self) -> Result<()> {
        self.check_open()?;
        let mut writer = self.lock_writer()?;
        self.check_open()?;

        if self.path.is_some() && writer.since_checkpoint > 0 {
            self.checkpoint(&mut writer)?;
        }
        self.wal.close()?;
        self.closed.store(true, Ordering::SeqCst);
        self.storage.close()?;

        match &self.path {
            Some(path) => info!("closed index at {}", path.display()),
            None => debug!("closed in-memory index"),
        }
        Ok(())
    }

    /// Whether [`Index::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The mapping in effect.
    pub fn mapping(&self) -> &IndexMapping {
        self.mapping.mapping()
    }

    /// The runtime configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The index directory, `None` for memory-backed indexes.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(TesseraError::closed())
        } else {
            Ok(())
        }
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, WriterState>> {
        self.writer
            .try_lock_for(self.config.lock_timeout)
            .ok_or_else(|| TesseraError::timeout("waiting for the writer lock"))
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, IndexState>> {
        self.state
            .try_read_for(self.config.lock_timeout)
            .ok_or_else(|| TesseraError::timeout("waiting for the index read lock"))
    }

    /// Log `entry`, then apply it. Readers keep going while the record is
    /// written; they are only excluded for `apply`.
    fn commit<R>(
        &self,
        writer: &mut WriterState,
        entry: WalEntry,
        apply: impl FnOnce(&mut IndexState) -> R,
    ) -> Result<R> {
        let guard = self
            .state
            .try_upgradable_read_for(self.config.lock_timeout)
            .ok_or_else(|| TesseraError::timeout("waiting for the index state lock"))?;

        self.wal.append(&entry)?;
        writer.since_checkpoint += 1;

        let mut state = RwLockUpgradableReadGuard::upgrade(guard);
        Ok(apply(&mut *state))
    }

    fn maybe_checkpoint(&self, writer: &mut WriterState) {
        let interval = self.config.checkpoint_interval;
        if interval == 0 || writer.since_checkpoint < interval {
            return;
        }
        // The write itself is already durable in the WAL.
        if let Err(e) = self.checkpoint(writer) {
            warn!("automatic checkpoint failed: {e}");
        }
    }

    fn checkpoint(&self, writer: &mut WriterState) -> Result<()> {
        let seq = self.wal.last_seq();
        {
            let state = self.read_state()?;
            write_snapshot(self.storage.as_ref(), &state, seq)?;
        }
        self.wal.truncate()?;
        writer.since_checkpoint = 0;
        info!("checkpoint at WAL sequence {seq}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};
    use std::time::Duration;

    use crate::query::{MatchQuery, TermQuery};
    use crate::storage::traits::{StorageConfig, StorageInput, StorageOutput};
    use tempfile::TempDir;

    /// Memory storage whose appends start failing once `fail_writes` is
    /// set.
    #[derive(Debug)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: Arc<AtomicBool>,
    }

    #[derive(Debug)]
    struct FlakyOutput {
        inner: Box<dyn StorageOutput>,
        fail_writes: Arc<AtomicBool>,
    }

    impl Write for FlakyOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.inner.flush()
        }
    }

    impl Seek for FlakyOutput {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    impl StorageOutput for FlakyOutput {
        fn flush_and_sync(&mut self) -> Result<()> {
            self.inner.flush_and_sync()
        }

        fn position(&self) -> Result<u64> {
            self.inner.position()
        }

        fn close(&mut self) -> Result<()> {
            self.inner.close()
        }
    }

    impl Storage for FlakyStorage {
        fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
            self.inner.open_input(name)
        }

        fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
            self.inner.create_output(name)
        }

        fn create_output_append(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
            Ok(Box::new(FlakyOutput {
                inner: self.inner.create_output_append(name)?,
                fail_writes: Arc::clone(&self.fail_writes),
            }))
        }

        fn file_exists(&self, name: &str) -> bool {
            self.inner.file_exists(name)
        }

        fn delete_file(&self, name: &str) -> Result<()> {
            self.inner.delete_file(name)
        }

        fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
            self.inner.rename_file(old_name, new_name)
        }

        fn truncate(&self, name: &str, len: u64) -> Result<()> {
            self.inner.truncate(name, len)
        }

        fn sync(&self) -> Result<()> {
            self.inner.sync()
        }

        fn close(&self) -> Result<()> {
            self.inner.close()
        }

        fn is_closed(&self) -> bool {
            self.inner.is_closed()
        }
    }

    fn email(id: &str, from: &str, body: &str) -> Document {
        Document::builder(id)
            .add_text("From", from)
            .add_text("Body", body)
            .build()
    }

    #[test]
    fn test_put_search_delete_in_memory() {
        let index = Index::create_in_memory(IndexMapping::new()).unwrap();
        index
            .put(email("0", "marty.schoch@gmail.com", "bleve indexing is easy"))
            .unwrap();
        assert_eq!(index.doc_count().unwrap(), 1);
        assert!(index.path().is_none());

        let results = index
            .search(&SearchRequest::new(MatchQuery::new("bleve")).with_fields(["*"]))
            .unwrap();
        assert_eq!(results.ids(), vec!["0"]);

        assert!(index.delete("0").unwrap());
        assert!(!index.delete("0").unwrap());
        assert!(index.postings_for("Body", "bleve").unwrap().is_empty());
        assert!(index.fetch("0", &["*"]).unwrap().is_none());
    }

    #[test]
    fn test_put_replaces() {
        let index = Index::create_in_memory(IndexMapping::new()).unwrap();
        index.put(email("0", "a@b.c", "old text")).unwrap();
        index.put(email("0", "a@b.c", "new text")).unwrap();

        assert_eq!(index.doc_count().unwrap(), 1);
        assert!(index.postings_for("Body", "old").unwrap().is_empty());
        let body = index.fetch("0", &["Body"]).unwrap().unwrap();
        assert_eq!(body["Body"].as_text(), Some("new text"));
    }

    #[test]
    fn test_put_batch() {
        let index = Index::create_in_memory(IndexMapping::new()).unwrap();
        let applied = index
            .put_batch(vec![
                email("1", "x@y.z", "learn bleve"),
                email("2", "x@y.z", "bleve hard"),
            ])
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(index.postings_for_term("bleve").unwrap().len(), 2);
        assert_eq!(index.field_names().unwrap(), vec!["Body", "From"]);
    }

    #[test]
    fn test_invalid_documents_and_queries() {
        let index = Index::create_in_memory(IndexMapping::new()).unwrap();
        assert!(index.put(Document::new("")).is_err());
        assert_eq!(index.doc_count().unwrap(), 0);

        let err = index
            .search(&SearchRequest::new(TermQuery::new("Body", "")))
            .unwrap_err();
        assert!(matches!(err, TesseraError::Query(_)));
    }

    #[test]
    fn test_closed_index_rejects_everything() {
        let index = Index::create_in_memory(IndexMapping::new()).unwrap();
        index.close().unwrap();

        assert!(index.is_closed());
        let err = index.put(email("0", "a", "b")).unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("index is closed"));
        assert!(index.search(&SearchRequest::match_text("b")).is_err());
        assert!(index.fetch("0", &["*"]).is_err());
        assert!(index.delete("0").is_err());
        assert!(index.doc_count().is_err());
        assert!(index.flush().is_err());
        assert!(index.close().is_err());
    }

    #[test]
    fn test_flush_truncates_wal_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idx");

        let index = Index::create(&path, IndexMapping::new(), IndexConfig::default()).unwrap();
        index.put(email("0", "a@b.c", "bleve indexing")).unwrap();
        index.flush().unwrap();
        assert_eq!(std::fs::metadata(path.join(WAL_FILE)).unwrap().len(), 0);
        assert!(path.join(SNAPSHOT_FILE).exists());

        index.put(email("1", "d@e.f", "more bleve")).unwrap();
        drop(index);

        let reopened = Index::open(&path, IndexConfig::default()).unwrap();
        assert_eq!(reopened.doc_count().unwrap(), 2);
        assert_eq!(reopened.postings_for("Body", "bleve").unwrap().len(), 2);
    }

    #[test]
    fn test_automatic_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idx");
        let config = IndexConfig::default().with_checkpoint_interval(2);

        let index = Index::create(&path, IndexMapping::new(), config.clone()).unwrap();
        index.put(email("0", "a", "one")).unwrap();
        assert!(!path.join(SNAPSHOT_FILE).exists());
        index.put(email("1", "a", "two")).unwrap();
        assert!(path.join(SNAPSHOT_FILE).exists());
        drop(index);

        assert_eq!(Index::open(&path, config).unwrap().doc_count().unwrap(), 2);
    }

    #[test]
    fn test_failed_wal_append_leaves_state_untouched() {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let storage: Arc<dyn Storage> = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(StorageConfig::default()),
            fail_writes: Arc::clone(&fail_writes),
        });
        let config = IndexConfig::default().with_checkpoint_interval(0);
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let index =
            Index::create_with_storage(None, Arc::clone(&storage), mapping, config.clone()).unwrap();

        index.put(email("0", "a@b.c", "old words")).unwrap();
        let before = index.stats().unwrap();

        fail_writes.store(true, Ordering::SeqCst);
        assert!(index.put(email("0", "a@b.c", "new words")).unwrap_err().is_storage());
        assert!(index.put(email("1", "d@e.f", "other")).unwrap_err().is_storage());
        assert!(index.put_batch(vec![email("2", "g", "batch")]).unwrap_err().is_storage());
        assert!(index.delete("0").unwrap_err().is_storage());

        assert_eq!(index.stats().unwrap(), before);
        assert_eq!(index.postings_for("Body", "old").unwrap().len(), 1);
        assert!(index.postings_for("Body", "new").unwrap().is_empty());
        let stored = index.fetch("0", &["Body"]).unwrap().unwrap();
        assert_eq!(stored["Body"].as_text(), Some("old words"));
        assert!(!index.contains("1").unwrap());

        fail_writes.store(false, Ordering::SeqCst);
        index.put(email("1", "d@e.f", "later")).unwrap();

        // The log holds exactly the two successful puts.
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let replayed = Index::recover(None, storage, mapping, config).unwrap();
        assert_eq!(replayed.stats().unwrap(), index.stats().unwrap());
        let stored = replayed.fetch("0", &["Body"]).unwrap().unwrap();
        assert_eq!(stored["Body"].as_text(), Some("old words"));
    }

    #[test]
    fn test_held_writer_lock_times_out() {
        let config = IndexConfig::default().with_lock_timeout(Duration::from_millis(10));
        let index = Index::create_in_memory_with_config(IndexMapping::new(), config).unwrap();
        index.put(email("0", "a@b.c", "bleve")).unwrap();

        let _writer = index.writer.lock();
        let err = index.put(email("1", "a@b.c", "blocked")).unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("Timeout"), "{err}");
        assert!(index.delete("0").unwrap_err().is_storage());
        assert!(index.flush().unwrap_err().is_storage());

        // Readers do not wait for the writer.
        let results = index.search(&SearchRequest::match_text("bleve")).unwrap();
        assert_eq!(results.ids(), vec!["0"]);
    }

    #[test]
    fn test_held_state_lock_times_out() {
        let config = IndexConfig::default().with_lock_timeout(Duration::from_millis(10));
        let index = Index::create_in_memory_with_config(IndexMapping::new(), config).unwrap();
        index.put(email("0", "a@b.c", "bleve")).unwrap();

        let held = index.state.write();
        std::thread::scope(|scope| {
            let search = scope.spawn(|| index.search(&SearchRequest::match_text("bleve")));
            let put = scope.spawn(|| index.put(email("1", "a@b.c", "blocked")));

            let err = search.join().unwrap().unwrap_err();
            assert!(err.is_storage());
            assert!(err.to_string().contains("Timeout"), "{err}");
            assert!(put.join().unwrap().unwrap_err().is_storage());
        });
        drop(held);

        assert_eq!(index.doc_count().unwrap(), 1);
        assert!(!index.contains("1").unwrap());
    }

    #[test]
    fn test_create_twice_and_open_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idx");

        assert!(matches!(
            Index::open(&path, IndexConfig::default()),
            Err(TesseraError::NotFound(_))
        ));
        assert!(!Index::exists(&path).unwrap());

        Index::create(&path, IndexMapping::new(), IndexConfig::default()).unwrap();
        assert!(Index::exists(&path).unwrap());
        assert!(Index::create(&path, IndexMapping::new(), IndexConfig::default()).is_err());
    }
}
