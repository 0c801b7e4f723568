//! redb-based storage for id mappings, feed cursors and the item queue

use async_trait::async_trait;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use shared::{EntityKind, IdMapping, SourceProduct};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::core::SyncResult;
use crate::sync::traits::{
    CursorStore, ItemQueue, MappingConflict, MappingStore, QueuedItem, RecordOutcome,
};

/// Category mappings: key = source category id, value = destination id
const CATEGORY_ID_MAP: TableDefinition<&str, i64> = TableDefinition::new("category_id_map");

/// Item mappings: key = source item id, value = destination id
const ITEM_ID_MAP: TableDefinition<&str, i64> = TableDefinition::new("item_id_map");

/// Named counters (feed cursors, queue sequence)
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Item queue: key = sequence, value = JSON-serialized SourceProduct
const ITEM_QUEUE: TableDefinition<u64, &[u8]> = TableDefinition::new("item_queue");

const QUEUE_SEQ_KEY: &str = "queue_seq";

/// Rows per read/write transaction for mapping batches
pub const MAPPING_BATCH_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mapping for {source_id} is a {found} mapping, expected {expected}")]
    KindMismatch {
        source_id: String,
        expected: EntityKind,
        found: EntityKind,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

fn mapping_table(kind: EntityKind) -> TableDefinition<'static, &'static str, i64> {
    match kind {
        EntityKind::Category => CATEGORY_ID_MAP,
        EntityKind::Product => ITEM_ID_MAP,
    }
}

/// Mapping, cursor and queue storage in one embedded database
#[derive(Clone)]
pub struct SyncStorage {
    db: Arc<Database>,
}

impl SyncStorage {
    /// Open or create the database file, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory database (tests and dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CATEGORY_ID_MAP)?;
            let _ = write_txn.open_table(ITEM_ID_MAP)?;
            let _ = write_txn.open_table(ITEM_QUEUE)?;
            let mut counters = write_txn.open_table(COUNTERS)?;
            if counters.get(QUEUE_SEQ_KEY)?.is_none() {
                counters.insert(QUEUE_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Mappings ==========

    pub fn lookup_mappings(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> StorageResult<HashMap<String, i64>> {
        let mut found = HashMap::new();
        for chunk in ids.chunks(MAPPING_BATCH_LIMIT) {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(mapping_table(kind))?;
            for id in chunk {
                if let Some(guard) = table.get(id.as_str())? {
                    found.insert(id.clone(), guard.value());
                }
            }
        }
        Ok(found)
    }

    pub fn record_mappings(
        &self,
        kind: EntityKind,
        mappings: &[IdMapping],
    ) -> StorageResult<RecordOutcome> {
        if let Some(wrong) = mappings.iter().find(|m| m.kind != kind) {
            return Err(StorageError::KindMismatch {
                source_id: wrong.source_id.clone(),
                expected: kind,
                found: wrong.kind,
            });
        }

        let mut outcome = RecordOutcome::default();
        for chunk in mappings.chunks(MAPPING_BATCH_LIMIT) {
            let write_txn = self.db.begin_write()?;
            {
                let mut table = write_txn.open_table(mapping_table(kind))?;
                for mapping in chunk {
                    let existing = table.get(mapping.source_id.as_str())?.map(|g| g.value());
                    match existing {
                        Some(id) if id == mapping.destination_id => outcome.unchanged += 1,
                        Some(id) => outcome.conflicts.push(MappingConflict {
                            mapping: mapping.clone(),
                            existing_id: id,
                        }),
                        None => {
                            table.insert(mapping.source_id.as_str(), mapping.destination_id)?;
                            outcome.inserted += 1;
                        }
                    }
                }
            }
            write_txn.commit()?;
        }
        Ok(outcome)
    }

    pub fn list_mappings(&self, kind: EntityKind) -> StorageResult<Vec<IdMapping>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(mapping_table(kind))?;

        let mut mappings = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            mappings.push(IdMapping::new(kind, key.value(), value.value()));
        }
        Ok(mappings)
    }

    pub fn clear_mappings(&self, kind: EntityKind) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(mapping_table(kind))?;
            let mut keys = Vec::new();
            for result in table.iter()? {
                let (key, _) = result?;
                keys.push(key.value().to_string());
            }
            for key in &keys {
                table.remove(key.as_str())?;
            }
            keys.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    // ========== Counters ==========

    pub fn counter(&self, name: &str) -> StorageResult<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS)?;
        Ok(table.get(name)?.map(|g| g.value()))
    }

    pub fn set_counter(&self, name: &str, value: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(COUNTERS)?;
            table.insert(name, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Item Queue ==========

    pub fn enqueue(&self, items: &[SourceProduct]) -> StorageResult<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let write_txn = self.db.begin_write()?;
        {
            let mut counters = write_txn.open_table(COUNTERS)?;
            let mut queue = write_txn.open_table(ITEM_QUEUE)?;
            let mut seq = counters.get(QUEUE_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
            for item in items {
                seq += 1;
                let value = serde_json::to_vec(item)?;
                queue.insert(seq, value.as_slice())?;
            }
            counters.insert(QUEUE_SEQ_KEY, seq)?;
        }
        write_txn.commit()?;
        Ok(items.len())
    }

    pub fn peek_queue(&self, max: usize) -> StorageResult<Vec<QueuedItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEM_QUEUE)?;

        let mut items = Vec::new();
        for result in table.iter()?.take(max) {
            let (key, value) = result?;
            let item: SourceProduct = serde_json::from_slice(value.value())?;
            items.push(QueuedItem {
                seq: key.value(),
                item,
            });
        }
        Ok(items)
    }

    pub fn ack_queue(&self, seqs: &[u64]) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let mut removed = 0;
        {
            let mut table = write_txn.open_table(ITEM_QUEUE)?;
            for seq in seqs {
                if table.remove(*seq)?.is_some() {
                    removed += 1;
                }
            }
        }
        write_txn.commit()?;
        Ok(removed)
    }

    pub fn queue_len(&self) -> StorageResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEM_QUEUE)?;
        Ok(table.len()? as usize)
    }

    pub fn purge_queue(&self) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ITEM_QUEUE)?;
            let mut keys = Vec::new();
            for result in table.iter()? {
                let (key, _) = result?;
                keys.push(key.value());
            }
            for key in &keys {
                table.remove(*key)?;
            }
            keys.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

#[async_trait]
impl MappingStore for SyncStorage {
    async fn lookup_batch(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> SyncResult<HashMap<String, i64>> {
        Ok(self.lookup_mappings(kind, ids)?)
    }

    async fn record_batch(
        &self,
        kind: EntityKind,
        mappings: &[IdMapping],
    ) -> SyncResult<RecordOutcome> {
        Ok(self.record_mappings(kind, mappings)?)
    }

    async fn list_all(&self, kind: EntityKind) -> SyncResult<Vec<IdMapping>> {
        Ok(self.list_mappings(kind)?)
    }

    async fn clear(&self, kind: EntityKind) -> SyncResult<usize> {
        Ok(self.clear_mappings(kind)?)
    }
}

#[async_trait]
impl CursorStore for SyncStorage {
    async fn get_cursor(&self, name: &str) -> SyncResult<Option<u64>> {
        Ok(self.counter(name)?)
    }

    async fn set_cursor(&self, name: &str, value: u64) -> SyncResult<()> {
        Ok(self.set_counter(name, value)?)
    }
}

#[async_trait]
impl ItemQueue for SyncStorage {
    async fn publish(&self, items: &[SourceProduct]) -> SyncResult<usize> {
        Ok(self.enqueue(items)?)
    }

    async fn peek(&self, max: usize) -> SyncResult<Vec<QueuedItem>> {
        Ok(self.peek_queue(max)?)
    }

    async fn ack(&self, seqs: &[u64]) -> SyncResult<usize> {
        Ok(self.ack_queue(seqs)?)
    }

    async fn len(&self) -> SyncResult<usize> {
        Ok(self.queue_len()?)
    }

    async fn purge(&self) -> SyncResult<usize> {
        Ok(self.purge_queue()?)
    }
}
