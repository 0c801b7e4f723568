//! Database Module
//!
//! Embedded redb storage for id mappings, feed cursors and the item queue.

mod storage;

pub use storage::{MAPPING_BATCH_LIMIT, StorageError, StorageResult, SyncStorage};
