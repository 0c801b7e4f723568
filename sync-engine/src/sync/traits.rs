//! Collaborator interfaces
//!
//! The engine never reaches for ambient clients or table handles; every
//! external system is injected through one of these traits.
//!
//! - [`CatalogSource`] - inventory reads (category snapshot, item feed)
//! - [`CatalogDestination`] - storefront batch writes
//! - [`MappingStore`] - source id → destination id persistence
//! - [`CursorStore`] - named feed cursors
//! - [`ItemQueue`] - durable hand-off between the feed and the product flow

use async_trait::async_trait;
use shared::{
    BatchRequest, BatchResponse, EntityKind, IdMapping, ItemPage, SourceCategory, SourceProduct,
    StoreCategory, StoreProduct,
};
use std::collections::HashMap;

use crate::core::SyncResult;

/// Default cap on objects per destination batch call
pub const DEFAULT_DESTINATION_BATCH: usize = 100;

/// Reads from the source inventory
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Full category snapshot
    async fn category_list(&self) -> SyncResult<Vec<SourceCategory>>;

    /// Items changed since `cursor`
    async fn items_since(&self, cursor: u64) -> SyncResult<ItemPage>;
}

/// Writes to the destination catalog
///
/// Create rows in a [`BatchResponse`] must echo the correlating field
/// verbatim (`slug` for categories, `sku` for products); response order is
/// not relied upon.
#[async_trait]
pub trait CatalogDestination: Send + Sync {
    async fn batch_categories(
        &self,
        request: &BatchRequest<StoreCategory>,
    ) -> SyncResult<BatchResponse>;

    async fn batch_products(
        &self,
        request: &BatchRequest<StoreProduct>,
    ) -> SyncResult<BatchResponse>;

    /// Maximum objects accepted in one batch call
    fn max_batch_size(&self) -> usize {
        DEFAULT_DESTINATION_BATCH
    }
}

/// A write that was refused because the row already held another id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConflict {
    pub mapping: IdMapping,
    pub existing_id: i64,
}

/// What a `record_batch` call did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Rows newly written
    pub inserted: usize,
    /// Rows that already held the same destination id
    pub unchanged: usize,
    pub conflicts: Vec<MappingConflict>,
}

/// Durable source id → destination id store
///
/// Implementations chunk requests internally; callers may pass any
/// number of ids.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Recorded destination ids for `ids`; unknown ids are omitted
    async fn lookup_batch(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> SyncResult<HashMap<String, i64>>;

    /// Conditional upsert: identical rows are no-ops, rows holding a
    /// different destination id are left untouched and reported
    async fn record_batch(
        &self,
        kind: EntityKind,
        mappings: &[IdMapping],
    ) -> SyncResult<RecordOutcome>;

    async fn list_all(&self, kind: EntityKind) -> SyncResult<Vec<IdMapping>>;

    /// Delete every row of `kind`, returning how many were removed
    async fn clear(&self, kind: EntityKind) -> SyncResult<usize>;
}

/// Named monotonic counters
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn get_cursor(&self, name: &str) -> SyncResult<Option<u64>>;

    async fn set_cursor(&self, name: &str, value: u64) -> SyncResult<()>;
}

/// An item waiting in the queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedItem {
    pub seq: u64,
    pub item: SourceProduct,
}

/// FIFO queue with explicit acknowledgement
#[async_trait]
pub trait ItemQueue: Send + Sync {
    /// Append items, returning how many were enqueued
    async fn publish(&self, items: &[SourceProduct]) -> SyncResult<usize>;

    /// Oldest `max` items, left in place until acked
    async fn peek(&self, max: usize) -> SyncResult<Vec<QueuedItem>>;

    /// Remove processed items
    async fn ack(&self, seqs: &[u64]) -> SyncResult<usize>;

    async fn len(&self) -> SyncResult<usize>;

    /// Remove everything, returning how many items were dropped
    async fn purge(&self) -> SyncResult<usize>;
}
