//! SyncService - entry point for every engine operation
//!
//! Holds the injected collaborators and the run limits; each method builds
//! the flow it needs and returns a structured summary.

use serde::Serialize;
use shared::{EntityKind, FeedSummary, ResetSummary, SourceProduct, SyncSummary};
use std::sync::Arc;

use super::category::CategorySync;
use super::feed::ProductFeed;
use super::product::ProductSync;
use super::reset::ResetService;
use super::traits::{CatalogDestination, CatalogSource, CursorStore, ItemQueue, MappingStore};
use crate::core::{SyncLimits, SyncResult};

/// Result of a full `run`: feed, categories, then the queued products
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub feed: FeedSummary,
    pub categories: SyncSummary,
    pub products: SyncSummary,
}

pub struct SyncService {
    source: Arc<dyn CatalogSource>,
    destination: Arc<dyn CatalogDestination>,
    mappings: Arc<dyn MappingStore>,
    cursors: Arc<dyn CursorStore>,
    queue: Arc<dyn ItemQueue>,
    limits: SyncLimits,
}

impl SyncService {
    /// Build a service whose mappings, cursors and queue share one store
    pub fn new<S>(
        source: Arc<dyn CatalogSource>,
        destination: Arc<dyn CatalogDestination>,
        store: Arc<S>,
        limits: SyncLimits,
    ) -> Self
    where
        S: MappingStore + CursorStore + ItemQueue + 'static,
    {
        Self {
            source,
            destination,
            mappings: store.clone(),
            cursors: store.clone(),
            queue: store,
            limits,
        }
    }

    /// Build a service from separately supplied collaborators
    pub fn from_parts(
        source: Arc<dyn CatalogSource>,
        destination: Arc<dyn CatalogDestination>,
        mappings: Arc<dyn MappingStore>,
        cursors: Arc<dyn CursorStore>,
        queue: Arc<dyn ItemQueue>,
        limits: SyncLimits,
    ) -> Self {
        Self {
            source,
            destination,
            mappings,
            cursors,
            queue,
            limits,
        }
    }

    pub fn limits(&self) -> SyncLimits {
        self.limits
    }

    /// Apply per-invocation overrides
    pub fn with_limits(mut self, limits: SyncLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Fetch the category snapshot and create whatever is missing
    pub async fn sync_categories(&self) -> SyncResult<SyncSummary> {
        let categories = self.source.category_list().await?;
        tracing::info!(count = categories.len(), "Fetched category snapshot");
        self.category_sync().run(&categories).await
    }

    /// Create or update one message batch of products
    pub async fn sync_products(&self, items: Vec<SourceProduct>) -> SyncResult<SyncSummary> {
        ProductSync::new(
            self.destination.as_ref(),
            self.mappings.as_ref(),
            self.limits.max_batch_items,
            self.limits.max_total_items,
        )
        .run(items)
        .await
    }

    /// Run the product flow over the queue until it is empty or
    /// `max_total_items` were processed
    ///
    /// Items are acked only after their batch succeeded; on error they stay
    /// queued for the next run.
    pub async fn drain_queue(&self) -> SyncResult<SyncSummary> {
        let mut summary = SyncSummary::new(EntityKind::Product);
        let mut processed = 0;

        while processed < self.limits.max_total_items {
            let take = self
                .limits
                .max_batch_items
                .min(self.limits.max_total_items - processed)
                .max(1);
            let queued = self.queue.peek(take).await?;
            if queued.is_empty() {
                break;
            }

            let seqs: Vec<u64> = queued.iter().map(|q| q.seq).collect();
            let items: Vec<SourceProduct> = queued.into_iter().map(|q| q.item).collect();
            processed += items.len();

            let batch_summary = self.sync_products(items).await?;
            self.queue.ack(&seqs).await?;
            summary.merge(batch_summary);
        }

        let remaining = self.queue.len().await?;
        tracing::info!(processed, remaining, "Item queue drained");
        Ok(summary)
    }

    /// Pull changed items from the source into the queue
    pub async fn run_feed(&self) -> SyncResult<FeedSummary> {
        ProductFeed::new(
            self.source.as_ref(),
            self.cursors.as_ref(),
            self.queue.as_ref(),
        )
        .run(self.limits.max_batch_items, self.limits.max_total_items)
        .await
    }

    /// Feed, categories, then products
    pub async fn run(&self) -> SyncResult<RunReport> {
        let feed = self.run_feed().await?;
        let categories = self.sync_categories().await?;
        let products = self.drain_queue().await?;
        Ok(RunReport {
            feed,
            categories,
            products,
        })
    }

    /// Delete everything this engine created and forget all mappings
    pub async fn reset(&self) -> SyncResult<ResetSummary> {
        ResetService::new(
            self.destination.as_ref(),
            self.mappings.as_ref(),
            self.cursors.as_ref(),
            self.queue.as_ref(),
        )
        .run()
        .await
    }

    fn category_sync(&self) -> CategorySync<'_> {
        CategorySync::new(
            self.destination.as_ref(),
            self.mappings.as_ref(),
            self.limits.max_batch_categories,
            self.limits.max_total_categories,
            self.limits.max_category_depth,
        )
    }
}
