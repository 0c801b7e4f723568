//! Destructive reset
//!
//! Deletes every mapped product and category at the destination, clears
//! both mapping tables, rewinds the item cursor and drains the queue. The
//! only code path that removes mapping rows.

use shared::{BatchRequest, EntityKind, ResetSummary, StoreCategory, StoreProduct};

use super::batch;
use super::feed::ITEM_CURSOR;
use super::traits::{CatalogDestination, CursorStore, ItemQueue, MappingStore};
use crate::core::SyncResult;

pub struct ResetService<'a> {
    destination: &'a dyn CatalogDestination,
    mappings: &'a dyn MappingStore,
    cursors: &'a dyn CursorStore,
    queue: &'a dyn ItemQueue,
}

impl<'a> ResetService<'a> {
    pub fn new(
        destination: &'a dyn CatalogDestination,
        mappings: &'a dyn MappingStore,
        cursors: &'a dyn CursorStore,
        queue: &'a dyn ItemQueue,
    ) -> Self {
        Self {
            destination,
            mappings,
            cursors,
            queue,
        }
    }

    pub async fn run(&self) -> SyncResult<ResetSummary> {
        let mut summary = ResetSummary::default();
        let max_batch = self.destination.max_batch_size();

        // products first, they reference categories
        let products = self.destination_ids(EntityKind::Product).await?;
        for ids in batch::chunk(products, max_batch, usize::MAX) {
            let request: BatchRequest<StoreProduct> = BatchRequest {
                delete: ids,
                ..Default::default()
            };
            let response = self.destination.batch_products(&request).await?;
            summary.products_deleted += deleted_count(&response.delete);
        }
        summary.product_mappings_cleared = self.mappings.clear(EntityKind::Product).await?;

        let categories = self.destination_ids(EntityKind::Category).await?;
        for ids in batch::chunk(categories, max_batch, usize::MAX) {
            let request: BatchRequest<StoreCategory> = BatchRequest {
                delete: ids,
                ..Default::default()
            };
            let response = self.destination.batch_categories(&request).await?;
            summary.categories_deleted += deleted_count(&response.delete);
        }
        summary.category_mappings_cleared = self.mappings.clear(EntityKind::Category).await?;

        self.cursors.set_cursor(ITEM_CURSOR, 0).await?;
        summary.queue_drained = self.queue.purge().await?;

        tracing::warn!(
            products = summary.products_deleted,
            categories = summary.categories_deleted,
            queue = summary.queue_drained,
            "Catalog reset complete"
        );
        Ok(summary)
    }

    async fn destination_ids(&self, kind: EntityKind) -> SyncResult<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .mappings
            .list_all(kind)
            .await?
            .into_iter()
            .map(|m| m.destination_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        tracing::info!(%kind, count = ids.len(), "Deleting mapped destination entities");
        Ok(ids)
    }
}

fn deleted_count(rows: &[shared::BatchRow]) -> usize {
    rows.iter().filter(|row| row.error.is_none()).count()
}
