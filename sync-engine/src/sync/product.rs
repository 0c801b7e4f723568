//! Product flow
//!
//! Partitions a message batch by mapping state, sends creates and updates in
//! one batch call per chunk, and records the mappings of newly created
//! products. Unmapped category references are dropped from the payload with
//! a warning; the product itself is still sent.

use shared::{
    BatchRequest, EntityKind, SourceProduct, StoreProduct, SyncIssue, SyncSummary,
};
use std::collections::{HashMap, HashSet};

use super::batch;
use super::correlate::{correlate_creates, persist_mappings};
use super::traits::{CatalogDestination, MappingStore};
use crate::core::SyncResult;
use crate::transform::to_store_product;

pub struct ProductSync<'a> {
    destination: &'a dyn CatalogDestination,
    mappings: &'a dyn MappingStore,
    max_batch: usize,
    max_total: usize,
}

impl<'a> ProductSync<'a> {
    pub fn new(
        destination: &'a dyn CatalogDestination,
        mappings: &'a dyn MappingStore,
        max_batch: usize,
        max_total: usize,
    ) -> Self {
        Self {
            destination,
            mappings,
            max_batch,
            max_total,
        }
    }

    /// Sync one message batch of products
    ///
    /// Duplicate ids keep their last occurrence.
    pub async fn run(&self, items: Vec<SourceProduct>) -> SyncResult<SyncSummary> {
        let kind = EntityKind::Product;
        let mut summary = SyncSummary::new(kind);

        let items = dedupe_last(items);
        // creates and updates share one call, so one chunk must fit it whole
        let max_batch = self.max_batch.min(self.destination.max_batch_size());
        let chunks = batch::chunk(items, max_batch, self.max_total);
        if let Some(issue) = chunks.truncation() {
            summary.issues.push(issue);
        }

        for (batch_no, chunk) in chunks.enumerate() {
            tracing::info!(batch = batch_no, items = chunk.len(), "Processing product batch");
            let chunk_summary = self.sync_chunk(chunk).await?;
            summary.merge(chunk_summary);
        }

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            failed = summary.failed,
            "Product sync finished"
        );
        Ok(summary)
    }

    async fn sync_chunk(&self, items: Vec<SourceProduct>) -> SyncResult<SyncSummary> {
        let kind = EntityKind::Product;
        let mut summary = SyncSummary::new(kind);
        summary.candidates = items.len();

        let item_ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let product_map = self.mappings.lookup_batch(kind, &item_ids).await?;

        let mut category_ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for item in &items {
            for id in &item.category_ids {
                if seen.insert(id.as_str()) {
                    category_ids.push(id.clone());
                }
            }
        }
        let category_map: HashMap<String, i64> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            self.mappings
                .lookup_batch(EntityKind::Category, &category_ids)
                .await?
        };

        let mut request: BatchRequest<StoreProduct> = BatchRequest::default();
        for item in &items {
            let destination_id = product_map.get(&item.id).copied();
            let payload = to_store_product(item, destination_id, &category_map);

            for category_id in payload.unmapped_categories {
                tracing::warn!(
                    product_id = %item.id,
                    category_id = %category_id,
                    "Product category has no mapping, sending without it"
                );
                summary.issues.push(SyncIssue::UnmappedCategory {
                    product_id: item.id.clone(),
                    category_id,
                });
            }

            if destination_id.is_some() {
                request.update.push(payload.product);
            } else {
                request.create.push(payload.product);
            }
        }
        summary.already_mapped = request.update.len();

        if request.is_empty() {
            return Ok(summary);
        }

        let submitted: Vec<String> = request
            .create
            .iter()
            .filter_map(|p| p.sku.clone())
            .collect();
        let response = self.destination.batch_products(&request).await?;

        let outcome = correlate_creates(kind, &submitted, &response.create, |row| row.sku.as_deref());
        persist_mappings(self.mappings, kind, &outcome.mapped, &mut summary.issues).await?;
        summary.created += outcome.mapped.len();
        summary.failed += outcome.failed.len();
        summary.issues.extend(outcome.issues);

        for row in &response.update {
            match &row.error {
                Some(error) => {
                    tracing::warn!(
                        destination_id = ?row.id,
                        code = %error.code,
                        "Destination rejected update: {}",
                        error.message
                    );
                    summary.failed += 1;
                    summary.issues.push(SyncIssue::ItemUpdate {
                        kind,
                        destination_id: row.id.filter(|id| *id > 0),
                        code: error.code.clone(),
                        message: error.message.clone(),
                    });
                }
                None => summary.updated += 1,
            }
        }

        Ok(summary)
    }
}

/// Drop earlier occurrences of repeated ids, keeping input order otherwise
fn dedupe_last(items: Vec<SourceProduct>) -> Vec<SourceProduct> {
    let last: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(pos, item)| (item.id.clone(), pos))
        .collect();
    items
        .into_iter()
        .enumerate()
        .filter(|(pos, item)| last.get(&item.id) == Some(pos))
        .map(|(_, item)| item)
        .collect()
}
