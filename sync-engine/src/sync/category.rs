//! Category flow
//!
//! Caps the snapshot, splits it into batches and runs the resolver and the
//! leveled creator per batch. Ancestors outside a batch are pulled in by the
//! resolver, so every batch is self-contained. Outcomes carry over between
//! batches through a [`RunLedger`].

use shared::{EntityKind, SourceCategory, SyncSummary};

use super::ancestry::{CategoryIndex, resolve_batch};
use super::batch;
use super::leveled::{LeveledCreator, RunLedger};
use super::traits::{CatalogDestination, MappingStore};
use crate::core::SyncResult;

pub struct CategorySync<'a> {
    destination: &'a dyn CatalogDestination,
    mappings: &'a dyn MappingStore,
    max_batch: usize,
    max_total: usize,
    max_depth: usize,
}

impl<'a> CategorySync<'a> {
    pub fn new(
        destination: &'a dyn CatalogDestination,
        mappings: &'a dyn MappingStore,
        max_batch: usize,
        max_total: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            destination,
            mappings,
            max_batch,
            max_total,
            max_depth,
        }
    }

    /// Sync one category snapshot
    pub async fn run(&self, categories: &[SourceCategory]) -> SyncResult<SyncSummary> {
        let mut summary = SyncSummary::new(EntityKind::Category);
        let index = CategoryIndex::new(categories);
        let creator = LeveledCreator::new(self.destination, self.mappings, self.max_depth);
        let mut ledger = RunLedger::new();

        let chunks = batch::chunk(categories.to_vec(), self.max_batch, self.max_total);
        if let Some(issue) = chunks.truncation() {
            summary.issues.push(issue);
        }

        for (batch_no, leaves) in chunks.enumerate() {
            let mut chains = resolve_batch(&leaves, &index);
            tracing::info!(
                batch = batch_no,
                leaves = leaves.len(),
                chain = chains.len(),
                "Processing category batch"
            );

            let mut batch_summary = creator.run(&chains, &index, &mut ledger).await?;
            batch_summary.issues.splice(0..0, chains.take_issues());
            summary.merge(batch_summary);
        }
        ledger.settle(&mut summary);

        tracing::info!(
            created = summary.created,
            failed = summary.failed,
            incomplete = summary.incomplete.len(),
            "Category sync finished"
        );
        Ok(summary)
    }
}
