//! Leveled creator
//!
//! Turns one batch's ancestor chains into breadth-first creation passes.
//! Level 0 creates the roots; each later level creates the categories whose
//! parent became mapped in an earlier level (or a previous run). The loop is
//! bounded by `max_depth`, so malformed hierarchies end with the leftovers
//! reported as incomplete instead of looping.
//!
//! A [`RunLedger`] carries state across the batches of one run: a category
//! that failed is never submitted again, and each id is counted once.
//!
//! ```text
//! PENDING ──(parent mapped)──▶ READY ──▶ SUBMITTED ──┬──▶ MAPPED
//!                                                     └──▶ FAILED
//! ```

use shared::{BatchRequest, EntityKind, ROOT_SENTINEL, SyncIssue, SyncSummary};
use std::collections::{HashMap, HashSet};

use super::ancestry::{AncestorChains, CategoryIndex};
use super::batch;
use super::correlate::{correlate_creates, persist_mappings};
use super::traits::{CatalogDestination, MappingStore};
use crate::core::SyncResult;
use crate::transform::to_store_category;

/// Category outcomes shared by every batch of one run
#[derive(Debug, Default)]
pub struct RunLedger {
    seen: HashSet<String>,
    mapped: HashSet<String>,
    failed: HashSet<String>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mapped(&self, id: &str) -> bool {
        self.mapped.contains(id)
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.failed.contains(id)
    }

    /// Drop incomplete reports for ids a later batch mapped, and duplicates
    pub fn settle(&self, summary: &mut SyncSummary) {
        let mut reported = HashSet::new();
        summary
            .incomplete
            .retain(|id| !self.is_mapped(id) && reported.insert(id.clone()));

        let mut reported = HashSet::new();
        summary.issues.retain(|issue| match issue {
            SyncIssue::UnresolvedDependency { category_id, .. } => {
                !self.is_mapped(category_id) && reported.insert(category_id.clone())
            }
            _ => true,
        });
    }
}

/// Per-run creation of one batch of categories
pub struct LeveledCreator<'a> {
    destination: &'a dyn CatalogDestination,
    mappings: &'a dyn MappingStore,
    max_depth: usize,
}

impl<'a> LeveledCreator<'a> {
    pub fn new(
        destination: &'a dyn CatalogDestination,
        mappings: &'a dyn MappingStore,
        max_depth: usize,
    ) -> Self {
        Self {
            destination,
            mappings,
            max_depth,
        }
    }

    /// Create every unmapped category in `chains`, level by level
    ///
    /// Only transport and store failures are returned as errors. Mappings
    /// are persisted after every destination call, so an error keeps the
    /// work of earlier calls.
    pub async fn run(
        &self,
        chains: &AncestorChains,
        index: &CategoryIndex<'_>,
        ledger: &mut RunLedger,
    ) -> SyncResult<SyncSummary> {
        let kind = EntityKind::Category;
        let mut summary = SyncSummary::new(kind);

        let mut mapped: HashMap<String, i64> = self
            .mappings
            .lookup_batch(kind, &chains.lookup_ids())
            .await?;

        // Ancestors shared with earlier batches are counted there
        for id in chains.ids() {
            if ledger.seen.insert(id.clone()) {
                summary.candidates += 1;
                if mapped.contains_key(id) {
                    summary.already_mapped += 1;
                }
            }
        }

        let mut pending: Vec<String> = chains
            .ids()
            .iter()
            .filter(|id| !mapped.contains_key(*id) && !ledger.is_failed(id))
            .cloned()
            .collect();

        tracing::debug!(
            candidates = summary.candidates,
            already_mapped = summary.already_mapped,
            pending = pending.len(),
            "Category batch resolved"
        );

        for level in 0..self.max_depth {
            if pending.is_empty() {
                break;
            }

            let ready: Vec<String> = pending
                .iter()
                .filter(|id| {
                    let parent = chains.parent_of(id).unwrap_or(ROOT_SENTINEL);
                    if level == 0 {
                        parent == ROOT_SENTINEL
                    } else {
                        mapped.contains_key(parent)
                    }
                })
                .cloned()
                .collect();

            if ready.is_empty() {
                // Roots may all be mapped already; children of mapped parents
                // become ready from level 1 on.
                if level == 0 {
                    continue;
                }
                break;
            }

            tracing::info!(level, ready = ready.len(), "Creating category level");
            summary.levels = level + 1;

            let payloads: Vec<_> = ready
                .iter()
                .filter_map(|id| {
                    let category = index.get(id)?;
                    let parent = mapped.get(&category.parent_id).copied();
                    Some(to_store_category(category, parent))
                })
                .collect();

            for chunk in batch::chunk(payloads, self.destination.max_batch_size(), usize::MAX) {
                let submitted: Vec<String> = chunk.iter().map(|c| c.slug.clone()).collect();
                let request = BatchRequest {
                    create: chunk,
                    ..Default::default()
                };
                let response = self.destination.batch_categories(&request).await?;

                let outcome =
                    correlate_creates(kind, &submitted, &response.create, |row| row.slug.as_deref());
                let effective =
                    persist_mappings(self.mappings, kind, &outcome.mapped, &mut summary.issues)
                        .await?;

                summary.created += outcome.mapped.len();
                summary.failed += outcome.failed.len();
                summary.issues.extend(outcome.issues);
                ledger.failed.extend(outcome.failed);
                ledger.mapped.extend(effective.keys().cloned());
                mapped.extend(effective);
            }

            pending.retain(|id| !mapped.contains_key(id) && !ledger.is_failed(id));
        }

        for id in pending {
            let parent_id = chains.parent_of(&id).unwrap_or(ROOT_SENTINEL).to_string();
            tracing::warn!(
                category_id = %id,
                parent_id = %parent_id,
                "Category left unmapped within depth bound"
            );
            summary.issues.push(SyncIssue::UnresolvedDependency {
                category_id: id.clone(),
                parent_id,
            });
            summary.incomplete.push(id);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_drops_mapped_and_repeated_ids() {
        let mut ledger = RunLedger::new();
        ledger.mapped.insert("c11".to_string());

        let mut summary = SyncSummary::new(EntityKind::Category);
        for (id, parent) in [("c11", "c10"), ("c12", "c11"), ("c12", "c11")] {
            summary.incomplete.push(id.to_string());
            summary.issues.push(SyncIssue::UnresolvedDependency {
                category_id: id.to_string(),
                parent_id: parent.to_string(),
            });
        }

        ledger.settle(&mut summary);

        assert_eq!(summary.incomplete, vec!["c12".to_string()]);
        assert_eq!(summary.issues.len(), 1);
    }
}
