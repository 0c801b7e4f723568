//! Product feed
//!
//! Pulls items changed since the stored cursor and publishes them to the
//! item queue in batches. The cursor moves only after every batch was
//! published. Items are published in `update_seq` order, so when the pull
//! was truncated the cursor stops below the first item left behind and the
//! rest is fetched again.

use shared::{FeedSummary, SourceProduct};

use super::batch;
use super::traits::{CatalogSource, CursorStore, ItemQueue};
use crate::core::SyncResult;

/// Cursor name for the item feed
pub const ITEM_CURSOR: &str = "item_info_since";

pub struct ProductFeed<'a> {
    source: &'a dyn CatalogSource,
    cursors: &'a dyn CursorStore,
    queue: &'a dyn ItemQueue,
}

impl<'a> ProductFeed<'a> {
    pub fn new(
        source: &'a dyn CatalogSource,
        cursors: &'a dyn CursorStore,
        queue: &'a dyn ItemQueue,
    ) -> Self {
        Self {
            source,
            cursors,
            queue,
        }
    }

    pub async fn run(&self, max_batch: usize, max_total: usize) -> SyncResult<FeedSummary> {
        let cursor_before = self.cursors.get_cursor(ITEM_CURSOR).await?.unwrap_or(0);
        let page = self.source.items_since(cursor_before).await?;
        let fetched = page.items.len();
        tracing::info!(cursor = cursor_before, fetched, "Pulled item feed");

        // Items without a sequence number go last
        let mut items = page.items;
        items.sort_by_key(|item| item.update_seq().unwrap_or(u64::MAX));
        let first_dropped = items.get(max_total).and_then(SourceProduct::update_seq);

        let chunks = batch::chunk(items, max_batch, max_total);
        let truncated = chunks.is_truncated();

        let mut published = 0;
        let mut highest_seq: Option<u64> = None;
        for chunk in chunks {
            for item in &chunk {
                if let Some(seq) = item.update_seq() {
                    highest_seq = Some(highest_seq.map_or(seq, |h| h.max(seq)));
                }
            }
            published += self.queue.publish(&chunk).await?;
        }

        let cursor_after = if truncated {
            let resume = highest_seq.unwrap_or(cursor_before);
            let resume = first_dropped.map_or(resume, |seq| resume.min(seq.saturating_sub(1)));
            resume.max(cursor_before)
        } else {
            page.next_cursor.max(cursor_before)
        };
        if cursor_after != cursor_before {
            self.cursors.set_cursor(ITEM_CURSOR, cursor_after).await?;
        }

        tracing::info!(
            published,
            truncated,
            cursor = cursor_after,
            "Item feed published"
        );
        Ok(FeedSummary {
            cursor_before,
            cursor_after,
            fetched,
            published,
            truncated,
        })
    }
}
