//! Batch gate: cap a sequence at a total, then split it into ordered chunks

use shared::SyncIssue;

/// Lazy, single-pass chunk iterator returned by [`chunk`]
///
/// Yields `Vec`s of at most `max_batch` items in input order. An empty
/// input yields no chunks at all.
#[derive(Debug)]
pub struct Chunks<T> {
    items: std::vec::IntoIter<T>,
    max_batch: usize,
    kept: usize,
    total: usize,
}

impl<T> Chunks<T> {
    /// Items that survived truncation
    pub fn kept(&self) -> usize {
        self.kept
    }

    /// Items before truncation
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_truncated(&self) -> bool {
        self.kept < self.total
    }

    /// The truncation warning, if anything was dropped
    pub fn truncation(&self) -> Option<SyncIssue> {
        self.is_truncated().then(|| SyncIssue::Truncated {
            kept: self.kept,
            total: self.total,
        })
    }
}

impl<T> Iterator for Chunks<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: Vec<T> = self.items.by_ref().take(self.max_batch).collect();
        if chunk.is_empty() { None } else { Some(chunk) }
    }
}

/// Truncate `items` to `max_total`, then chunk by `max_batch`
///
/// A `max_batch` of zero is treated as one.
pub fn chunk<T>(mut items: Vec<T>, max_batch: usize, max_total: usize) -> Chunks<T> {
    let total = items.len();
    let kept = total.min(max_total);
    if kept < total {
        tracing::warn!(kept, total, "Input truncated to configured maximum");
        items.truncate(kept);
    }

    Chunks {
        items: items.into_iter(),
        max_batch: max_batch.max(1),
        kept,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_then_chunks_in_order() {
        let items: Vec<u32> = (1..=250).collect();
        let mut chunks = chunk(items, 100, 180);
        assert!(chunks.is_truncated());
        assert_eq!(
            chunks.truncation(),
            Some(SyncIssue::Truncated { kept: 180, total: 250 })
        );

        let all: Vec<Vec<u32>> = chunks.by_ref().collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], (1..=100).collect::<Vec<_>>());
        assert_eq!(all[1], (101..=180).collect::<Vec<_>>());

        // single pass
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let mut chunks = chunk(Vec::<u32>::new(), 100, 100);
        assert!(chunks.next().is_none());
        assert!(chunks.truncation().is_none());
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        let sizes: Vec<usize> = chunk((0..200).collect::<Vec<u32>>(), 100, 1000)
            .map(|c| c.len())
            .collect();
        assert_eq!(sizes, vec![100, 100]);
    }

    #[test]
    fn test_zero_batch_still_progresses() {
        let sizes: Vec<usize> = chunk(vec!['a', 'b'], 0, 10).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1, 1]);
    }
}
