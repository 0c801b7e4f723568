//! Create-response correlation and mapping persistence
//!
//! Batch create responses are unordered. Each success row is matched back to
//! its source id through the field the destination echoes (`slug` for
//! categories, `sku` for products).

use shared::{BatchRow, EntityKind, IdMapping, SyncIssue};
use std::collections::{HashMap, HashSet};

use super::traits::MappingStore;
use crate::core::SyncResult;

/// Result of matching one create response against its request
#[derive(Debug, Default)]
pub struct CreateOutcome {
    /// New mappings from correlated success rows
    pub mapped: Vec<IdMapping>,
    /// Submitted ids that did not come back as a success row
    pub failed: Vec<String>,
    pub issues: Vec<SyncIssue>,
}

/// Match `rows` against the `submitted` source ids
///
/// Error rows become creation issues. Success rows echoing an id that was not
/// submitted (or was already matched) are reported and ignored. Submitted ids
/// left without a success row are failed.
pub fn correlate_creates<F>(
    kind: EntityKind,
    submitted: &[String],
    rows: &[BatchRow],
    echoed: F,
) -> CreateOutcome
where
    F: Fn(&BatchRow) -> Option<&str>,
{
    let pending: HashSet<&str> = submitted.iter().map(String::as_str).collect();
    let mut matched: HashSet<&str> = HashSet::new();
    let mut outcome = CreateOutcome::default();

    for row in rows {
        let echo = echoed(row).filter(|id| pending.contains(id));

        if let Some(error) = &row.error {
            tracing::warn!(
                %kind,
                source_id = echo.unwrap_or("?"),
                code = %error.code,
                "Destination rejected create: {}",
                error.message
            );
            outcome.issues.push(SyncIssue::ItemCreation {
                kind,
                source_id: echo.map(str::to_string),
                code: error.code.clone(),
                message: error.message.clone(),
            });
            continue;
        }

        match (echo, row.created_id()) {
            (Some(source_id), Some(destination_id)) if matched.insert(source_id) => {
                outcome
                    .mapped
                    .push(IdMapping::new(kind, source_id, destination_id));
            }
            _ => {
                tracing::warn!(
                    %kind,
                    echoed = ?echoed(row),
                    destination_id = ?row.id,
                    "Create response row could not be correlated"
                );
                outcome.issues.push(SyncIssue::UncorrelatedResponse {
                    kind,
                    echoed: echoed(row).map(str::to_string),
                    destination_id: row.id,
                });
            }
        }
    }

    for source_id in submitted {
        if matched.contains(source_id.as_str()) {
            continue;
        }
        let reported = outcome.issues.iter().any(|issue| {
            matches!(issue, SyncIssue::ItemCreation { source_id: Some(id), .. } if id == source_id)
        });
        if !reported {
            outcome.issues.push(SyncIssue::ItemCreation {
                kind,
                source_id: Some(source_id.clone()),
                code: "missing_result".to_string(),
                message: "no success row in create response".to_string(),
            });
        }
        outcome.failed.push(source_id.clone());
    }

    outcome
}

/// Persist `mappings`, returning the ids now in effect
///
/// When a row already holds another destination id, the stored id wins and a
/// conflict issue is recorded.
pub async fn persist_mappings(
    store: &dyn MappingStore,
    kind: EntityKind,
    mappings: &[IdMapping],
    issues: &mut Vec<SyncIssue>,
) -> SyncResult<HashMap<String, i64>> {
    let mut effective: HashMap<String, i64> = mappings
        .iter()
        .map(|m| (m.source_id.clone(), m.destination_id))
        .collect();
    if mappings.is_empty() {
        return Ok(effective);
    }

    let outcome = store.record_batch(kind, mappings).await?;
    for conflict in outcome.conflicts {
        tracing::warn!(
            %kind,
            source_id = %conflict.mapping.source_id,
            existing_id = conflict.existing_id,
            rejected_id = conflict.mapping.destination_id,
            "Mapping already held another destination id"
        );
        effective.insert(conflict.mapping.source_id.clone(), conflict.existing_id);
        issues.push(SyncIssue::MappingConflict {
            kind,
            source_id: conflict.mapping.source_id,
            existing_id: conflict.existing_id,
            rejected_id: conflict.mapping.destination_id,
        });
    }

    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BatchRowError;

    fn ok_row(id: i64, slug: &str) -> BatchRow {
        BatchRow {
            id: Some(id),
            slug: Some(slug.to_string()),
            ..Default::default()
        }
    }

    fn error_row(code: &str) -> BatchRow {
        BatchRow {
            id: Some(0),
            error: Some(BatchRowError {
                code: code.to_string(),
                message: "rejected".to_string(),
            }),
            ..Default::default()
        }
    }

    fn slug(row: &BatchRow) -> Option<&str> {
        row.slug.as_deref()
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_error_row_isolated_from_siblings() {
        let rows = vec![ok_row(11, "1"), error_row("term_exists"), ok_row(13, "3")];
        let outcome =
            correlate_creates(EntityKind::Category, &ids(&["1", "2", "3"]), &rows, slug);

        let mapped: Vec<&str> = outcome.mapped.iter().map(|m| m.source_id.as_str()).collect();
        assert_eq!(mapped, vec!["1", "3"]);
        assert_eq!(outcome.failed, vec!["2".to_string()]);
        // the error row carried no slug, so "2" also gets a missing-result issue
        assert_eq!(outcome.issues.len(), 2);
    }

    #[test]
    fn test_response_order_is_not_relied_on() {
        let rows = vec![ok_row(13, "3"), ok_row(11, "1")];
        let outcome = correlate_creates(EntityKind::Category, &ids(&["1", "3"]), &rows, slug);
        assert_eq!(outcome.mapped[0], IdMapping::new(EntityKind::Category, "3", 13));
        assert_eq!(outcome.mapped[1], IdMapping::new(EntityKind::Category, "1", 11));
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_unknown_echo_is_not_mapped() {
        let rows = vec![ok_row(11, "1"), ok_row(99, "not-sent")];
        let outcome = correlate_creates(EntityKind::Category, &ids(&["1"]), &rows, slug);
        assert_eq!(outcome.mapped.len(), 1);
        assert!(matches!(
            outcome.issues[0],
            SyncIssue::UncorrelatedResponse { destination_id: Some(99), .. }
        ));
    }

    #[test]
    fn test_correlated_error_row_reported_once() {
        let mut row = error_row("invalid");
        row.slug = Some("2".to_string());
        let outcome = correlate_creates(EntityKind::Category, &ids(&["2"]), &[row], slug);
        assert_eq!(outcome.failed, vec!["2".to_string()]);
        assert_eq!(outcome.issues.len(), 1);
    }
}
