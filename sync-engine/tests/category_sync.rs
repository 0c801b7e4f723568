mod common;

use common::{FakeInventory, FakeStorefront, Harness, cat};
use shared::{EntityKind, SourceCategory, SyncIssue};
use sync_engine::SyncLimits;

fn mapped_ids(harness: &Harness) -> Vec<String> {
    let mut ids: Vec<String> = harness
        .storage
        .list_mappings(EntityKind::Category)
        .unwrap()
        .into_iter()
        .map(|m| m.source_id)
        .collect();
    ids.sort();
    ids
}

fn chain(len: usize) -> Vec<SourceCategory> {
    (1..=len)
        .map(|i| {
            let parent = if i == 1 {
                "-1".to_string()
            } else {
                format!("c{:02}", i - 1)
            };
            cat(&format!("c{i:02}"), &parent)
        })
        .collect()
}

#[tokio::test]
async fn test_parent_and_child_created_in_two_passes() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("1", "-1"), cat("2", "1")]),
        FakeStorefront::new(),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.levels, 2);
    assert!(summary.is_complete());
    assert_eq!(
        harness.storefront.category_create_calls(),
        vec![vec!["1".to_string()], vec!["2".to_string()]]
    );
    assert_eq!(mapped_ids(&harness), vec!["1", "2"]);

    let (parent_id, _) = harness.storefront.category_by_slug("1").unwrap();
    let (_, child) = harness.storefront.category_by_slug("2").unwrap();
    assert_eq!(child.parent, Some(parent_id));
}

#[tokio::test]
async fn test_second_run_creates_nothing() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("1", "-1"), cat("2", "1"), cat("3", "2")]),
        FakeStorefront::new(),
    );

    harness.service.sync_categories().await.unwrap();
    let creates_after_first = harness.storefront.category_creates();

    let second = harness.service.sync_categories().await.unwrap();

    assert_eq!(second.created, 0);
    assert_eq!(second.already_mapped, 3);
    assert_eq!(second.levels, 0);
    assert_eq!(harness.storefront.category_creates(), creates_after_first);
    assert_eq!(mapped_ids(&harness).len(), 3);
}

#[tokio::test]
async fn test_parents_always_exist_before_children() {
    // a forest of three trees, listed deepest first
    let mut categories: Vec<SourceCategory> = (0..45)
        .map(|i| {
            let parent = if i < 3 {
                "-1".to_string()
            } else {
                format!("n{}", (i - 3) / 2)
            };
            cat(&format!("n{i}"), &parent)
        })
        .collect();
    categories.reverse();

    let harness = Harness::new(
        FakeInventory::with_categories(categories.clone()),
        FakeStorefront::new(),
    );
    let summary = harness.service.sync_categories().await.unwrap();

    assert!(summary.is_complete(), "{:?}", summary.issues);
    assert_eq!(summary.created, 45);
    assert_eq!(harness.storefront.state.lock().unwrap().orphan_creates, 0);

    let mappings = harness
        .storage
        .lookup_mappings(
            EntityKind::Category,
            &categories.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
        )
        .unwrap();
    for category in &categories {
        let (_, created) = harness.storefront.category_by_slug(&category.id).unwrap();
        if category.is_root() {
            assert_eq!(created.parent, None);
        } else {
            assert_eq!(created.parent, Some(mappings[&category.parent_id]));
        }
    }
}

#[tokio::test]
async fn test_depth_bound_leaves_deepest_unmapped() {
    let harness = Harness::new(
        FakeInventory::with_categories(chain(12)),
        FakeStorefront::new(),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 10);
    assert_eq!(summary.levels, 10);
    assert_eq!(summary.incomplete, vec!["c11".to_string(), "c12".to_string()]);
    assert!(summary.issues.iter().any(|issue| matches!(
        issue,
        SyncIssue::UnresolvedDependency { category_id, parent_id }
            if category_id == "c11" && parent_id == "c10"
    )));
    assert_eq!(mapped_ids(&harness).len(), 10);

    // the next run picks up where the bound stopped
    let rerun = harness.service.sync_categories().await.unwrap();
    assert_eq!(rerun.created, 2);
    assert!(rerun.is_complete());
    assert_eq!(mapped_ids(&harness).len(), 12);
}

#[tokio::test]
async fn test_configured_depth_is_honored() {
    let limits = SyncLimits {
        max_category_depth: 3,
        ..Default::default()
    };
    let harness = Harness::with_limits(
        FakeInventory::with_categories(chain(5)),
        FakeStorefront::new(),
        limits,
    );

    let summary = harness.service.sync_categories().await.unwrap();
    assert_eq!(summary.created, 3);
    assert_eq!(summary.incomplete.len(), 2);
}

#[tokio::test]
async fn test_item_error_does_not_block_siblings() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("1", "-1"), cat("2", "-1"), cat("3", "-1")]),
        FakeStorefront::new().failing_slugs(&["2"]),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(harness.storefront.category_create_calls().len(), 1);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(mapped_ids(&harness), vec!["1", "3"]);
    assert!(summary.issues.iter().any(|issue| matches!(
        issue,
        SyncIssue::ItemCreation { code, .. } if code == "term_exists"
    )));
}

#[tokio::test]
async fn test_failed_parent_leaves_child_incomplete() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("1", "-1"), cat("2", "1"), cat("9", "-1")]),
        FakeStorefront::new().failing_slugs(&["1"]),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(mapped_ids(&harness), vec!["9"]);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.incomplete, vec!["2".to_string()]);
    // only the roots were ever submitted
    assert_eq!(harness.storefront.category_creates(), 2);
}

#[tokio::test]
async fn test_failed_category_not_resubmitted_by_later_batches() {
    let limits = SyncLimits {
        max_batch_categories: 1,
        ..Default::default()
    };
    let harness = Harness::with_limits(
        FakeInventory::with_categories(vec![cat("1", "-1"), cat("2", "1"), cat("3", "1")]),
        FakeStorefront::new().failing_slugs(&["1"]),
        limits,
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(
        harness.storefront.category_create_calls(),
        vec![vec!["1".to_string()]]
    );
    assert_eq!(summary.failed, 1);
    let rejections = summary
        .issues
        .iter()
        .filter(|issue| matches!(issue, SyncIssue::ItemCreation { code, .. } if code == "term_exists"))
        .count();
    assert_eq!(rejections, 1);
    assert_eq!(summary.incomplete, vec!["2".to_string(), "3".to_string()]);
}

#[tokio::test]
async fn test_later_batch_clears_earlier_incomplete() {
    let mut categories = chain(12);
    categories.rotate_right(1);
    let limits = SyncLimits {
        max_batch_categories: 1,
        ..Default::default()
    };
    let harness = Harness::with_limits(
        FakeInventory::with_categories(categories),
        FakeStorefront::new(),
        limits,
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 11);
    assert_eq!(summary.incomplete, vec!["c12".to_string()]);
    assert!(!summary.issues.iter().any(|issue| matches!(
        issue,
        SyncIssue::UnresolvedDependency { category_id, .. } if category_id == "c11"
    )));
    assert_eq!(mapped_ids(&harness).len(), 11);
}

#[tokio::test]
async fn test_shared_ancestors_counted_once() {
    let limits = SyncLimits {
        max_batch_categories: 1,
        ..Default::default()
    };
    let harness = Harness::with_limits(
        FakeInventory::with_categories(vec![cat("1", "-1"), cat("2", "1"), cat("3", "1")]),
        FakeStorefront::new(),
        limits,
    );
    harness.service.sync_categories().await.unwrap();

    let rerun = harness.service.sync_categories().await.unwrap();

    assert_eq!(rerun.candidates, 3);
    assert_eq!(rerun.already_mapped, 3);
    assert_eq!(rerun.created, 0);
}

#[tokio::test]
async fn test_missing_parent_is_reported_not_raised() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("5", "404"), cat("1", "-1")]),
        FakeStorefront::new(),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(mapped_ids(&harness), vec!["1"]);
    assert_eq!(summary.incomplete, vec!["5".to_string()]);
    assert!(summary.issues.iter().any(|issue| matches!(
        issue,
        SyncIssue::MalformedRecord { category_id, .. } if category_id == "5"
    )));
}

#[tokio::test]
async fn test_cycle_terminates_without_creates() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("a", "b"), cat("b", "a"), cat("s", "s")]),
        FakeStorefront::new(),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 0);
    assert_eq!(summary.incomplete.len(), 3);
    assert_eq!(harness.storefront.category_creates(), 0);
}

#[tokio::test]
async fn test_total_cap_and_batches() {
    let roots: Vec<SourceCategory> = (1..=5).map(|i| cat(&i.to_string(), "-1")).collect();
    let limits = SyncLimits {
        max_batch_categories: 2,
        max_total_categories: 3,
        ..Default::default()
    };
    let harness = Harness::with_limits(
        FakeInventory::with_categories(roots),
        FakeStorefront::new(),
        limits,
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 3);
    assert_eq!(
        harness.storefront.category_create_calls(),
        vec![
            vec!["1".to_string(), "2".to_string()],
            vec!["3".to_string()]
        ]
    );
    assert!(summary
        .issues
        .contains(&SyncIssue::Truncated { kept: 3, total: 5 }));
}

#[tokio::test]
async fn test_level_split_to_destination_batch_size() {
    let roots: Vec<SourceCategory> = (1..=5).map(|i| cat(&i.to_string(), "-1")).collect();
    let harness = Harness::new(
        FakeInventory::with_categories(roots),
        FakeStorefront::new().max_batch(2),
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 5);
    assert_eq!(summary.levels, 1);
    let sizes: Vec<usize> = harness
        .storefront
        .category_create_calls()
        .iter()
        .map(Vec::len)
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_ancestors_outside_the_batch_are_pulled_in() {
    let limits = SyncLimits {
        max_batch_categories: 1,
        ..Default::default()
    };
    let harness = Harness::with_limits(
        FakeInventory::with_categories(vec![cat("2", "1"), cat("1", "-1")]),
        FakeStorefront::new(),
        limits,
    );

    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(harness.storefront.category_creates(), 2);
    assert_eq!(harness.storefront.state.lock().unwrap().orphan_creates, 0);
}

#[tokio::test]
async fn test_new_child_of_mapped_parent() {
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("1", "-1")]),
        FakeStorefront::new(),
    );
    harness.service.sync_categories().await.unwrap();

    harness
        .inventory
        .categories
        .lock()
        .unwrap()
        .push(cat("2", "1"));
    let summary = harness.service.sync_categories().await.unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.already_mapped, 1);
    assert_eq!(harness.storefront.category_create_calls().len(), 2);
    assert_eq!(mapped_ids(&harness), vec!["1", "2"]);
}

#[tokio::test]
async fn test_transport_failure_aborts_run() {
    let storefront = FakeStorefront::new();
    storefront.set_offline(true);
    let harness = Harness::new(
        FakeInventory::with_categories(vec![cat("1", "-1")]),
        storefront,
    );

    assert!(harness.service.sync_categories().await.is_err());
    assert!(mapped_ids(&harness).is_empty());

    harness.storefront.set_offline(false);
    let summary = harness.service.sync_categories().await.unwrap();
    assert_eq!(summary.created, 1);
}
