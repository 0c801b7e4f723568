//! In-memory collaborators for engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use shared::{
    BatchRequest, BatchResponse, BatchRow, BatchRowError, ItemPage, SourceCategory,
    SourceProduct, StoreCategory, StoreProduct,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use sync_engine::core::{SyncError, SyncLimits, SyncResult};
use sync_engine::sync::{CatalogDestination, CatalogSource};
use sync_engine::{SyncService, SyncStorage};

pub fn cat(id: &str, parent: &str) -> SourceCategory {
    SourceCategory::new(id, parent, format!("Category {id}"))
}

pub fn item(id: &str, categories: &[&str]) -> SourceProduct {
    SourceProduct::new(id, categories.iter().map(|c| c.to_string()).collect())
        .with_field("item_desc", format!("Item {id}"))
}

/// Inventory with a fixed category snapshot and a sequence-numbered item feed
#[derive(Default)]
pub struct FakeInventory {
    pub categories: Mutex<Vec<SourceCategory>>,
    pub items: Mutex<Vec<SourceProduct>>,
}

impl FakeInventory {
    pub fn with_categories(categories: Vec<SourceCategory>) -> Self {
        Self {
            categories: Mutex::new(categories),
            items: Mutex::new(Vec::new()),
        }
    }

    /// Append an item under the next feed sequence number
    pub fn push_item(&self, item: SourceProduct) {
        let mut items = self.items.lock().unwrap();
        let seq = items.len() as u64 + 1;
        items.push(item.with_field("update_seq", seq));
    }

    /// Append an item under an explicit sequence number
    pub fn push_item_at(&self, item: SourceProduct, seq: u64) {
        self.items
            .lock()
            .unwrap()
            .push(item.with_field("update_seq", seq));
    }
}

#[async_trait]
impl CatalogSource for FakeInventory {
    async fn category_list(&self) -> SyncResult<Vec<SourceCategory>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn items_since(&self, cursor: u64) -> SyncResult<ItemPage> {
        let items: Vec<SourceProduct> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.update_seq().unwrap_or(0) > cursor)
            .cloned()
            .collect();
        let next_cursor = items
            .iter()
            .filter_map(|i| i.update_seq())
            .max()
            .unwrap_or(cursor);
        Ok(ItemPage { items, next_cursor })
    }
}

#[derive(Default)]
pub struct StorefrontState {
    pub categories: HashMap<i64, StoreCategory>,
    pub products: HashMap<i64, StoreProduct>,
    pub category_calls: Vec<BatchRequest<StoreCategory>>,
    pub product_calls: Vec<BatchRequest<StoreProduct>>,
    /// Creates that referenced a parent the storefront did not have yet
    pub orphan_creates: usize,
}

/// Storefront that assigns ids, rejects configured slugs/skus and answers
/// create rows in reverse order
pub struct FakeStorefront {
    pub state: Mutex<StorefrontState>,
    next_id: Mutex<i64>,
    fail_slugs: HashSet<String>,
    fail_skus: HashSet<String>,
    fail_updates: HashSet<i64>,
    max_batch: usize,
    /// Fail every call (transport outage)
    pub offline: Mutex<bool>,
}

impl Default for FakeStorefront {
    fn default() -> Self {
        Self {
            state: Mutex::new(StorefrontState::default()),
            next_id: Mutex::new(100),
            fail_slugs: HashSet::new(),
            fail_skus: HashSet::new(),
            fail_updates: HashSet::new(),
            max_batch: 100,
            offline: Mutex::new(false),
        }
    }
}

impl FakeStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_slugs(mut self, slugs: &[&str]) -> Self {
        self.fail_slugs = slugs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_skus(mut self, skus: &[&str]) -> Self {
        self.fail_skus = skus.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_updates(mut self, ids: &[i64]) -> Self {
        self.fail_updates = ids.iter().copied().collect();
        self
    }

    pub fn max_batch(mut self, max: usize) -> Self {
        self.max_batch = max;
        self
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn category_creates(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .category_calls
            .iter()
            .map(|c| c.create.len())
            .sum()
    }

    pub fn product_creates(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .product_calls
            .iter()
            .map(|c| c.create.len())
            .sum()
    }

    /// Slugs of every category create call, in call order
    pub fn category_create_calls(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .category_calls
            .iter()
            .filter(|c| !c.create.is_empty())
            .map(|c| c.create.iter().map(|p| p.slug.clone()).collect())
            .collect()
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<(i64, StoreCategory)> {
        self.state
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|(_, c)| c.slug == slug)
            .map(|(id, c)| (*id, c.clone()))
    }

    pub fn product_by_sku(&self, sku: &str) -> Option<(i64, StoreProduct)> {
        self.state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|(_, p)| p.sku.as_deref() == Some(sku))
            .map(|(id, p)| (*id, p.clone()))
    }

    fn next_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn check<T>(&self, request: &BatchRequest<T>) -> SyncResult<()> {
        if *self.offline.lock().unwrap() {
            return Err(SyncError::protocol("storefront unreachable"));
        }
        let size = request.create.len() + request.update.len() + request.delete.len();
        if size > self.max_batch {
            return Err(SyncError::protocol(format!(
                "batch of {size} exceeds {}",
                self.max_batch
            )));
        }
        Ok(())
    }
}

fn error_row(code: &str) -> BatchRow {
    BatchRow {
        id: Some(0),
        error: Some(BatchRowError {
            code: code.to_string(),
            message: format!("{code} rejected by storefront"),
        }),
        ..Default::default()
    }
}

#[async_trait]
impl CatalogDestination for FakeStorefront {
    async fn batch_categories(
        &self,
        request: &BatchRequest<StoreCategory>,
    ) -> SyncResult<BatchResponse> {
        self.check(request)?;
        let mut response = BatchResponse::default();

        for category in &request.create {
            if self.fail_slugs.contains(&category.slug) {
                response.create.push(error_row("term_exists"));
                continue;
            }
            let mut state = self.state.lock().unwrap();
            if let Some(parent) = category.parent
                && !state.categories.contains_key(&parent)
            {
                state.orphan_creates += 1;
                response.create.push(error_row("invalid_parent"));
                continue;
            }
            let id = self.next_id();
            state.categories.insert(id, category.clone());
            response.create.push(BatchRow {
                id: Some(id),
                slug: Some(category.slug.clone()),
                ..Default::default()
            });
        }
        response.create.reverse();

        let mut state = self.state.lock().unwrap();
        for id in &request.delete {
            if state.categories.remove(id).is_some() {
                response.delete.push(BatchRow {
                    id: Some(*id),
                    ..Default::default()
                });
            } else {
                response.delete.push(error_row("invalid_term"));
            }
        }
        state.category_calls.push(request.clone());
        Ok(response)
    }

    async fn batch_products(
        &self,
        request: &BatchRequest<StoreProduct>,
    ) -> SyncResult<BatchResponse> {
        self.check(request)?;
        let mut response = BatchResponse::default();

        for product in &request.create {
            let sku = product.sku.clone().unwrap_or_default();
            if self.fail_skus.contains(&sku) {
                response.create.push(error_row("product_invalid_sku"));
                continue;
            }
            let id = self.next_id();
            self.state
                .lock()
                .unwrap()
                .products
                .insert(id, product.clone());
            response.create.push(BatchRow {
                id: Some(id),
                sku: Some(sku),
                ..Default::default()
            });
        }
        response.create.reverse();

        let mut state = self.state.lock().unwrap();
        for product in &request.update {
            let id = product.id.unwrap_or_default();
            if self.fail_updates.contains(&id) || !state.products.contains_key(&id) {
                response.update.push(error_row("invalid_product_id"));
                continue;
            }
            state.products.insert(id, product.clone());
            response.update.push(BatchRow {
                id: Some(id),
                sku: product.sku.clone(),
                ..Default::default()
            });
        }

        for id in &request.delete {
            if state.products.remove(id).is_some() {
                response.delete.push(BatchRow {
                    id: Some(*id),
                    ..Default::default()
                });
            } else {
                response.delete.push(error_row("invalid_product_id"));
            }
        }
        state.product_calls.push(request.clone());
        Ok(response)
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch
    }
}

pub struct Harness {
    pub inventory: Arc<FakeInventory>,
    pub storefront: Arc<FakeStorefront>,
    pub storage: Arc<SyncStorage>,
    pub service: SyncService,
}

impl Harness {
    pub fn new(inventory: FakeInventory, storefront: FakeStorefront) -> Self {
        Self::with_limits(inventory, storefront, SyncLimits::default())
    }

    pub fn with_limits(
        inventory: FakeInventory,
        storefront: FakeStorefront,
        limits: SyncLimits,
    ) -> Self {
        let storage = Arc::new(SyncStorage::open_in_memory().unwrap());
        Self::with_storage(inventory, storefront, storage, limits)
    }

    pub fn with_storage(
        inventory: FakeInventory,
        storefront: FakeStorefront,
        storage: Arc<SyncStorage>,
        limits: SyncLimits,
    ) -> Self {
        let inventory = Arc::new(inventory);
        let storefront = Arc::new(storefront);
        let service = SyncService::new(
            inventory.clone(),
            storefront.clone(),
            storage.clone(),
            limits,
        );
        Self {
            inventory,
            storefront,
            storage,
            service,
        }
    }
}
