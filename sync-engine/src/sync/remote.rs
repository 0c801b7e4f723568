//! Collaborator implementations backed by the HTTP clients

use async_trait::async_trait;
use catalog_client::storefront::MAX_BATCH_SIZE;
use catalog_client::{InventoryClient, StorefrontClient};
use shared::{
    BatchRequest, BatchResponse, ItemPage, SourceCategory, StoreCategory, StoreProduct,
};

use super::traits::{CatalogDestination, CatalogSource};
use crate::core::SyncResult;

#[async_trait]
impl CatalogSource for InventoryClient {
    async fn category_list(&self) -> SyncResult<Vec<SourceCategory>> {
        Ok(self.get_category_list().await?)
    }

    async fn items_since(&self, cursor: u64) -> SyncResult<ItemPage> {
        Ok(InventoryClient::items_since(self, cursor).await?)
    }
}

#[async_trait]
impl CatalogDestination for StorefrontClient {
    async fn batch_categories(
        &self,
        request: &BatchRequest<StoreCategory>,
    ) -> SyncResult<BatchResponse> {
        Ok(StorefrontClient::batch_categories(self, request).await?)
    }

    async fn batch_products(
        &self,
        request: &BatchRequest<StoreProduct>,
    ) -> SyncResult<BatchResponse> {
        Ok(StorefrontClient::batch_products(self, request).await?)
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }
}
