//! Storefront (destination catalog) client
//!
//! Only the batch endpoints are used. The storefront caps each batch at
//! [`MAX_BATCH_SIZE`] objects across create, update and delete.

use reqwest::Client;
use serde::Serialize;
use shared::{BatchRequest, BatchResponse, StoreCategory, StoreProduct};
use std::time::Duration;

use crate::{ClientError, ClientResult, StorefrontConfig};

/// Maximum objects per batch request accepted by the storefront
pub const MAX_BATCH_SIZE: usize = 100;

const REST_PREFIX: &str = "wp-json/wc/v3";

/// HTTP client for the storefront REST API
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    client: Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl StorefrontClient {
    /// Create a new storefront client from configuration
    pub fn new(config: &StorefrontConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, path.trim_start_matches('/'))
    }

    async fn post_batch<T: Serialize>(
        &self,
        path: &str,
        body: &BatchRequest<T>,
    ) -> ClientResult<BatchResponse> {
        let size = body.create.len() + body.update.len() + body.delete.len();
        if size > MAX_BATCH_SIZE {
            return Err(ClientError::Config(format!(
                "Batch of {size} objects exceeds the storefront limit of {MAX_BATCH_SIZE}"
            )));
        }

        let url = self.url(path);
        let mut request = self
            .client
            .post(&url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .json(body);
        if !body.delete.is_empty() {
            request = request.query(&[("force", "true")]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse {path} response: {e}"))
        })
    }

    /// Create, update or delete categories in one call
    pub async fn batch_categories(
        &self,
        request: &BatchRequest<StoreCategory>,
    ) -> ClientResult<BatchResponse> {
        tracing::debug!(
            create = request.create.len(),
            update = request.update.len(),
            delete = request.delete.len(),
            "Posting storefront category batch"
        );
        self.post_batch("products/categories/batch", request).await
    }

    /// Create, update or delete products in one call
    pub async fn batch_products(
        &self,
        request: &BatchRequest<StoreProduct>,
    ) -> ClientResult<BatchResponse> {
        tracing::debug!(
            create = request.create.len(),
            update = request.update.len(),
            delete = request.delete.len(),
            "Posting storefront product batch"
        );
        self.post_batch("products/batch", request).await
    }
}
