//! Inventory (source catalog) client

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shared::{ItemPage, SourceCategory, SourceProduct};
use std::time::Duration;

use crate::{ClientError, ClientResult, InventoryConfig};

#[derive(Debug, Deserialize)]
struct CategoryListResponse {
    #[serde(default)]
    category_list: Vec<SourceCategory>,
}

#[derive(Debug, Deserialize)]
struct ItemInfoResponse {
    #[serde(default)]
    items: Vec<SourceProduct>,
    #[serde(default, alias = "last_update_seq")]
    update_seq: Option<u64>,
}

impl ItemInfoResponse {
    /// Resolve the cursor for the next pull
    ///
    /// Prefers the page-level sequence, then the highest item sequence,
    /// and otherwise stays where the pull started.
    fn into_page(self, cursor: u64) -> ItemPage {
        let next_cursor = self
            .update_seq
            .or_else(|| self.items.iter().filter_map(SourceProduct::update_seq).max())
            .unwrap_or(cursor)
            .max(cursor);
        ItemPage {
            items: self.items,
            next_cursor,
        }
    }
}

/// HTTP client for the inventory API
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl InventoryClient {
    /// Create a new inventory client from configuration
    pub fn new(config: &InventoryConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .query(&[("token", self.auth_token.as_str())])
            .send()
            .await?;

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

    /// Fetch the full category list
    pub async fn get_category_list(&self) -> ClientResult<Vec<SourceCategory>> {
        tracing::debug!("Fetching inventory category list");
        let response: CategoryListResponse = self.get("item_category_list/").await?;
        tracing::info!(count = response.category_list.len(), "Received inventory category list");
        Ok(response.category_list)
    }

    /// Fetch every item changed since `cursor`
    pub async fn items_since(&self, cursor: u64) -> ClientResult<ItemPage> {
        tracing::debug!(cursor, "Fetching inventory items");
        let response: ItemInfoResponse = self.get(&format!("item_info_since/{cursor}")).await?;
        let page = response.into_page(cursor);
        tracing::info!(
            cursor,
            next_cursor = page.next_cursor,
            count = page.items.len(),
            "Received inventory items"
        );
        Ok(page)
    }
}
