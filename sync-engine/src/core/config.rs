use catalog_client::{InventoryConfig, StorefrontConfig};
use std::path::PathBuf;
use std::str::FromStr;

use super::error::{SyncError, SyncResult};

/// Default number of dependency levels the category creator will run
pub const DEFAULT_MAX_CATEGORY_DEPTH: usize = 10;

/// Batch/total/depth limits applied to one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncLimits {
    /// Categories per processing batch
    pub max_batch_categories: usize,
    /// Categories considered per run; the rest wait for the next run
    pub max_total_categories: usize,
    /// Items per processing batch
    pub max_batch_items: usize,
    /// Items considered per run
    pub max_total_items: usize,
    /// Dependency levels per category batch
    pub max_category_depth: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            max_batch_categories: 100,
            max_total_categories: 10_000,
            max_batch_items: 100,
            max_total_items: 1_000,
            max_category_depth: DEFAULT_MAX_CATEGORY_DEPTH,
        }
    }
}

impl SyncLimits {
    /// Reject limits that would make a run do nothing
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_batch_categories == 0 || self.max_batch_items == 0 {
            return Err(SyncError::config("batch sizes must be greater than zero"));
        }
        if self.max_category_depth == 0 {
            return Err(SyncError::config("category depth must be greater than zero"));
        }
        Ok(())
    }
}

/// Runtime configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | Holds the mapping database |
/// | INVENTORY_BASE_URL | - | Inventory API base URL |
/// | INVENTORY_AUTH_TOKEN | - | Inventory API token |
/// | STOREFRONT_BASE_URL | - | Storefront site URL |
/// | STOREFRONT_CONSUMER_KEY | - | Storefront REST key |
/// | STOREFRONT_CONSUMER_SECRET | - | Storefront REST secret |
/// | MAX_BATCH_CATEGORIES | 100 | Categories per batch |
/// | MAX_TOTAL_CATEGORIES | 10000 | Categories per run |
/// | MAX_BATCH_ITEMS | 100 | Items per batch |
/// | MAX_TOTAL_ITEMS | 1000 | Items per run |
/// | MAX_CATEGORY_DEPTH | 10 | Dependency levels per batch |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP timeout |
/// | LOG_LEVEL | info | Log level |
/// | LOG_JSON | false | JSON log output |
/// | LOG_DIR | - | Directory for rolling log files |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/sync MAX_TOTAL_ITEMS=500 catalog-sync products
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub inventory_base_url: String,
    pub inventory_auth_token: String,
    pub storefront_base_url: String,
    pub storefront_consumer_key: String,
    pub storefront_consumer_secret: String,
    pub limits: SyncLimits,
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SyncLimits::default();

        Self {
            work_dir: lookup("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./work_dir")),
            inventory_base_url: lookup("INVENTORY_BASE_URL").unwrap_or_default(),
            inventory_auth_token: lookup("INVENTORY_AUTH_TOKEN").unwrap_or_default(),
            storefront_base_url: lookup("STOREFRONT_BASE_URL").unwrap_or_default(),
            storefront_consumer_key: lookup("STOREFRONT_CONSUMER_KEY").unwrap_or_default(),
            storefront_consumer_secret: lookup("STOREFRONT_CONSUMER_SECRET").unwrap_or_default(),
            limits: SyncLimits {
                max_batch_categories: parse_var(&lookup, "MAX_BATCH_CATEGORIES")
                    .unwrap_or(defaults.max_batch_categories),
                max_total_categories: parse_var(&lookup, "MAX_TOTAL_CATEGORIES")
                    .unwrap_or(defaults.max_total_categories),
                max_batch_items: parse_var(&lookup, "MAX_BATCH_ITEMS").unwrap_or(defaults.max_batch_items),
                max_total_items: parse_var(&lookup, "MAX_TOTAL_ITEMS").unwrap_or(defaults.max_total_items),
                max_category_depth: parse_var(&lookup, "MAX_CATEGORY_DEPTH")
                    .unwrap_or(defaults.max_category_depth),
            },
            request_timeout_ms: parse_var(&lookup, "REQUEST_TIMEOUT_MS").unwrap_or(30_000),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse_var(&lookup, "LOG_JSON").unwrap_or(false),
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
        }
    }

    /// Check that endpoints, credentials and limits are usable
    pub fn validate(&self) -> SyncResult<()> {
        let required = [
            ("INVENTORY_BASE_URL", &self.inventory_base_url),
            ("INVENTORY_AUTH_TOKEN", &self.inventory_auth_token),
            ("STOREFRONT_BASE_URL", &self.storefront_base_url),
            ("STOREFRONT_CONSUMER_KEY", &self.storefront_consumer_key),
            ("STOREFRONT_CONSUMER_SECRET", &self.storefront_consumer_secret),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(SyncError::config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        self.limits.validate()
    }

    /// Path of the embedded mapping database
    pub fn database_path(&self) -> PathBuf {
        self.work_dir.join("mappings.redb")
    }

    pub fn inventory(&self) -> InventoryConfig {
        InventoryConfig::new(&self.inventory_base_url, &self.inventory_auth_token)
            .with_timeout_ms(self.request_timeout_ms)
    }

    pub fn storefront(&self) -> StorefrontConfig {
        StorefrontConfig::new(
            &self.storefront_base_url,
            &self.storefront_consumer_key,
            &self.storefront_consumer_secret,
        )
        .with_timeout_ms(self.request_timeout_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
