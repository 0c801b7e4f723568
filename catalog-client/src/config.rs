//! Client configuration

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for the inventory (source) API
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// API base URL (e.g., "https://inventory.example.com/api")
    pub base_url: String,

    /// Token sent as the `token` query parameter on every call
    pub auth_token: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl InventoryConfig {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Connection settings for the storefront (destination) REST API
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Site URL (e.g., "https://shop.example.com"); the REST prefix is appended
    pub base_url: String,

    /// REST consumer key, used as the basic-auth user
    pub consumer_key: String,

    /// REST consumer secret, used as the basic-auth password
    pub consumer_secret: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl StorefrontConfig {
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
