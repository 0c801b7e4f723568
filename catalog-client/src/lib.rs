//! Catalog Client - HTTP clients for the inventory source and the storefront
//!
//! Thin request/response wrappers. Retries and pacing are left to callers;
//! every non-2xx batch-level response surfaces as a [`ClientError`].

pub mod config;
pub mod error;
pub mod inventory;
pub mod storefront;

pub use config::{InventoryConfig, StorefrontConfig};
pub use error::{ClientError, ClientResult};
pub use inventory::InventoryClient;
pub use storefront::StorefrontClient;

// Re-export shared types for convenience
pub use shared::{BatchRequest, BatchResponse, ItemPage, SourceCategory, SourceProduct};
