//! Shared types for the catalog sync workspace
//!
//! Data model used by both the HTTP clients and the sync engine:
//! inventory-side source records, storefront payloads, id mappings,
//! and the structured run summaries returned to callers.

pub mod models;
pub mod serde_helpers;
pub mod sync;

// Re-exports
pub use models::{
    BatchRequest, BatchResponse, BatchRow, BatchRowError, EntityKind, IdMapping, ItemPage, ROOT_SENTINEL,
    SourceCategory, SourceProduct, StoreCategory, StoreCategoryRef, StoreDimensions, StoreImage,
    StoreProduct,
};
pub use serde::{Deserialize, Serialize};
pub use sync::{FeedSummary, ResetSummary, SyncIssue, SyncSummary};
