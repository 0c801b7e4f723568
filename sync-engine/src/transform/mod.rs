//! Field transformers
//!
//! Pure functions from inventory records to storefront payloads. Mapping
//! lookups happen in the engine; transformers only receive the ids.

pub mod category;
pub mod product;

pub use category::to_store_category;
pub use product::{ProductPayload, to_store_product};
