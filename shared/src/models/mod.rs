//! Data models
//!
//! Source records as read from the inventory system, storefront payloads
//! as written to the destination catalog, and the id mappings that tie
//! the two together.

pub mod category;
pub mod mapping;
pub mod product;
pub mod storefront;

// Re-exports
pub use category::*;
pub use mapping::*;
pub use product::*;
pub use storefront::*;
