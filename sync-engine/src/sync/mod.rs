//! Sync engine
//!
//! - [`ancestry`] - ancestor-chain resolution for category batches
//! - [`batch`] - the batch gate (truncate, then chunk)
//! - [`leveled`] - level-by-level category creation
//! - [`category`] / [`product`] - the two sync flows
//! - [`feed`] / [`reset`] - item feed and destructive reset
//! - [`service`] - [`SyncService`], the orchestrator
//! - [`traits`] - collaborator interfaces; [`remote`] implements them over HTTP

pub mod ancestry;
pub mod batch;
pub mod category;
pub mod correlate;
pub mod feed;
pub mod leveled;
pub mod product;
pub mod remote;
pub mod reset;
pub mod service;
pub mod traits;

pub use ancestry::{AncestorChains, CategoryIndex, MAX_ANCESTOR_DEPTH, resolve_ancestor_chain};
pub use batch::{Chunks, chunk};
pub use feed::{ITEM_CURSOR, ProductFeed};
pub use leveled::{LeveledCreator, RunLedger};
pub use service::{RunReport, SyncService};
pub use traits::{
    CatalogDestination, CatalogSource, CursorStore, ItemQueue, MappingConflict, MappingStore,
    QueuedItem, RecordOutcome,
};
