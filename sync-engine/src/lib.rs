//! Catalog sync engine
//!
//! Synchronizes a hierarchical inventory catalog (categories and items) into
//! a storefront, keeping a durable source id → destination id mapping so
//! reruns are idempotent and incremental.
//!
//! # Module structure
//!
//! ```text
//! sync-engine/src/
//! ├── core/        # configuration, errors
//! ├── db/          # redb mapping store, cursors, item queue
//! ├── sync/        # resolver, batch gate, leveled creator, flows, service
//! ├── transform/   # inventory record → storefront payload
//! ├── utils/       # logging
//! └── cli.rs       # catalog-sync command line
//! ```

pub mod cli;
pub mod core;
pub mod db;
pub mod sync;
pub mod transform;
pub mod utils;

// Re-export public types
pub use self::core::{Config, SyncError, SyncLimits, SyncResult};
pub use db::SyncStorage;
pub use sync::{RunReport, SyncService};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

/// Prepare the process: work directory and logging
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )?;
    Ok(())
}
