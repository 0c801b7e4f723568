//! Core module - configuration and errors
//!
//! - [`Config`] - runtime configuration loaded from the environment
//! - [`SyncLimits`] - batch, total and depth limits for one run
//! - [`SyncError`] - errors that abort a run

pub mod config;
pub mod error;

pub use config::{Config, SyncLimits};
pub use error::{SyncError, SyncResult};
