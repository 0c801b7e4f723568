use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::SyncLimits;

/// Command line interface of the `catalog-sync` binary
///
/// Endpoints, credentials and default limits come from the environment
/// (see [`crate::Config`]); flags only override limits for one invocation.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(
    version,
    about = "Sync inventory categories and items into a storefront catalog"
)]
#[command(after_help = "Examples:
  catalog-sync categories --max-total 500
  catalog-sync feed
  catalog-sync products                      # drain the item queue
  catalog-sync products --input items.json   # sync a message batch from a file
  catalog-sync run
  catalog-sync reset --yes")]
pub struct Cli {
    /// Directory holding the mapping database (overrides WORK_DIR)
    #[arg(long, global = true, value_name = "PATH")]
    pub work_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Per-invocation batch limits
#[derive(Args, Debug, Clone, Default)]
pub struct LimitArgs {
    /// Records per batch
    #[arg(long, value_name = "N")]
    pub max_batch: Option<usize>,

    /// Records per run; the rest wait for the next run
    #[arg(long, value_name = "N")]
    pub max_total: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create missing categories, parents before children
    Categories {
        #[command(flatten)]
        limits: LimitArgs,

        /// Dependency levels per batch
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,
    },
    /// Create or update products from a message file or the item queue
    Products {
        #[command(flatten)]
        limits: LimitArgs,

        /// JSON array of inventory items; the queue is drained when absent
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Pull changed items from the inventory into the item queue
    Feed {
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Feed, categories, then products
    Run,
    /// Delete every synced product and category and forget all mappings
    Reset {
        /// Confirm the destructive reset
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    /// Apply this command's flag overrides to the configured limits
    pub fn limits(&self, base: SyncLimits) -> SyncLimits {
        let mut limits = base;
        match self {
            Command::Categories { limits: args, max_depth } => {
                if let Some(n) = args.max_batch {
                    limits.max_batch_categories = n;
                }
                if let Some(n) = args.max_total {
                    limits.max_total_categories = n;
                }
                if let Some(n) = max_depth {
                    limits.max_category_depth = *n;
                }
            }
            Command::Products { limits: args, .. } | Command::Feed { limits: args } => {
                if let Some(n) = args.max_batch {
                    limits.max_batch_items = n;
                }
                if let Some(n) = args.max_total {
                    limits.max_total_items = n;
                }
            }
            Command::Run | Command::Reset { .. } => {}
        }
        limits
    }
}
