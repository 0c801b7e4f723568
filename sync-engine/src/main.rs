use catalog_client::{InventoryClient, StorefrontClient};
use clap::Parser;
use serde::Serialize;
use shared::SourceProduct;
use std::path::Path;
use std::sync::Arc;
use sync_engine::cli::{Cli, Command};
use sync_engine::{Config, SyncService, SyncStorage, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = &cli.work_dir {
        config.work_dir = dir.clone();
    }
    setup_environment(&config)?;
    config.validate()?;

    let limits = cli.command.limits(config.limits);
    limits.validate()?;
    tracing::info!(?limits, work_dir = %config.work_dir.display(), "catalog-sync starting");

    let storage = Arc::new(SyncStorage::open(config.database_path())?);
    let source = Arc::new(InventoryClient::new(&config.inventory())?);
    let destination = Arc::new(StorefrontClient::new(&config.storefront())?);
    let service = SyncService::new(source, destination, storage, limits);

    if let Err(e) = execute(&service, &cli.command).await {
        tracing::error!("catalog-sync failed: {e}");
        return Err(e);
    }
    Ok(())
}

async fn execute(service: &SyncService, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Categories { .. } => print_json(&service.sync_categories().await?),
        Command::Products { input: Some(path), .. } => {
            let items = read_items(path)?;
            print_json(&service.sync_products(items).await?)
        }
        Command::Products { input: None, .. } => print_json(&service.drain_queue().await?),
        Command::Feed { .. } => print_json(&service.run_feed().await?),
        Command::Run => print_json(&service.run().await?),
        Command::Reset { yes: false } => {
            anyhow::bail!("reset deletes every synced product and category; pass --yes to confirm")
        }
        Command::Reset { yes: true } => print_json(&service.reset().await?),
    }
}

fn read_items(path: &Path) -> anyhow::Result<Vec<SourceProduct>> {
    let bytes = std::fs::read(path)?;
    let items: Vec<SourceProduct> = serde_json::from_slice(&bytes)?;
    tracing::info!(count = items.len(), path = %path.display(), "Loaded message batch");
    Ok(items)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
