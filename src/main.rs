//! Ledgerview main entry point

use clap::Parser;
use ledgerview_api::start_server;
use ledgerview_config::Config;
use ledgerview_core::{FixtureLedger, ViewCoordinator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerview")]
#[command(version = "0.1.0")]
#[command(about = "Browse a transaction ledger page by page or by employee", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Ledger JSON file, overrides data.path from the configuration
    #[arg(short, long)]
    data: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match Config::load(args.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e.into());
        }
    };
    if let Some(data) = args.data {
        config.data.path = data;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let rt = Runtime::new()?;
    rt.block_on(async {
        log::info!("Config loaded: data path={}", config.data.path.display());

        let ledger = FixtureLedger::load(config.data.path.clone(), config.pagination.page_size)
            .await?
            .with_latency(Duration::from_millis(config.backend.latency_ms));
        log::info!("Ledger loaded, page size {}", ledger.page_size());

        let coordinator = Arc::new(ViewCoordinator::from_backend(Arc::new(ledger)));
        start_server(config, coordinator).await?;
        Ok(())
    })
}
