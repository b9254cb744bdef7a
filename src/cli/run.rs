//! Run command implementation

use crate::config::{Config, OperatingMode};
use crate::execution::ExecutionEngine;
use crate::feed::FeedClient;
use crate::pipeline::Orchestrator;
use crate::storage::InMemoryStore;
use crate::strategy::FixedPriceOracle;
use anyhow::Context;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured operating mode
    #[arg(short, long, value_enum)]
    pub mode: Option<OperatingMode>,
}

impl RunArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        tracing::info!(mode = %config.mode, feed = %config.feed.url, "Starting pipeline");

        let engine = ExecutionEngine::for_mode(config.mode, &config.broker)
            .await
            .with_context(|| format!("Failed to initialize broker '{}'", config.broker.name))?;

        let feed = FeedClient::new(config.feed.clone())?;
        if !feed.check_robots_txt().await {
            tracing::warn!("Continuing despite robots.txt disallow; poll responsibly");
        }

        let store = Arc::new(InMemoryStore::new());
        let oracle = Arc::new(FixedPriceOracle::new(config.strategy.default_entry_price));
        let mut orchestrator = Orchestrator::new(&config, feed, store, oracle, engine);

        let stop = orchestrator.stop_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested");
                stop.stop();
            }
        });

        orchestrator.run().await;
        Ok(())
    }
}
