use anyhow::{Context, Result};
use chatcore::{BrokerConfig, BROKER_CONFIG};
use clap::Parser;
use tracing::{info, warn};

use crate::host::params::Params;

mod host;

#[tokio::main]
async fn main() -> Result<()> {
    let params = Params::parse();

    tracing_subscriber::fmt()
        .with_max_level(params.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .compact()
        .init();

    let config = BrokerConfig::load_or_default(params.config.as_ref())
        .context("loading broker config")?;
    info!("chatcore starting with config: {:?}", config);
    if BROKER_CONFIG.set(config).is_err() {
        warn!("broker config was already set, keeping the existing one");
    }

    host::run(params).await
}
