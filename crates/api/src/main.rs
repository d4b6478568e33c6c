//! House Price Estimator - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_logging(&settings.logging);

    info!("=== House Price Estimator v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Model: {} ({:?}, {:?})",
        settings.model.path.display(),
        settings.model.format,
        settings.model.policy
    );

    run_server(settings).await
}
