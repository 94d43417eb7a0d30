//! OBD Capability Monitor - Main Entry Point

use obd_monitor::{init_logging, run, MonitorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== OBD Capability Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::from_env();
    info!(
        "Transport: {} ({} cycles every {}ms)",
        config.transport, config.cycles, config.interval_ms
    );

    run(config).await
}
