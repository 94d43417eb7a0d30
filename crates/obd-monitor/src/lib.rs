//! Monitoring Harness
//!
//! Wires a scanner session to a transport and streams batch cycles to
//! stdout: one JSON discovery summary, then one line per cycle.

use obd_scanner::Session;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

pub use config::MonitorConfig;

/// Initialize the global tracing subscriber
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the full monitor lifecycle against the configured transport
pub async fn run(config: MonitorConfig) -> anyhow::Result<()> {
    let mut session = Session::new(config.session());

    session.open().await?;
    session.initialize().await?;

    let summary = session.discover(config.budget()).await?;
    println!("{}", serde_json::to_string(&summary)?);

    let mut ticker = tokio::time::interval(Duration::from_millis(config.interval_ms));
    for cycle in 1..=config.cycles {
        ticker.tick().await;

        let batch = session.poll().await?;
        let line = if config.raw {
            session.raw(&batch)?
        } else {
            session.formatted(&batch)?
        };
        println!("{line}");
        info!("Cycle {}/{} complete", cycle, config.cycles);
    }

    session.close().await?;
    Ok(())
}
