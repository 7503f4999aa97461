use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::driver::Driver;

pub async fn run(config: &Config) -> Result<()> {
    let interval = config.poll_interval()?;
    let mut driver = Driver::new();

    info!(
        interval = %config.poll_interval,
        mappings = config.mappings.len(),
        "watching for source changes"
    );

    loop {
        // A failed cycle is logged and retried next interval; the loop
        // itself keeps running.
        if let Err(e) = driver.run_cycle(config).await {
            warn!("cycle failed: {e:#}");
        }

        // Stop requests are honored between cycles; an in-flight cycle
        // always finishes first.
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}
