//! `satwatch run`: poll until interrupted.

use tracing::{info, warn};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let platform = super::build_platform(&config)?;

    let devices = config.device_configs();
    if devices.is_empty() {
        warn!("no devices configured, nothing to poll");
    }
    let report = platform.sync(&devices);
    info!(devices = report.kept + report.added, "polling started, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, stopping");
    platform.shutdown().await;
    Ok(())
}
