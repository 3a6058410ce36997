//! `satwatch check`: one-off probes.

use futures_util::future::join_all;
use serde::Serialize;
use tabled::Tabled;

use satwatch_core::{DeviceStatusView, Prober, SatelliteStatus, normalize};

use crate::cli::{CheckArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Single address ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CheckResult {
    address: String,
    origin: String,
    status: SatelliteStatus,
}

fn detail(r: &CheckResult, color: bool) -> String {
    [
        format!("Address:  {}", r.address),
        format!("Origin:   {}", r.origin),
        format!("Status:   {}", output::status_label(Some(r.status), color)),
    ]
    .join("\n")
}

async fn check_address(address: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let prober = super::build_prober(&config)?;
    let origin = normalize(address).map_err(satwatch_core::CoreError::from)?;

    let status = prober.check(&origin).await?;
    let result = CheckResult {
        address: address.to_owned(),
        origin: origin.to_string(),
        status,
    };

    let color = output::should_color(global.color);
    let rendered = output::render_single(
        global.output,
        &result,
        |r| detail(r, color),
        |r| r.status.to_string(),
    )?;
    output::print_output(&rendered);

    if status.is_connected() {
        Ok(())
    } else {
        Err(CliError::NotConnected {
            url: origin.to_string(),
        })
    }
}

// ── Configured devices ──────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Error")]
    error: String,
}

fn row(view: &DeviceStatusView, color: bool) -> StatusRow {
    StatusRow {
        name: view.name.clone(),
        address: view.homepage_url.clone(),
        status: output::status_label(view.snapshot.status, color),
        error: view.snapshot.last_error.clone().unwrap_or_default(),
    }
}

async fn check_configured(global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let platform = super::build_platform(&config)?;
    let devices = config.device_configs();
    platform.sync(&devices);

    // Same path a host takes when a user opens the accessory.
    let accessories = platform.scheduler().handles();
    join_all(accessories.iter().map(|(_, a)| a.request_status())).await;

    let views = platform.statuses();
    platform.shutdown().await;

    let color = output::should_color(global.color);
    let rendered = output::render_list(
        global.output,
        &views,
        |v| row(v, color),
        |v| {
            format!(
                "{}\t{}",
                v.name,
                output::status_label(v.snapshot.status, false)
            )
        },
    )?;
    output::print_output(&rendered);
    Ok(())
}

pub async fn handle(args: &CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.url.as_deref() {
        Some(address) => check_address(address, global).await,
        None => check_configured(global).await,
    }
}
