//! `satwatch devices`: configured devices and their accessory identities.

use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use satwatch_core::{AccessoryHost, DeviceConfig, normalize};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::host::FileHost;
use crate::output;

#[derive(Debug, Serialize)]
struct DeviceListing {
    name: String,
    key: String,
    uuid: Uuid,
    homepage_url: String,
    /// Normalized origin, or why the address does not parse.
    origin: String,
    interval_ms: i64,
    #[serde(skip)]
    period: String,
    cached: bool,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Every")]
    period: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Cached")]
    cached: String,
}

fn listing(host: &FileHost, device: &DeviceConfig) -> DeviceListing {
    let key = device.identity_key();
    let uuid = host.generate_identity(key.as_str());
    let origin = normalize(&device.homepage_url)
        .map_or_else(|e| e.to_string(), |o| o.to_string());

    DeviceListing {
        name: device.name.clone(),
        key: key.to_string(),
        uuid,
        homepage_url: device.homepage_url.clone(),
        origin,
        interval_ms: device.polling_interval_ms(),
        period: humantime::format_duration(device.polling_period()).to_string(),
        cached: host.lookup_cached_accessory(&uuid).is_some(),
    }
}

fn row(d: &DeviceListing) -> DeviceRow {
    DeviceRow {
        name: d.name.clone(),
        origin: d.origin.clone(),
        period: d.period.clone(),
        uuid: d.uuid.to_string(),
        cached: if d.cached { "yes".into() } else { "no".into() },
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let host = FileHost::open(config.cache_path())?;

    let listings: Vec<DeviceListing> = config
        .device_configs()
        .iter()
        .map(|d| listing(&host, d))
        .collect();

    let rendered = output::render_list(global.output, &listings, row, |d| d.key.clone())?;
    output::print_output(&rendered);
    Ok(())
}
