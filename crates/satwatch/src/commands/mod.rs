//! Command handlers: bridge CLI args -> core platform -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod devices;
pub mod run;

use satwatch_config::Config;
use satwatch_core::{CoreError, HttpProber, Platform};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::host::FileHost;

pub type AppPlatform = Platform<FileHost, HttpProber>;

/// Load and validate configuration from `--config` or the default path.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(satwatch_config::load_config(global.config.as_deref())?)
}

pub fn build_prober(config: &Config) -> Result<HttpProber, CliError> {
    HttpProber::new(&config.probe.transport())
        .map_err(|e| CliError::from(CoreError::from(e)))
}

/// Wire the file host and HTTP prober into a platform.
pub fn build_platform(config: &Config) -> Result<AppPlatform, CliError> {
    let host = FileHost::open(config.cache_path())?;
    tracing::debug!(cache = %host.path().display(), "accessory host ready");
    Ok(Platform::new(host, build_prober(config)?))
}
