//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use satwatch_config::ConfigError;
use satwatch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Reachability ─────────────────────────────────────────────────
    #[error("{url} is not connected")]
    #[diagnostic(
        code(satwatch::not_connected),
        help("The device answered with an error status (400 or above).")
    )]
    NotConnected { url: String },

    #[error("Could not reach {url}: {reason}")]
    #[diagnostic(
        code(satwatch::probe_failed),
        help(
            "Check that the device is powered on and reachable from this host.\n\
             Raise [probe] timeout_ms if it is slow to answer."
        )
    )]
    ProbeFailed { url: String, reason: String },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid address '{input}': {reason}")]
    #[diagnostic(
        code(satwatch::invalid_address),
        help("Use a host or IP, optionally with http:// or https:// and a port.")
    )]
    InvalidAddress { input: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(satwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(satwatch::config),
        help("Check the config file syntax, or run: satwatch config path")
    )]
    Config(Box<figment::Error>),

    #[error("Failed to render configuration: {0}")]
    #[diagnostic(code(satwatch::toml))]
    Toml(#[from] toml::ser::Error),

    // ── Host ─────────────────────────────────────────────────────────
    #[error("Accessory host error: {message}")]
    #[diagnostic(code(satwatch::host))]
    Host { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(satwatch::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConnected { .. } | Self::ProbeFailed { .. } => exit_code::CONNECTION,
            Self::InvalidAddress { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAddress { input, reason } => {
                CliError::InvalidAddress { input, reason }
            }
            CoreError::Probe { url, kind, reason } => CliError::ProbeFailed {
                url,
                reason: format!("{kind}: {reason}"),
            },
            CoreError::Host { message } => CliError::Host { message },
            CoreError::Config { message } => CliError::Validation {
                field: "probe".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Toml(e),
        }
    }
}
