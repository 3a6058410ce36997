// ── Core error types ──
//
// Errors surfaced by satwatch-core. Transport details from satwatch-api
// are flattened into strings here so a scripted prober can produce the
// same variants a real one does.

use thiserror::Error;

use satwatch_api::ProbeErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Poll errors (degraded to NotConnected, never fatal) ──────────
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Probe of {url} failed ({kind}): {reason}")]
    Probe {
        url: String,
        kind: ProbeErrorKind,
        reason: String,
    },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Host framework error: {message}")]
    Host { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for errors produced by a single poll.
    pub fn is_poll_failure(&self) -> bool {
        matches!(self, Self::InvalidAddress { .. } | Self::Probe { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<satwatch_api::ProbeError> for CoreError {
    fn from(err: satwatch_api::ProbeError) -> Self {
        CoreError::Probe {
            url: err.url,
            kind: err.kind,
            reason: err.source.to_string(),
        }
    }
}

impl From<satwatch_api::Error> for CoreError {
    fn from(err: satwatch_api::Error) -> Self {
        match err {
            satwatch_api::Error::InvalidAddress { input, reason } => {
                CoreError::InvalidAddress { input, reason }
            }
            satwatch_api::Error::Probe(e) => CoreError::from(e),
            satwatch_api::Error::Client(message) => CoreError::Config { message },
        }
    }
}
