use std::fmt;

use thiserror::Error;

/// Top-level error type for the `satwatch-api` crate.
///
/// Two failure classes matter to callers: the address could not be turned
/// into an origin, or the probe never got an HTTP response back.
/// `satwatch-core` degrades both to a `NotConnected` status.
#[derive(Debug, Error)]
pub enum Error {
    // ── Address ─────────────────────────────────────────────────────
    /// The configured address is empty or not parseable as a URL.
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// No HTTP response was received (DNS, connect, TLS, timeout).
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The HTTP client itself could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProbeErrorKind {
    /// The request did not complete within the probe timeout.
    Timeout,
    /// DNS resolution, TCP connect, or TLS handshake failed.
    Connect,
    /// Anything else the transport reported before a status line arrived.
    Request,
}

/// A probe that ended without an HTTP response.
#[derive(Debug, Error)]
pub struct ProbeError {
    pub url: String,
    pub kind: ProbeErrorKind,
    #[source]
    pub source: reqwest::Error,
}

impl ProbeError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            ProbeErrorKind::Timeout
        } else if source.is_connect() {
            ProbeErrorKind::Connect
        } else {
            ProbeErrorKind::Request
        };
        Self {
            url: url.to_owned(),
            kind,
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ProbeErrorKind::Timeout
    }

    pub fn is_connect(&self) -> bool {
        self.kind == ProbeErrorKind::Connect
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Probe of {} failed ({}): {}", self.url, self.kind, self.source)
    }
}
