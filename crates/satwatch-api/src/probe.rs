// ── Reachability probe ──
//
// One bounded HTTP GET per call. A response of any kind means the
// transport worked; the status code decides up or down. No retries.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{Error, ProbeError};
use crate::origin::NormalizedOrigin;
use crate::transport::TransportConfig;

/// Status codes in `[100, 400)` mean the device is up. Everything else,
/// including the whole 4xx/5xx range, means down.
pub fn is_up(status: u16) -> bool {
    (100..400).contains(&status)
}

/// What came back from a probe that reached the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub elapsed: Duration,
}

impl ProbeResponse {
    pub fn is_up(&self) -> bool {
        is_up(self.status)
    }
}

/// HTTP(S) prober. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpProber {
    http: reqwest::Client,
}

impl HttpProber {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Issue a single GET against `origin`.
    ///
    /// Returns `Ok` for any HTTP response, whatever its status, and
    /// [`ProbeError`] when no response arrived.
    pub async fn probe(&self, origin: &NormalizedOrigin) -> Result<ProbeResponse, ProbeError> {
        let url = origin.url().as_str();
        let started = Instant::now();

        let response = self
            .http
            .get(origin.url().clone())
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        let probe = ProbeResponse {
            status: response.status().as_u16(),
            elapsed: started.elapsed(),
        };
        trace!(url, status = probe.status, elapsed_ms = probe.elapsed.as_millis(), "probe response");
        Ok(probe)
    }
}
