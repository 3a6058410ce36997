// ── Status resolution ──
//
// Normalize, probe, classify. `resolve_status` is the only entry point
// the scheduler uses; it never fails.

use std::future::Future;

use tracing::{error, warn};

use satwatch_api::{HttpProber, NormalizedOrigin};

use crate::error::CoreError;
use crate::model::SatelliteStatus;

/// Something that can check one origin.
///
/// `Err` means no HTTP response was obtained. Callers degrade it to
/// [`SatelliteStatus::NotConnected`].
pub trait Prober: Send + Sync + 'static {
    fn check(
        &self,
        origin: &NormalizedOrigin,
    ) -> impl Future<Output = Result<SatelliteStatus, CoreError>> + Send;
}

impl Prober for HttpProber {
    async fn check(&self, origin: &NormalizedOrigin) -> Result<SatelliteStatus, CoreError> {
        let response = self.probe(origin).await?;
        Ok(SatelliteStatus::from(response))
    }
}

/// Normalize `address` and probe it once.
pub async fn probe_address<P: Prober>(
    prober: &P,
    address: &str,
) -> Result<SatelliteStatus, CoreError> {
    let origin = satwatch_api::normalize(address)?;
    prober.check(&origin).await
}

/// Like [`probe_address`] but folds every failure into `NotConnected`.
///
/// Returns the error alongside so callers can record why.
pub async fn resolve_status<P: Prober>(
    prober: &P,
    device: &str,
    address: &str,
) -> (SatelliteStatus, Option<CoreError>) {
    match probe_address(prober, address).await {
        Ok(status) => (status, None),
        Err(e) => {
            if e.is_poll_failure() {
                warn!(device, url = address, error = %e, "probe failed, reporting not connected");
            } else {
                error!(device, url = address, error = %e, "prober misbehaved, reporting not connected");
            }
            (SatelliteStatus::NotConnected, Some(e))
        }
    }
}
