//! Network edge of satwatch: address normalization and reachability probing.
//!
//! - [`normalize`] turns a configured `homepageUrl` into a
//!   [`NormalizedOrigin`] (scheme, host, port, path).
//! - [`HttpProber`] performs one timeout-bounded GET against an origin,
//!   ignoring certificate trust, and reports the HTTP status it saw.
//!
//! Everything above the wire (status semantics, scheduling, registry
//! bookkeeping) lives in `satwatch-core`.

pub mod error;
pub mod origin;
pub mod probe;
pub mod transport;

pub use error::{Error, ProbeError, ProbeErrorKind};
pub use origin::{NormalizedOrigin, Scheme, normalize};
pub use probe::{HttpProber, ProbeResponse, is_up};
pub use transport::TransportConfig;
