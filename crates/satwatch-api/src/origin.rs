// ── Address normalization ──
//
// Turns the free-form `homepageUrl` a user typed into a config file into a
// fully qualified origin. Pure: no DNS, no I/O, recomputed on every poll.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::Error;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// URL scheme of a normalized origin. Always lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

/// Scheme, host, port, and path used to reach a device's homepage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOrigin {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
    #[serde(skip)]
    url: Url,
}

impl NormalizedOrigin {
    /// The full URL the prober requests.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the port equals the scheme default. An explicit `:443` on
    /// `https` is indistinguishable from no port at all.
    pub fn has_default_port(&self) -> bool {
        self.port == self.scheme.default_port()
    }
}

impl fmt::Display for NormalizedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}

/// Normalize a user-supplied address into a [`NormalizedOrigin`].
///
/// Inputs without an `http://` / `https://` prefix (matched
/// case-insensitively) are treated as plain HTTP. Missing ports default
/// by scheme; explicit ports are kept as given.
pub fn normalize(input: &str) -> Result<NormalizedOrigin, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "address is empty"));
    }

    let candidate = if has_prefix(trimmed, HTTP_PREFIX) || has_prefix(trimmed, HTTPS_PREFIX) {
        trimmed.to_owned()
    } else {
        format!("{HTTP_PREFIX}{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(input, &e.to_string()))?;

    let scheme = match url.scheme() {
        "http" => Scheme::Http,
        "https" => Scheme::Https,
        other => return Err(invalid(input, &format!("unsupported scheme '{other}'"))),
    };

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid(input, "missing host"))?
        .to_owned();

    let port = url.port().unwrap_or_else(|| scheme.default_port());

    let path = match url.path() {
        "" => "/".to_owned(),
        p => p.to_owned(),
    };

    Ok(NormalizedOrigin {
        scheme,
        host,
        port,
        path,
        url,
    })
}

fn has_prefix(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidAddress {
        input: input.to_owned(),
        reason: reason.to_owned(),
    }
}
