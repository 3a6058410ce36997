use std::fmt;

use serde::{Deserialize, Serialize};

const PREFIX: &str = "homepageUrl_";

/// Stable key correlating a configured device with persisted accessory state.
///
/// Built from the raw `homepageUrl` string exactly as configured: no
/// trimming, no case folding, no URL normalization. Two entries that
/// normalize to the same origin but are spelled differently are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn for_homepage_url(homepage_url: &str) -> Self {
        Self(format!("{PREFIX}{homepage_url}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
