// ── Device registry reconciliation ──
//
// Diffs the configured device list against the accessories the host
// already knows about. Pure: applying the plan is the platform's job.

use std::collections::{HashMap, HashSet};

use tracing::warn;
use uuid::Uuid;

use crate::model::{DeviceConfig, IdentityKey};

/// A configured device paired with its identity.
#[derive(Debug, Clone)]
pub struct PlannedDevice {
    pub device: DeviceConfig,
    pub key: IdentityKey,
    pub uuid: Uuid,
}

/// Outcome of one reconciliation pass.
///
/// `keep` and `add` preserve configuration order. No UUID appears in
/// more than one list.
#[derive(Debug)]
pub struct Reconciliation<H> {
    pub keep: Vec<(PlannedDevice, H)>,
    pub add: Vec<PlannedDevice>,
    pub remove: Vec<(Uuid, H)>,
}

impl<H> Reconciliation<H> {
    pub fn is_noop(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Compute keep / add / remove sets.
///
/// `identity` maps an identity key to the host UUID for it; it must be
/// deterministic. A device whose `homepageUrl` repeats an earlier entry
/// is skipped so each key yields exactly one accessory.
pub fn reconcile<H: Clone>(
    configured: &[DeviceConfig],
    known: &HashMap<Uuid, H>,
    identity: impl Fn(&IdentityKey) -> Uuid,
) -> Reconciliation<H> {
    let mut keep = Vec::new();
    let mut add = Vec::new();
    let mut wanted: HashSet<Uuid> = HashSet::with_capacity(configured.len());

    for device in configured {
        let key = device.identity_key();
        let uuid = identity(&key);
        if !wanted.insert(uuid) {
            warn!(device = %device.name, %key, "duplicate homepageUrl in configuration, skipping");
            continue;
        }

        let planned = PlannedDevice {
            device: device.clone(),
            key,
            uuid,
        };
        match known.get(&uuid) {
            Some(handle) => keep.push((planned, handle.clone())),
            None => add.push(planned),
        }
    }

    let remove = known
        .iter()
        .filter(|(uuid, _)| !wanted.contains(uuid))
        .map(|(uuid, handle)| (*uuid, handle.clone()))
        .collect();

    Reconciliation { keep, add, remove }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Identity used by the tests: the key's bytes hashed into a v5 UUID.
    fn identity(key: &IdentityKey) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_str().as_bytes())
    }

    fn device(url: &str) -> DeviceConfig {
        DeviceConfig::new(format!("router {url}"), url)
    }

    fn known(urls: &[&str]) -> HashMap<Uuid, String> {
        urls.iter()
            .map(|url| (identity(&IdentityKey::for_homepage_url(url)), (*url).to_owned()))
            .collect()
    }

    fn urls(planned: &[PlannedDevice]) -> Vec<&str> {
        planned.iter().map(|p| p.device.homepage_url.as_str()).collect()
    }

    #[test]
    fn new_device_is_added_and_known_is_kept() {
        let plan = reconcile(&[device("A"), device("B")], &known(&["A"]), identity);

        assert_eq!(plan.keep.len(), 1);
        assert_eq!(plan.keep[0].1, "A");
        assert_eq!(urls(&plan.add), vec!["B"]);
        assert!(plan.remove.is_empty());
    }

    #[test]
    fn missing_device_is_removed() {
        let plan = reconcile(&[device("B")], &known(&["A", "B"]), identity);

        assert_eq!(plan.keep.len(), 1);
        assert_eq!(plan.keep[0].1, "B");
        assert!(plan.add.is_empty());
        let removed: Vec<&str> = plan.remove.iter().map(|(_, h)| h.as_str()).collect();
        assert_eq!(removed, vec!["A"]);
    }

    #[test]
    fn add_preserves_configuration_order() {
        let configured = [device("C"), device("A"), device("B")];
        let plan = reconcile(&configured, &known(&[]), identity);

        assert_eq!(urls(&plan.add), vec!["C", "A", "B"]);
        assert!(!plan.is_noop());
    }

    #[test]
    fn duplicate_urls_produce_one_entry() {
        let configured = [device("A"), DeviceConfig::new("other name", "A")];
        let plan = reconcile(&configured, &known(&[]), identity);

        assert_eq!(plan.add.len(), 1);
        assert_eq!(plan.add[0].device.name, "router A");
    }

    #[test]
    fn same_name_distinct_urls_are_distinct_accessories() {
        let configured = [
            DeviceConfig::new("Router", "10.0.0.1"),
            DeviceConfig::new("Router", "10.0.0.2"),
        ];
        let plan = reconcile(&configured, &known(&[]), identity);

        assert_eq!(plan.add.len(), 2);
        assert_ne!(plan.add[0].uuid, plan.add[1].uuid);
    }

    #[test]
    fn unchanged_configuration_is_noop() {
        let plan = reconcile(&[device("A"), device("B")], &known(&["A", "B"]), identity);
        assert!(plan.is_noop());
        assert_eq!(plan.keep.len(), 2);
    }

    #[test]
    fn empty_configuration_removes_everything() {
        let plan = reconcile(&[], &known(&["A", "B"]), identity);
        assert_eq!(plan.remove.len(), 2);
        assert!(plan.keep.is_empty());
    }
}
