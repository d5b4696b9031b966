use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::codec::CodecError;
use crate::error::PersistenceError;
use crate::rr::{LowerName, Name, Zone};

use super::ZoneStore;

/// Zone store backed by a map in memory.
#[derive(Debug, Default)]
pub struct MemoryZoneStore {
    zones: Mutex<BTreeMap<LowerName, Zone>>,
}

impl MemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with previously persisted zones.
    pub fn with_zones(zones: impl IntoIterator<Item = Zone>) -> Self {
        let zones = zones
            .into_iter()
            .map(|zone| (LowerName::from(zone.origin()), zone))
            .collect();
        Self {
            zones: Mutex::new(zones),
        }
    }

    /// The zone currently stored for `origin`.
    pub fn get(&self, origin: &Name) -> Option<Zone> {
        let data = self.zones.lock().expect("poisoned");
        data.get(&LowerName::from(origin)).cloned()
    }

    pub fn origins(&self) -> Vec<Name> {
        let data = self.zones.lock().expect("poisoned");
        data.values().map(|zone| zone.origin().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.zones.lock().expect("poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ZoneStore for MemoryZoneStore {
    fn load(&self, origin: &Name) -> Result<Option<Zone>, CodecError> {
        Ok(self.get(origin))
    }

    #[tracing::instrument(skip_all, fields(zone = %zone.origin()), level = "trace")]
    fn save(&self, zone: &Zone) -> Result<(), PersistenceError> {
        let mut data = self.zones.lock().expect("poisoned");
        data.insert(LowerName::from(zone.origin()), zone.clone());
        Ok(())
    }

    fn prune(&self, active: &BTreeSet<LowerName>) -> Result<Vec<Name>, PersistenceError> {
        let mut data = self.zones.lock().expect("poisoned");
        let stale: Vec<LowerName> = data
            .keys()
            .filter(|origin| !active.contains(*origin))
            .cloned()
            .collect();

        Ok(stale
            .into_iter()
            .filter_map(|origin| data.remove(&origin))
            .map(|zone| zone.origin().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use crate::builder::ZoneBuilder;
    use crate::rr::TimeToLive;

    use super::*;

    fn zone(parent: &str) -> Zone {
        ZoneBuilder::new(IpAddr::V4(Ipv4Addr::LOCALHOST), TimeToLive::DEFAULT)
            .build(parent, &[], None)
            .unwrap()
    }

    #[test]
    fn save_replaces_previous() {
        let store = MemoryZoneStore::new();
        let first = zone("app.local");
        store.save(&first).unwrap();

        let origin = first.origin().clone();
        let second = ZoneBuilder::new(IpAddr::V4(Ipv4Addr::LOCALHOST), TimeToLive::DEFAULT)
            .build("app.local", &[], Some(first.serial()))
            .unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&origin).unwrap().serial().get(), 2);
    }

    #[test]
    fn load_missing_is_none() {
        let store = MemoryZoneStore::new();
        let origin = Name::from_utf8("app.local.").unwrap();
        assert!(store.load(&origin).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn prune_keeps_active() {
        let store = MemoryZoneStore::with_zones([zone("a.local"), zone("b.local")]);
        let active = BTreeSet::from([LowerName::from(&Name::from_utf8("a.local.").unwrap())]);

        let removed = store.prune(&active).unwrap();
        assert_eq!(removed, [Name::from_utf8("b.local.").unwrap()]);
        assert_eq!(store.origins(), [Name::from_utf8("a.local.").unwrap()]);
    }
}
