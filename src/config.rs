//! Runtime configuration.

use std::net::IpAddr;
use std::time::Duration;

use camino::Utf8PathBuf;

use crate::builder::{SoaParameters, ZoneBuilder};
use crate::rr::TimeToLive;
use crate::source::JsonFileSource;
use crate::store::FileZoneStore;
use crate::update::ZoneUpdater;

/// Everything needed to run update cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address published for `ns.<parent>` in every zone.
    pub resolver: IpAddr,
    /// TTL of every generated record.
    pub ttl: TimeToLive,
    /// Directory holding one zone file per parent domain.
    pub zones_dir: Utf8PathBuf,
    /// JSON document listing the discovered domain records.
    pub domains_file: Utf8PathBuf,
    /// Pause between two update cycles.
    pub interval: Duration,
    /// Remove zone files of parent domains that are no longer discovered.
    pub prune: bool,
    pub soa: SoaParameters,
}

impl Config {
    pub const DEFAULT_ZONES_DIR: &'static str = "/zones";
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new(resolver: IpAddr, domains_file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            resolver,
            ttl: TimeToLive::DEFAULT,
            zones_dir: Self::DEFAULT_ZONES_DIR.into(),
            domains_file: domains_file.into(),
            interval: Self::DEFAULT_INTERVAL,
            prune: false,
            soa: SoaParameters::default(),
        }
    }

    pub fn zone_builder(&self) -> ZoneBuilder {
        ZoneBuilder::new(self.resolver, self.ttl).with_soa(self.soa)
    }

    pub fn zone_store(&self) -> FileZoneStore {
        FileZoneStore::new(self.zones_dir.clone())
    }

    pub fn domain_source(&self) -> JsonFileSource {
        JsonFileSource::new(self.domains_file.clone())
    }

    pub fn updater(&self) -> ZoneUpdater<FileZoneStore> {
        ZoneUpdater::new(self.zone_builder(), self.zone_store())
    }
}
