use std::collections::BTreeMap;

use hickory_proto::rr::{LowerName, RData, RecordType, RrKey, rdata};

use super::{
    Name, Record, SerialNumber, TimeToLive,
    rset::{Mismatch, RecordSet},
};

/// A complete, immutable snapshot of one authoritative zone.
///
/// A zone always holds exactly one SOA record at its origin. It carries no
/// notion of where it is stored; that belongs to a [`ZoneStore`](crate::store::ZoneStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    origin: Name,
    soa: Record<rdata::SOA>,
    records: BTreeMap<RrKey, RecordSet>,
}

impl Zone {
    /// Create a zone containing only its SOA record.
    pub(crate) fn new(origin: Name, soa: Record<rdata::SOA>) -> Self {
        Self {
            origin,
            soa,
            records: BTreeMap::new(),
        }
    }

    /// Assemble a zone from parsed record sets.
    ///
    /// The SOA record set at the origin becomes the zone's SOA; any others are
    /// ignored. Fails if there is no SOA at the origin.
    pub(crate) fn from_rrsets(
        origin: Name,
        rrsets: impl IntoIterator<Item = RecordSet>,
    ) -> Result<Self, MissingSoa> {
        let apex = LowerName::from(&origin);
        let mut soa = None;
        let mut records = BTreeMap::new();

        for rrset in rrsets {
            if rrset.record_type() == RecordType::SOA {
                if LowerName::from(rrset.name()) == apex && soa.is_none() {
                    soa = rrset.records().find_map(|record| {
                        record.rdata().as_soa().map(|data| {
                            Record::from_rdata(record.name().clone(), record.ttl(), data.clone())
                        })
                    });
                } else {
                    tracing::debug!("ignoring extra SOA at {}", rrset.name());
                }
                continue;
            }
            records.insert(rrset.rrkey(), rrset);
        }

        let soa = soa.ok_or_else(|| MissingSoa(origin.clone()))?;
        Ok(Self {
            origin,
            soa,
            records,
        })
    }

    /// Replace the TTL of the SOA record.
    pub(crate) fn with_soa_ttl(mut self, ttl: TimeToLive) -> Self {
        self.soa = Record::from_rdata(self.soa.name().clone(), ttl, self.soa.rdata().clone());
        self
    }

    pub(crate) fn insert(&mut self, record: Record) -> Result<bool, Mismatch> {
        if record.record_type() == RecordType::SOA {
            return Err(Mismatch("SOA"));
        }

        self.records
            .entry(record.rrkey())
            .or_insert_with(|| RecordSet::new(record.name().clone(), record.record_type()))
            .insert(record)
    }
}

impl Zone {
    /// The fully qualified origin of this zone.
    pub fn origin(&self) -> &Name {
        &self.origin
    }

    /// The SOA record at the origin.
    pub fn soa(&self) -> &Record<rdata::SOA> {
        &self.soa
    }

    /// The serial number of this zone, from the SOA record.
    pub fn serial(&self) -> SerialNumber {
        SerialNumber::from(self.soa.rdata().serial())
    }

    /// The TTL of the SOA record, used as the zone's default TTL.
    pub fn ttl(&self) -> TimeToLive {
        self.soa.ttl()
    }

    /// Look up the record set for a name and type. SOA is not stored here, use [`Zone::soa`].
    pub fn get(&self, name: &Name, record_type: RecordType) -> Option<&RecordSet> {
        self.records.get(&RrKey::new(name.into(), record_type))
    }

    /// Record sets other than the SOA, in canonical name order then type code.
    pub fn record_sets(&self) -> impl Iterator<Item = &RecordSet> {
        self.records.values()
    }

    /// Records other than the SOA, in canonical name order then type code.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values().flat_map(|rrset| rrset.records())
    }

    /// The record data at a name, for a given type.
    pub fn rdatas(&self, name: &Name, record_type: RecordType) -> Vec<&RData> {
        self.get(name, record_type)
            .map(|rrset| rrset.rdatas().collect())
            .unwrap_or_default()
    }

    /// Number of records, including the SOA.
    pub fn len(&self) -> usize {
        1 + self.records.values().map(RecordSet::len).sum::<usize>()
    }

    /// Whether this zone holds the same data as `other`, disregarding the SOA serial.
    pub fn same_content(&self, other: &Zone) -> bool {
        let (mine, theirs) = (self.soa.rdata(), other.soa.rdata());
        self.origin == other.origin
            && self.records == other.records
            && self.soa.ttl() == other.soa.ttl()
            && mine.mname() == theirs.mname()
            && mine.rname() == theirs.rname()
            && mine.refresh() == theirs.refresh()
            && mine.retry() == theirs.retry()
            && mine.expire() == theirs.expire()
            && mine.minimum() == theirs.minimum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("zone {0} has no SOA record at its origin")]
pub struct MissingSoa(pub Name);
