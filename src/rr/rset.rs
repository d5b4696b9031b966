use hickory_proto::rr::{RData, RecordType, RrKey};

use super::{Name, record::Record, ttl::TimeToLive};

/// All records sharing one owner name and record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    name: Name,
    record_type: RecordType,
    ttl: TimeToLive,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(name: Name, record_type: RecordType) -> Self {
        Self {
            name,
            record_type,
            ttl: TimeToLive::ZERO,
            records: Vec::new(),
        }
    }

    /// Label of the Resource Record Set
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// `RecordType` of the Resource Record Set
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Time to Live for this RecordSet
    pub fn ttl(&self) -> TimeToLive {
        self.ttl
    }

    /// Record Lookup Key for this Record Set
    pub(crate) fn rrkey(&self) -> RrKey {
        RrKey::new(self.name().into(), self.record_type())
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn rdatas(&self) -> impl Iterator<Item = &RData> {
        self.records.iter().map(|record| record.rdata())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Add a record to the set.
    ///
    /// Returns `Ok(false)` when an identical record was already present. A CNAME
    /// set holds at most one record, so inserting into one replaces its target.
    pub fn insert(&mut self, record: Record) -> Result<bool, Mismatch> {
        if record.name() != self.name() {
            return Err(Mismatch("name"));
        }
        if record.record_type() != self.record_type() {
            return Err(Mismatch("type"));
        }

        if self.record_type == RecordType::CNAME {
            self.records.clear();
        }

        if self
            .records
            .iter()
            .any(|existing| existing.rdata() == record.rdata())
        {
            return Ok(false);
        }

        self.ttl = record.ttl();
        self.records.push(record);
        Ok(true)
    }
}

impl From<&hickory_proto::rr::RecordSet> for RecordSet {
    fn from(value: &hickory_proto::rr::RecordSet) -> Self {
        RecordSet {
            name: value.name().clone(),
            record_type: value.record_type(),
            ttl: TimeToLive::from(value.ttl()),
            records: value.records_without_rrsigs().map(Record::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Mismatched {0} between new record and record set")]
pub struct Mismatch(pub(super) &'static str);
