use std::fmt;

use hickory_proto::rr::{DNSClass, RData, RecordData, RecordType, RrKey};

use super::{Name, ttl::TimeToLive};

/// A single DNS resource record owned by a generated zone.
///
/// Unlike the hickory record, this type carries no DNSSEC proof or mDNS flags:
/// generated zones are plain `IN` class data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<R: RecordData = RData> {
    name: Name,
    dns_class: DNSClass,
    ttl: TimeToLive,
    rdata: R,
}

/// Renders the record in master-file order:
///
/// ```text
///   <name>   [<ttl>]   [<class>]   <type>   <data>
/// ```
impl<R: RecordData> fmt::Display for Record<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{name} {ttl} {class} {ty} {rdata}",
            name = self.name,
            ttl = self.ttl,
            class = self.dns_class,
            ty = self.record_type(),
            rdata = self.rdata,
        )
    }
}

impl<R: RecordData> Record<R> {
    pub fn from_rdata(name: Name, ttl: TimeToLive, rdata: R) -> Self {
        Record {
            name,
            dns_class: DNSClass::IN,
            ttl,
            rdata,
        }
    }

    /// Converts the record into a record with generic record data
    pub fn into_record_rdata(self) -> Record<RData> {
        Record {
            name: self.name,
            dns_class: self.dns_class,
            ttl: self.ttl,
            rdata: self.rdata.into_rdata(),
        }
    }

    /// Record Lookup Key for this Record
    pub(crate) fn rrkey(&self) -> RrKey {
        RrKey::new(self.name().into(), self.record_type())
    }

    /// Label of the record resource
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// DNS Class of the record resource
    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    /// Time to Live of the record resource
    pub fn ttl(&self) -> TimeToLive {
        self.ttl
    }

    /// Record Data of the record resource
    pub fn rdata(&self) -> &R {
        &self.rdata
    }

    /// Record Type of the record resource
    pub fn record_type(&self) -> RecordType {
        self.rdata.record_type()
    }
}

impl From<&hickory_proto::rr::Record> for Record {
    fn from(value: &hickory_proto::rr::Record) -> Self {
        Record {
            name: value.name().clone(),
            dns_class: value.dns_class(),
            ttl: TimeToLive::from(value.ttl()),
            rdata: value.data().clone(),
        }
    }
}
