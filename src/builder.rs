//! Zone construction from discovered domain records.
//!
//! [`ZoneBuilder::build`] is a pure function of its inputs: the parent domain,
//! the domain records published under it and the serial of the previously
//! persisted zone. It never reads or writes any state of its own.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_proto::ProtoError;
use hickory_proto::ProtoErrorKind;
use hickory_proto::rr::rdata::{A, AAAA, CNAME, NS, SOA};

use crate::domain::{AddressKind, DomainRecord, name_key};
use crate::error::{BuildError, ConflictError};
use crate::rr::{Name, RData, Record, SerialNumber, TimeToLive, Zone};

/// Label of the synthetic name server record present in every zone.
pub const NAMESERVER_LABEL: &str = "ns";

/// Label used for the SOA responsible-person mailbox.
pub const HOSTMASTER_LABEL: &str = "admin";

/// Timer fields of the SOA record, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoaParameters {
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: u32,
}

impl Default for SoaParameters {
    fn default() -> Self {
        Self {
            refresh: 3600,
            retry: 600,
            expire: 604800,
            minimum: 600,
        }
    }
}

/// Builds complete zones for one parent domain at a time.
#[derive(Debug, Clone)]
pub struct ZoneBuilder {
    resolver: IpAddr,
    ttl: TimeToLive,
    soa: SoaParameters,
}

impl ZoneBuilder {
    /// `resolver` is the address published for `ns.<parent>` in every zone.
    pub fn new(resolver: IpAddr, ttl: TimeToLive) -> Self {
        Self {
            resolver,
            ttl,
            soa: SoaParameters::default(),
        }
    }

    pub fn with_soa(mut self, soa: SoaParameters) -> Self {
        self.soa = soa;
        self
    }

    pub fn resolver(&self) -> IpAddr {
        self.resolver
    }

    pub fn ttl(&self) -> TimeToLive {
        self.ttl
    }

    pub fn soa(&self) -> SoaParameters {
        self.soa
    }

    /// Build the zone for `parent` from the domain records published under it.
    ///
    /// The serial is one more than `previous`, or [`SerialNumber::FIRST`] when
    /// there is no previous zone. All occupied names (each record's name, its
    /// aliases and the reserved `ns` label) are checked for duplicates before
    /// any record is emitted; the first repeated name in input order is
    /// reported as a [`ConflictError`].
    #[tracing::instrument(skip_all, fields(%parent, domains = domains.len()), level = "debug")]
    pub fn build(
        &self,
        parent: &str,
        domains: &[DomainRecord],
        previous: Option<SerialNumber>,
    ) -> Result<Zone, BuildError> {
        let serial = previous.map_or(SerialNumber::FIRST, SerialNumber::next);

        let nameserver = DomainRecord::new(parent, NAMESERVER_LABEL, self.resolver.to_string());
        let domains: Vec<&DomainRecord> = domains
            .iter()
            .chain(std::iter::once(&nameserver))
            .collect();

        check_conflicts(parent, &domains)?;

        let origin = origin_for(parent)?;
        let ns_name = subdomain(parent, &origin, NAMESERVER_LABEL)?;
        let rname = subdomain(parent, &origin, HOSTMASTER_LABEL)?;

        let soa = SOA::new(
            ns_name.clone(),
            rname,
            serial.get(),
            self.soa.refresh,
            self.soa.retry,
            self.soa.expire,
            self.soa.minimum,
        );
        let mut zone = Zone::new(
            origin.clone(),
            Record::from_rdata(origin.clone(), self.ttl, soa),
        );
        emit(
            &mut zone,
            parent,
            "@",
            Record::from_rdata(origin.clone(), self.ttl, NS(ns_name)).into_record_rdata(),
        )?;

        for domain in domains {
            tracing::debug!("Including {} subdomain in {} zone", domain.name, parent);
            let owner = subdomain(parent, &origin, &domain.name)?;
            let rdata = address_rdata(parent, domain)?;
            emit(
                &mut zone,
                parent,
                &domain.name,
                Record::from_rdata(owner.clone(), self.ttl, rdata),
            )?;

            for alias in &domain.aliases {
                tracing::debug!("Including alias {} in {} zone", alias, parent);
                let alias_name = subdomain(parent, &origin, alias)?;
                emit(
                    &mut zone,
                    parent,
                    alias,
                    Record::from_rdata(alias_name, self.ttl, CNAME(owner.clone()))
                        .into_record_rdata(),
                )?;
            }
        }

        tracing::debug!(serial = %zone.serial(), records = zone.len(), "built zone");
        Ok(zone)
    }
}

fn check_conflicts(parent: &str, domains: &[&DomainRecord]) -> Result<(), ConflictError> {
    let mut seen = HashSet::new();
    for name in domains.iter().flat_map(|domain| domain.occupied_names()) {
        if !seen.insert(name_key(name)) {
            return Err(ConflictError {
                parent: parent.to_owned(),
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

/// Add a record whose owner name and type are not taken yet.
fn emit(zone: &mut Zone, parent: &str, label: &str, record: Record) -> Result<(), ConflictError> {
    match zone.insert(record) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(ConflictError {
            parent: parent.to_owned(),
            name: label.to_owned(),
        }),
    }
}

/// The fully qualified origin for a parent domain, with or without a trailing dot.
pub fn origin_for(parent: &str) -> Result<Name, BuildError> {
    let trimmed = parent.trim_end_matches('.');
    let invalid = |source: ProtoError| BuildError::InvalidName {
        parent: parent.to_owned(),
        name: parent.to_owned(),
        source,
    };

    if trimmed.is_empty() {
        return Err(invalid(ProtoErrorKind::Message("parent domain is empty").into()));
    }

    Name::from_utf8(format!("{trimmed}.")).map_err(invalid)
}

fn subdomain(parent: &str, origin: &Name, label: &str) -> Result<Name, BuildError> {
    let invalid = |source: ProtoError| BuildError::InvalidName {
        parent: parent.to_owned(),
        name: label.to_owned(),
        source,
    };

    if label.is_empty() || label.ends_with('.') {
        return Err(invalid(
            ProtoErrorKind::Message("subdomain must be a non-empty relative name").into(),
        ));
    }

    Name::from_utf8(label)
        .and_then(|name| name.append_domain(origin))
        .map_err(invalid)
}

fn address_rdata(parent: &str, domain: &DomainRecord) -> Result<RData, BuildError> {
    let invalid = |source| BuildError::InvalidAddress {
        parent: parent.to_owned(),
        name: domain.name.clone(),
        address: domain.address.clone(),
        source,
    };

    match domain.address_kind() {
        AddressKind::V4 => domain
            .address
            .parse::<Ipv4Addr>()
            .map(|ip| RData::A(A::from(ip)))
            .map_err(invalid),
        AddressKind::V6 => domain
            .address
            .parse::<Ipv6Addr>()
            .map(|ip| RData::AAAA(AAAA::from(ip)))
            .map_err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use crate::rr::RecordType;

    use super::*;

    fn builder() -> ZoneBuilder {
        ZoneBuilder::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 53)), TimeToLive::DEFAULT)
    }

    fn name(s: &str) -> Name {
        Name::from_utf8(s).unwrap()
    }

    #[test]
    fn first_serial_is_one() {
        let zone = builder().build("app.local", &[], None).unwrap();
        assert_eq!(zone.serial(), SerialNumber::FIRST);
    }

    #[test]
    fn serial_follows_previous() {
        let zone = builder()
            .build("app.local", &[], Some(SerialNumber::from(41)))
            .unwrap();
        assert_eq!(zone.serial().get(), 42);
    }

    #[test]
    fn soa_fields() {
        let zone = builder().build("app.local", &[], None).unwrap();
        let soa = zone.soa().rdata();

        assert_eq!(zone.origin(), &name("app.local."));
        assert_eq!(soa.mname(), &name("ns.app.local."));
        assert_eq!(soa.rname(), &name("admin.app.local."));
        assert_eq!(soa.refresh(), 3600);
        assert_eq!(soa.retry(), 600);
        assert_eq!(soa.expire(), 604800);
        assert_eq!(soa.minimum(), 600);
        assert_eq!(zone.soa().ttl(), TimeToLive::DEFAULT);
    }

    #[test]
    fn custom_soa_and_ttl() {
        let soa = SoaParameters {
            refresh: 60,
            retry: 30,
            expire: 120,
            minimum: 10,
        };
        let zone = ZoneBuilder::new(IpAddr::V4(Ipv4Addr::LOCALHOST), TimeToLive::from(60))
            .with_soa(soa)
            .build("app.local", &[DomainRecord::new("app.local", "web", "10.0.0.5")], None)
            .unwrap();

        assert_eq!(zone.soa().rdata().refresh(), 60);
        assert!(zone.records().all(|record| record.ttl() == TimeToLive::from(60)));
    }

    #[test]
    fn reserved_ns_conflict() {
        let domains = [DomainRecord::new("p", "ns", "10.0.0.1")];
        let error = builder().build("p", &domains, None).unwrap_err();
        assert_eq!(
            error.as_conflict(),
            Some(&ConflictError {
                parent: "p".into(),
                name: "ns".into()
            })
        );
    }

    #[test]
    fn alias_conflicts_with_name() {
        let domains = [
            DomainRecord::new("p", "web", "10.0.0.1"),
            DomainRecord::new("p", "api", "10.0.0.2").with_alias("WEB"),
        ];
        let error = builder().build("p", &domains, None).unwrap_err();
        assert_eq!(error.as_conflict().map(|c| c.name.as_str()), Some("WEB"));
    }

    #[test]
    fn conflict_ignores_unicode_case() {
        let domains = [
            DomainRecord::new("app.local", "café", "10.0.0.1"),
            DomainRecord::new("app.local", "CAFÉ", "10.0.0.2"),
        ];
        let error = builder().build("app.local", &domains, None).unwrap_err();
        assert_eq!(
            error.as_conflict(),
            Some(&ConflictError {
                parent: "app.local".into(),
                name: "CAFÉ".into()
            })
        );
    }

    #[test]
    fn emit_refuses_taken_owner() {
        let mut zone = builder().build("p", &[], None).unwrap();
        let record = Record::from_rdata(
            name("web.p."),
            TimeToLive::DEFAULT,
            RData::A(A::new(10, 0, 0, 1)),
        );

        emit(&mut zone, "p", "web", record.clone()).unwrap();
        let error = emit(&mut zone, "p", "web", record).unwrap_err();
        assert_eq!(error.name, "web");
        assert_eq!(zone.rdatas(&name("web.p."), RecordType::A).len(), 1);
    }

    #[test]
    fn conflict_checked_before_names() {
        let domains = [
            DomainRecord::new("p", "a", "not-an-address"),
            DomainRecord::new("p", "a", "10.0.0.2"),
        ];
        let error = builder().build("p", &domains, None).unwrap_err();
        assert!(error.as_conflict().is_some());
    }

    #[test]
    fn invalid_address_is_an_error() {
        let domains = [DomainRecord::new("app.local", "web", "10.0.0")];
        let error = builder().build("app.local", &domains, None).unwrap_err();
        assert!(matches!(error, BuildError::InvalidAddress { ref address, .. } if address == "10.0.0"));

        let domains = [DomainRecord::new("app.local", "web", "fe80:::zz")];
        let error = builder().build("app.local", &domains, None).unwrap_err();
        assert!(matches!(error, BuildError::InvalidAddress { .. }));
    }

    #[test]
    fn invalid_names_are_errors() {
        let domains = [DomainRecord::new("app.local", "", "10.0.0.5")];
        let error = builder().build("app.local", &domains, None).unwrap_err();
        assert!(matches!(error, BuildError::InvalidName { .. }));

        let error = builder().build("", &[], None).unwrap_err();
        assert!(matches!(error, BuildError::InvalidName { .. }));
    }

    #[test]
    fn trailing_dot_on_parent_is_accepted() {
        let zone = builder().build("app.local.", &[], None).unwrap();
        assert_eq!(zone.origin(), &name("app.local."));
    }

    #[test]
    fn empty_group_has_three_records() {
        let zone = builder().build("app.local", &[], None).unwrap();
        assert_eq!(zone.len(), 3);

        let records: Vec<(Name, RecordType)> = zone
            .records()
            .map(|record| (record.name().clone(), record.record_type()))
            .collect();
        assert_eq!(
            records,
            [
                (name("app.local."), RecordType::NS),
                (name("ns.app.local."), RecordType::A),
            ]
        );
        assert_eq!(zone.soa().name(), &name("app.local."));
    }

    #[test]
    fn nameserver_records() {
        let zone = builder().build("app.local", &[], None).unwrap();

        let ns = zone.rdatas(&name("app.local."), RecordType::NS);
        assert_eq!(ns, [&RData::NS(NS(name("ns.app.local.")))]);

        let a = zone.rdatas(&name("ns.app.local."), RecordType::A);
        assert_eq!(a, [&RData::A(A::new(10, 0, 0, 53))]);
    }
}
