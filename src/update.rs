//! Update cycle coordination.
//!
//! [`ZoneUpdater::update_all`] runs one cycle: it partitions the discovered
//! domain records by parent, builds a zone per parent on top of the serial of
//! the previously persisted zone, and saves each zone it built. Failures are
//! scoped to their parent domain; every other parent is still built and saved.

use std::collections::{BTreeSet, HashMap};

use crate::builder::{ZoneBuilder, origin_for};
use crate::codec;
use crate::domain::{DomainRecord, name_key};
use crate::error::{PersistenceError, UpdateError};
use crate::rr::{LowerName, Name, Zone};
use crate::store::ZoneStore;

/// The domain records published under one parent domain, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGroup {
    pub parent: String,
    pub domains: Vec<DomainRecord>,
}

/// Partition domain records by parent domain.
///
/// Groups appear in the order their parent was first seen and keep the
/// relative order of their records. Parents are compared as DNS names,
/// ignoring case and a trailing dot; a group is labelled with the first
/// spelling seen.
pub fn group_by_parent(domains: impl IntoIterator<Item = DomainRecord>) -> Vec<DomainGroup> {
    let mut groups: Vec<DomainGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for domain in domains {
        let key = name_key(domain.parent.trim_end_matches('.'));
        match index.get(&key) {
            Some(&position) => groups[position].domains.push(domain),
            None => {
                index.insert(key, groups.len());
                groups.push(DomainGroup {
                    parent: domain.parent.clone(),
                    domains: vec![domain],
                });
            }
        }
    }

    groups
}

/// How an update cycle went overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every parent domain was updated (or there was nothing to update).
    Complete,
    /// Some parent domains were updated, some failed.
    Partial,
    /// Every parent domain failed.
    Failed,
}

/// A parent domain whose zone could not be updated.
#[derive(Debug)]
pub struct GroupFailure {
    pub parent: String,
    pub error: UpdateError,
}

/// Result of one update cycle.
#[derive(Debug, Default)]
pub struct UpdateReport {
    parents: Vec<String>,
    zones: Vec<Zone>,
    failures: Vec<GroupFailure>,
}

impl UpdateReport {
    /// Every parent domain seen in this cycle, whether or not it succeeded.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Zones that were built and saved.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn failures(&self) -> &[GroupFailure] {
        &self.failures
    }

    pub fn into_parts(self) -> (Vec<Zone>, Vec<GroupFailure>) {
        (self.zones, self.failures)
    }

    pub fn outcome(&self) -> Outcome {
        match (self.zones.is_empty(), self.failures.is_empty()) {
            (_, true) => Outcome::Complete,
            (true, false) => Outcome::Failed,
            (false, false) => Outcome::Partial,
        }
    }

    /// Origins of every parent domain seen in this cycle.
    ///
    /// Parents that are not valid domain names are left out.
    pub fn active_origins(&self) -> BTreeSet<LowerName> {
        self.parents
            .iter()
            .filter_map(|parent| origin_for(parent).ok())
            .map(|origin| LowerName::from(&origin))
            .collect()
    }
}

/// Runs update cycles against a zone store.
#[derive(Debug, Clone)]
pub struct ZoneUpdater<S> {
    builder: ZoneBuilder,
    store: S,
}

impl<S> ZoneUpdater<S>
where
    S: ZoneStore,
{
    pub fn new(builder: ZoneBuilder, store: S) -> Self {
        Self { builder, store }
    }

    pub fn builder(&self) -> &ZoneBuilder {
        &self.builder
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build and save a zone for every parent domain in `domains`.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn update_all(&self, domains: impl IntoIterator<Item = DomainRecord>) -> UpdateReport {
        let mut report = UpdateReport::default();

        for group in group_by_parent(domains) {
            match self.update_group(&group) {
                Ok(zone) => report.zones.push(zone),
                Err(error) => {
                    tracing::error!("Failed to update zone for {}: {error}", group.parent);
                    report.failures.push(GroupFailure {
                        parent: group.parent.clone(),
                        error,
                    });
                }
            }
            report.parents.push(group.parent);
        }

        tracing::debug!(
            zones = report.zones.len(),
            failures = report.failures.len(),
            "update cycle finished"
        );
        report
    }

    /// Remove persisted zones for parent domains that were not seen in `report`.
    pub fn prune_stale(&self, report: &UpdateReport) -> Result<Vec<Name>, PersistenceError> {
        self.store.prune(&report.active_origins())
    }

    #[tracing::instrument(skip_all, fields(parent = %group.parent), level = "debug")]
    fn update_group(&self, group: &DomainGroup) -> Result<Zone, UpdateError> {
        let origin = origin_for(&group.parent)?;
        let previous = self
            .store
            .find_previous(&origin)
            .map(|zone| zone.serial());

        let zone = self.builder.build(&group.parent, &group.domains, previous)?;
        tracing::trace!("{}:\n---\n{}---", zone.origin(), codec::to_text(&zone));

        self.store.save(&zone)?;
        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(parent: &str, name: &str) -> DomainRecord {
        DomainRecord::new(parent, name, "10.0.0.1")
    }

    #[test]
    fn grouping_is_stable() {
        let groups = group_by_parent([record("a", "1"), record("b", "2"), record("a", "3")]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].parent, "a");
        assert_eq!(groups[0].domains, [record("a", "1"), record("a", "3")]);
        assert_eq!(groups[1].parent, "b");
        assert_eq!(groups[1].domains, [record("b", "2")]);
    }

    #[test]
    fn grouping_ignores_case_and_trailing_dot() {
        let groups = group_by_parent([record("App.Local", "1"), record("app.local.", "2")]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].parent, "App.Local");
        assert_eq!(groups[0].domains.len(), 2);
    }

    #[test]
    fn grouping_folds_unicode_case() {
        let groups = group_by_parent([record("CAFÉ.local", "1"), record("café.local", "2")]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].parent, "CAFÉ.local");
    }

    #[test]
    fn grouping_keeps_duplicates() {
        let groups = group_by_parent([record("p", "a"), record("p", "a")]);
        assert_eq!(groups[0].domains.len(), 2);
    }

    #[test]
    fn empty_report_is_complete() {
        let report = UpdateReport::default();
        assert_eq!(report.outcome(), Outcome::Complete);
        assert!(report.active_origins().is_empty());
    }
}
