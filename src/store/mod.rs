//! Persistence of generated zones.
//!
//! A [`ZoneStore`] maps an origin to its last persisted [`Zone`]. The builder
//! only needs the previous serial from it, and the orchestrator hands every
//! newly built zone back to it. Two implementations are provided:
//!
//! - [`FileZoneStore`] keeps one master file per origin in a directory.
//! - [`MemoryZoneStore`] keeps zones in memory, for tests and embedding.

use std::collections::BTreeSet;

use crate::codec::CodecError;
use crate::error::PersistenceError;
use crate::rr::{LowerName, Name, Zone};

mod file;
mod memory;

pub use self::file::FileZoneStore;
pub use self::memory::MemoryZoneStore;

/// Storage backend for generated zones.
///
/// Implementations must make `save` atomic with respect to readers: a reader
/// observes either the previous zone or the new one, never a partial write.
pub trait ZoneStore {
    /// Load the persisted zone for `origin`.
    ///
    /// Returns `Ok(None)` when no zone has been persisted for this origin.
    ///
    /// # Errors
    ///
    /// Returns an error when a persisted zone exists but cannot be read or parsed.
    fn load(&self, origin: &Name) -> Result<Option<Zone>, CodecError>;

    /// Persist `zone`, replacing any previous zone for the same origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone could not be written.
    fn save(&self, zone: &Zone) -> Result<(), PersistenceError>;

    /// Remove every persisted zone whose origin is not in `active`.
    ///
    /// Returns the origins that were removed.
    ///
    /// # Errors
    ///
    /// Returns the first removal that failed.
    fn prune(&self, active: &BTreeSet<LowerName>) -> Result<Vec<Name>, PersistenceError>;

    /// The previous zone for `origin`, if one can be used.
    ///
    /// A missing zone is the normal first-run condition. A zone that exists but
    /// cannot be read is logged and treated the same as a missing one, so that
    /// a corrupt file never blocks regeneration.
    fn find_previous(&self, origin: &Name) -> Option<Zone> {
        match self.load(origin) {
            Ok(Some(zone)) => {
                tracing::debug!("Found previous zone for {origin} (serial {})", zone.serial());
                Some(zone)
            }
            Ok(None) => {
                tracing::debug!("No previous zone for {origin}");
                None
            }
            Err(error) if error.is_not_found() => {
                tracing::debug!("No previous zone for {origin}");
                None
            }
            Err(error) => {
                tracing::warn!("Ignoring unreadable previous zone for {origin}: {error}");
                None
            }
        }
    }
}

impl<S> ZoneStore for &S
where
    S: ZoneStore + ?Sized,
{
    fn load(&self, origin: &Name) -> Result<Option<Zone>, CodecError> {
        (**self).load(origin)
    }

    fn save(&self, zone: &Zone) -> Result<(), PersistenceError> {
        (**self).save(zone)
    }

    fn prune(&self, active: &BTreeSet<LowerName>) -> Result<Vec<Name>, PersistenceError> {
        (**self).prune(active)
    }
}
