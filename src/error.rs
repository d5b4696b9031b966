use std::io;
use std::net::AddrParseError;

use camino::Utf8PathBuf;
use hickory_proto::ProtoError;

use crate::rr::Name;

/// Two occupied names collide within one parent domain.
///
/// The reserved `ns` label counts as occupied in every zone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Duplicate subdomain in {parent}: {name}")]
pub struct ConflictError {
    pub parent: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("Invalid domain name {name:?} in {parent}: {source}")]
    InvalidName {
        parent: String,
        name: String,
        #[source]
        source: ProtoError,
    },

    #[error("Invalid address {address:?} for {name} in {parent}: {source}")]
    InvalidAddress {
        parent: String,
        name: String,
        address: String,
        #[source]
        source: AddrParseError,
    },
}

impl BuildError {
    pub fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            BuildError::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

/// Writing or removing persisted zones failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Persisting zone {origin} to {path}: {source}")]
    Write {
        origin: Name,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Removing stale zone {origin} at {path}: {source}")]
    Remove {
        origin: Name,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Listing zones in {path}: {source}")]
    List {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure of a single parent domain during an update cycle.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("building zone: {0}")]
    Build(#[from] BuildError),

    #[error("saving zone: {0}")]
    Persist(#[from] PersistenceError),
}
