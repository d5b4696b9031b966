//! Where domain records come from.
//!
//! The zone engine never talks to a container runtime itself. A
//! [`DomainSource`] hands it a snapshot of the currently discovered domain
//! records once per update cycle.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::DomainRecord;

/// Suffix appended to parent domains that are a single label.
pub const DEFAULT_PARENT_SUFFIX: &str = "local";

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("reading domains from {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decoding domains from {path}: {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A snapshot provider of discovered domain records.
pub trait DomainSource {
    /// The domain records discovered right now, in discovery order.
    fn domains(&self) -> Result<Vec<DomainRecord>, SourceError>;
}

/// A fixed set of domain records.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(Vec<DomainRecord>);

impl StaticSource {
    pub fn new(domains: Vec<DomainRecord>) -> Self {
        Self(domains)
    }
}

impl DomainSource for StaticSource {
    fn domains(&self) -> Result<Vec<DomainRecord>, SourceError> {
        Ok(self.0.clone())
    }
}

/// Domain records read from a JSON document, re-read on every cycle.
///
/// The document is an array of objects with `parent`, `name`, `address` and
/// optional `aliases` fields. A parent with no dot (for example a bare network
/// name) is published under `.local`.
///
/// ```json
/// [
///   { "parent": "app", "name": "web", "address": "10.0.0.5", "aliases": ["www"] }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: Utf8PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl DomainSource for JsonFileSource {
    #[tracing::instrument(skip_all, fields(path = %self.path), level = "debug")]
    fn domains(&self) -> Result<Vec<DomainRecord>, SourceError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut domains: Vec<DomainRecord> =
            serde_json::from_str(&text).map_err(|source| SourceError::Decode {
                path: self.path.clone(),
                source,
            })?;

        for domain in &mut domains {
            domain.parent = qualify_parent(&domain.parent);
            tracing::trace!("discovered {domain}");
        }

        tracing::debug!("read {} domain records", domains.len());
        Ok(domains)
    }
}

/// Append [`DEFAULT_PARENT_SUFFIX`] to single-label parent domains.
pub fn qualify_parent(parent: &str) -> String {
    let parent = parent.trim_end_matches('.');
    if parent.contains('.') {
        parent.to_owned()
    } else {
        format!("{parent}.{DEFAULT_PARENT_SUFFIX}")
    }
}
