//! Discovered endpoints, the input to zone construction.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rr::{Name, RecordType};

/// One discovered name under a parent domain.
///
/// `parent` is the zone the name is published in (e.g. `app.local`), `name`
/// is the label relative to it (e.g. `web`). Every alias is published as a
/// CNAME pointing at `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainRecord {
    pub parent: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl DomainRecord {
    pub fn new(
        parent: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            parent: parent.into(),
            name: name.into(),
            address: address.into(),
            aliases: BTreeSet::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// The record family this address will be published as.
    pub fn address_kind(&self) -> AddressKind {
        AddressKind::classify(&self.address)
    }

    /// The record's own name followed by its aliases.
    pub fn occupied_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl fmt::Display for DomainRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.name, self.parent, self.address)
    }
}

/// Address family of a discovered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    V4,
    V6,
}

impl AddressKind {
    /// Any literal containing a `:` is treated as IPv6, everything else as IPv4.
    ///
    /// No further validation happens here.
    pub fn classify(address: &str) -> Self {
        if address.contains(':') {
            AddressKind::V6
        } else {
            AddressKind::V4
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            AddressKind::V4 => RecordType::A,
            AddressKind::V6 => RecordType::AAAA,
        }
    }
}

/// The form under which two labels or domain names are the same DNS name.
///
/// Text is converted the way it will be published (IDNA mapping, then
/// lowercase), so `CAFÉ` and `café` share a key. Text that is not a valid
/// name falls back to ASCII lowercase; building will reject it later.
pub(crate) fn name_key(text: &str) -> String {
    match Name::from_utf8(text) {
        Ok(name) => name.to_lowercase().to_ascii(),
        Err(_) => text.to_ascii_lowercase(),
    }
}
