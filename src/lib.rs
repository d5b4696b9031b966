pub mod builder;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod rr;
pub mod source;
pub mod store;
pub mod update;

pub use self::builder::{SoaParameters, ZoneBuilder};
pub use self::config::Config;
pub use self::domain::{AddressKind, DomainRecord};
pub use self::error::{BuildError, ConflictError, PersistenceError, UpdateError};
pub use self::store::{FileZoneStore, MemoryZoneStore, ZoneStore};
pub use self::update::{Outcome, UpdateReport, ZoneUpdater};
