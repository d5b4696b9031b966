//! Resource Record Definitions for DNS

mod record;
mod rset;
mod sequence;
mod ttl;
mod zone;

pub use self::record::Record;
pub use self::rset::{Mismatch, RecordSet};
pub use self::sequence::SerialNumber;
pub use self::ttl::{TimeToLive, TtlOverflow};
pub use self::zone::{MissingSoa, Zone};

/// DNS Name with case preserved.
///
pub use hickory_proto::rr::Name;

/// DNS Name converted to the canonical lowercase form.
///
pub use hickory_proto::rr::LowerName;

pub use hickory_proto::rr::{RData, RecordType};
