//! Master file text for generated zones.
//!
//! [`to_text`] renders a [`Zone`] canonically: the same zone value always
//! produces the same bytes. [`from_text`] reads any master file hickory's
//! parser understands, so hand edited zone files are accepted as previous
//! state as long as they carry an SOA at the origin.
//!
//! ```text
//! $ORIGIN app.local.
//! $TTL 3600
//! @ 3600 IN SOA ns admin ( 1 3600 600 604800 600 )
//! @ 3600 IN NS ns
//! ns 3600 IN A 10.0.0.53
//! web 3600 IN A 10.0.0.5
//! www 3600 IN CNAME web
//! ```

use std::{fs, io};

use camino::Utf8Path;
use hickory_proto::serialize::txt::Parser;

use crate::rr::{MissingSoa, Name, RData, Record, RecordSet, TimeToLive, Zone};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("reading zone file: {0}")]
    Io(#[from] io::Error),

    #[error("parsing zone file: {0}")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    MissingSoa(#[from] MissingSoa),

    #[error("zone file origin {found} does not match expected origin {expected}")]
    OriginMismatch { expected: Name, found: Name },
}

impl CodecError {
    /// Whether this error means there was no zone file at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CodecError::Io(error) if error.kind() == io::ErrorKind::NotFound)
    }
}

/// Render a zone as master file text.
///
/// The SOA comes first, followed by every other record ordered by owner name
/// (DNS canonical order) and then record type code. Names inside the zone are
/// written relative to the origin.
pub fn to_text(zone: &Zone) -> String {
    let origin = zone.origin();
    let soa = zone.soa();
    let data = soa.rdata();

    let mut lines = vec![
        format!("$ORIGIN {origin}"),
        format!("$TTL {}", zone.ttl()),
        format!(
            "{owner} {ttl} {class} SOA {mname} {rname} ( {serial} {refresh} {retry} {expire} {minimum} )",
            owner = relative(soa.name(), origin),
            ttl = soa.ttl(),
            class = soa.dns_class(),
            mname = relative(data.mname(), origin),
            rname = relative(data.rname(), origin),
            serial = data.serial(),
            refresh = data.refresh(),
            retry = data.retry(),
            expire = data.expire(),
            minimum = data.minimum(),
        ),
    ];
    lines.extend(zone.records().map(|record| record_line(record, origin)));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Parse master file text into a zone rooted at `origin`.
pub fn from_text(text: &str, origin: &Name) -> Result<Zone, CodecError> {
    let (found, records) = Parser::new(text, None, Some(origin.clone()))
        .parse()
        .map_err(|error| CodecError::Parse(Box::new(error)))?;

    if &found != origin {
        return Err(CodecError::OriginMismatch {
            expected: origin.clone(),
            found,
        });
    }

    // The parser does not keep the TTL written on the SOA line.
    let mut zone = Zone::from_rrsets(found, records.values().map(RecordSet::from))?;
    if let Some(ttl) = soa_ttl(text) {
        zone = zone.with_soa_ttl(ttl);
    }

    tracing::trace!(
        "parsed zone {} serial {} with {} records",
        zone.origin(),
        zone.serial(),
        zone.len()
    );
    Ok(zone)
}

/// Read and parse the zone file at `path`.
pub fn read_zone_file(path: &Utf8Path, origin: &Name) -> Result<Zone, CodecError> {
    let text = fs::read_to_string(path)?;
    from_text(&text, origin)
}

/// The TTL of the SOA record as written in `text`: the explicit TTL on the SOA
/// line, else the `$TTL` directive. Only plain second counts are recognised.
fn soa_ttl(text: &str) -> Option<TimeToLive> {
    let mut default = None;

    for line in text.lines() {
        let content = line.split(';').next().unwrap_or_default();
        let tokens: Vec<&str> = content.split_whitespace().collect();

        match tokens.first() {
            None => continue,
            Some(directive) if directive.eq_ignore_ascii_case("$TTL") => {
                default = tokens.get(1).and_then(|ttl| ttl.parse::<u32>().ok());
                continue;
            }
            Some(_) => {}
        }

        // A line starting in the first column carries an owner name. The type
        // follows at most a TTL and a class.
        let skip = usize::from(!content.starts_with(char::is_whitespace));
        let fields = &tokens[skip.min(tokens.len())..];
        let Some(position) = fields
            .iter()
            .take(3)
            .position(|token| token.eq_ignore_ascii_case("SOA"))
        else {
            continue;
        };

        let prefix = &fields[..position];
        if !prefix
            .iter()
            .all(|token| token.parse::<u32>().is_ok() || is_class(token))
        {
            continue;
        }
        let explicit = prefix.iter().find_map(|token| token.parse::<u32>().ok());

        return explicit.or(default).map(TimeToLive::from_secs);
    }

    None
}

fn is_class(token: &str) -> bool {
    ["IN", "CH", "HS", "CS"]
        .iter()
        .any(|class| token.eq_ignore_ascii_case(class))
}

fn record_line(record: &Record, origin: &Name) -> String {
    let rdata = match record.rdata() {
        RData::NS(ns) => relative(&ns.0, origin),
        RData::CNAME(cname) => relative(&cname.0, origin),
        other => other.to_string(),
    };

    format!(
        "{owner} {ttl} {class} {ty} {rdata}",
        owner = relative(record.name(), origin),
        ttl = record.ttl(),
        class = record.dns_class(),
        ty = record.record_type(),
    )
}

/// Write `name` relative to `origin`: `@` for the apex, the leading labels for
/// names inside the zone, and the absolute name otherwise.
fn relative(name: &Name, origin: &Name) -> String {
    if name == origin {
        return "@".to_owned();
    }

    let full = name.to_ascii();
    if origin.zone_of(name) {
        let apex = origin.to_ascii();
        if let Some(split) = full.len().checked_sub(apex.len() + 1) {
            if split > 0 && full.as_bytes()[split] == b'.' {
                return full[..split].to_owned();
            }
        }
    }
    full
}
