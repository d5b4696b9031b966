use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write as _};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError};
use crate::error::PersistenceError;
use crate::rr::{LowerName, Name, Zone};

use super::ZoneStore;

const ZONE_EXTENSION: &str = "zone";

/// Zone store keeping one master file per origin in a directory.
///
/// The zone for `app.local.` lives at `<directory>/app.local.zone`.
#[derive(Debug, Clone)]
pub struct FileZoneStore {
    directory: Utf8PathBuf,
}

impl FileZoneStore {
    pub fn new(directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Path of the zone file for `origin`.
    pub fn zone_path(&self, origin: &Name) -> Utf8PathBuf {
        let stem = origin.to_ascii().trim_end_matches('.').to_ascii_lowercase();
        self.directory.join(format!("{stem}.{ZONE_EXTENSION}"))
    }
}

impl ZoneStore for FileZoneStore {
    #[tracing::instrument(skip_all, fields(zone = %origin), level = "debug")]
    fn load(&self, origin: &Name) -> Result<Option<Zone>, CodecError> {
        let path = self.zone_path(origin);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let zone = codec::from_text(&text, origin).inspect_err(|error| {
            debug!("failed to parse {path}: {error}");
        })?;
        debug!("zone file loaded: {path} with {} records", zone.len());
        Ok(Some(zone))
    }

    #[tracing::instrument(skip_all, fields(zone = %zone.origin()), level = "debug")]
    fn save(&self, zone: &Zone) -> Result<(), PersistenceError> {
        let path = self.zone_path(zone.origin());
        let fail = |source| PersistenceError::Write {
            origin: zone.origin().clone(),
            path: path.clone(),
            source,
        };

        debug!("Saving zone to {path}");
        let text = codec::to_text(zone);

        // Written next to the target so the rename below never crosses filesystems.
        let mut file = NamedTempFile::new_in(&self.directory).map_err(fail)?;
        file.write_all(text.as_bytes()).map_err(fail)?;
        file.flush().map_err(fail)?;
        set_readable(file.as_file()).map_err(fail)?;
        file.as_file().sync_all().map_err(fail)?;
        file.persist(&path).map_err(|error| fail(error.error))?;

        info!(
            "Saved zone {} serial {} to {path}",
            zone.origin(),
            zone.serial()
        );
        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    fn prune(&self, active: &BTreeSet<LowerName>) -> Result<Vec<Name>, PersistenceError> {
        let entries = match self.directory.read_dir_utf8() {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::List {
                    path: self.directory.clone(),
                    source,
                });
            }
        };

        let mut removed = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!("skipping unreadable entry in {}: {error}", self.directory);
                    continue;
                }
            };

            let path = entry.path();
            if path.extension() != Some(ZONE_EXTENSION) {
                continue;
            }
            let Some(origin) = path
                .file_stem()
                .and_then(|stem| Name::from_utf8(format!("{stem}.")).ok())
            else {
                continue;
            };

            if active.contains(&LowerName::from(&origin)) {
                continue;
            }

            fs::remove_file(path).map_err(|source| PersistenceError::Remove {
                origin: origin.clone(),
                path: path.to_owned(),
                source,
            })?;
            info!("Removed stale zone {origin} at {path}");
            removed.push(origin);
        }

        Ok(removed)
    }
}

/// Temporary files are created owner-only; zone files are read by the DNS server.
#[cfg(unix)]
fn set_readable(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
