use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{Session, SessionHeader, SessionKey, SessionRecord};
use crate::errors::PitwallError;

/// The session load operation the comparison core depends on. Implementors
/// resolve a [`SessionKey`] to a fully populated [`Session`].
pub trait SessionLoader {
    fn load(&self, key: &SessionKey) -> Result<Session, PitwallError>;
}

/// Loads sessions from a directory of JSON-lines export files, one session
/// per file: a header record, then driver and lap records.
pub struct JsonlSessionLoader {
    root: PathBuf,
}

impl JsonlSessionLoader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn export_files(&self) -> Result<Vec<PathBuf>, PitwallError> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| PitwallError::SessionRootError {
                path: self.root.display().to_string(),
                source: e,
            })?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PitwallError::SessionRootError {
                path: self.root.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("jsonl") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl SessionLoader for JsonlSessionLoader {
    fn load(&self, key: &SessionKey) -> Result<Session, PitwallError> {
        for path in self.export_files()? {
            let Some(header) = read_header(&path)? else {
                continue;
            };
            if header_matches(&header, key) {
                info!("loading session export {}", path.display());
                return load_session_file(&path);
            }
        }
        Err(PitwallError::SessionNotFound {
            year: key.year,
            event: key.event.to_string(),
            session_type: key.session_type.to_string(),
        })
    }
}

fn header_matches(header: &SessionHeader, key: &SessionKey) -> bool {
    header.event.year == key.year
        && header.session_type == key.session_type
        && key.event.matches(&header.event)
}

/// Read just the header record of an export file, so selector resolution
/// does not deserialize every candidate in the directory.
fn read_header(path: &Path) -> Result<Option<SessionHeader>, PitwallError> {
    let file = fs::File::open(path).map_err(|e| PitwallError::SessionFileError { source: e })?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| PitwallError::SessionFileError { source: e })?;
    match serde_json::from_str::<SessionRecord>(first_line.trim()) {
        Ok(SessionRecord::Header(header)) => Ok(Some(header)),
        Ok(_) => Ok(None),
        Err(e) => {
            warn!("skipping {}: not a session export ({e})", path.display());
            Ok(None)
        }
    }
}

/// Load one session export file in full.
pub fn load_session_file(path: &Path) -> Result<Session, PitwallError> {
    let records = serde_jsonlines::json_lines(path)
        .map_err(|e| PitwallError::SessionFileError { source: e })?
        .collect::<Result<Vec<SessionRecord>, std::io::Error>>()
        .map_err(|e| PitwallError::SessionFileError { source: e })?;

    let mut records = records.into_iter();
    let Some(SessionRecord::Header(header)) = records.next() else {
        return Err(PitwallError::MissingEventHeader {
            path: path.display().to_string(),
        });
    };

    let mut drivers = Vec::new();
    let mut laps = Vec::new();
    for record in records {
        match record {
            SessionRecord::Header(_) => {
                warn!("ignoring extra header record in {}", path.display());
            }
            SessionRecord::Driver(driver) => drivers.push(driver),
            SessionRecord::Lap(lap) => laps.push(lap),
        }
    }
    debug!(
        "loaded {} with {} drivers and {} laps",
        header.event.event_name,
        drivers.len(),
        laps.len()
    );

    Ok(Session {
        event: header.event,
        session_type: header.session_type,
        drivers,
        laps,
    })
}
