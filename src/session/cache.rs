use std::fs;
use std::path::PathBuf;

use log::{debug, info};

use super::{EventSelector, Session, SessionKey, SessionLoader};
use crate::errors::PitwallError;

/// On-disk read-through cache for loaded sessions.
///
/// The cache is an explicitly constructed handle over a caller-chosen
/// directory — never process-wide state — so tests can point it at a
/// temporary directory and the CLI at the user cache dir.
pub struct SessionCache {
    cache_dir: PathBuf,
}

impl SessionCache {
    /// Create a cache over the given directory, creating it if needed.
    pub fn new(cache_dir: PathBuf) -> Result<Self, PitwallError> {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| PitwallError::CacheIOError { source: e })?;
        }
        Ok(Self { cache_dir })
    }

    /// The default per-user cache location.
    pub fn default_cache_dir() -> Result<PathBuf, PitwallError> {
        let base = dirs::cache_dir().ok_or(PitwallError::NoCacheDir)?;
        Ok(base.join("pitwall").join("sessions"))
    }

    fn file_path_for_key(&self, key: &SessionKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", normalize_key(key)))
    }

    /// Cached session for this key, if one is on disk.
    pub fn get(&self, key: &SessionKey) -> Result<Option<Session>, PitwallError> {
        let path = self.file_path_for_key(key);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).map_err(|e| PitwallError::CacheIOError { source: e })?;
        let session =
            serde_json::from_str(&content).map_err(|e| PitwallError::CacheDecodeError {
                path: path.display().to_string(),
                source: e,
            })?;
        debug!("session cache hit: {}", path.display());
        Ok(Some(session))
    }

    /// Write a loaded session through to disk.
    pub fn put(&self, key: &SessionKey, session: &Session) -> Result<(), PitwallError> {
        let path = self.file_path_for_key(key);
        let content =
            serde_json::to_string(session).map_err(|e| PitwallError::CacheEncodeError { source: e })?;
        fs::write(&path, content).map_err(|e| PitwallError::CacheIOError { source: e })?;
        debug!("session cached: {}", path.display());
        Ok(())
    }
}

/// Cache keys are the request, not the resolved event, so a round-number
/// and an event-name selector for the same weekend cache separately.
fn normalize_key(key: &SessionKey) -> String {
    let event = match &key.event {
        EventSelector::Round(round) => format!("round_{round}"),
        EventSelector::Name(name) => name.clone(),
    };
    let event: String = event
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!(
        "{}_{}_{}",
        key.year,
        event,
        key.session_type.code().to_lowercase()
    )
}

/// A [`SessionLoader`] that serves hits from a [`SessionCache`] and writes
/// misses through from the wrapped loader.
pub struct CachedSessionLoader<L: SessionLoader> {
    cache: SessionCache,
    inner: L,
}

impl<L: SessionLoader> CachedSessionLoader<L> {
    pub fn new(cache: SessionCache, inner: L) -> Self {
        Self { cache, inner }
    }
}

impl<L: SessionLoader> SessionLoader for CachedSessionLoader<L> {
    fn load(&self, key: &SessionKey) -> Result<Session, PitwallError> {
        if let Some(session) = self.cache.get(key)? {
            return Ok(session);
        }
        info!("session cache miss, loading from source");
        let session = self.inner.load(key)?;
        self.cache.put(key, &session)?;
        Ok(session)
    }
}
