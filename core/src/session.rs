//! Session identity and the on-disk login cache
//!
//! A [`Session`] is either fully populated and usable or it does not
//! exist; partially filled sessions are never persisted. The cache file
//! is a flat JSON object keyed by account, rewritten in full after every
//! successful fresh login (temp file + rename, so a crash never leaves a
//! half-written cache). A missing, unreadable, or corrupt file is a cache
//! miss, never an error.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::DeviceProfile;
use crate::error::{FloorsignError, Result};

/// How long a fresh login stays valid in the cache
pub const SESSION_TTL_HOURS: i64 = 24;

/// The authenticated identity used by every request after login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque `_key` bearer token
    pub session_key: String,
    pub user_id: String,
    /// Device identity the login was performed with; reused so the
    /// account keeps looking like a single device
    pub device_code: String,
    pub device_model: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a fresh login, valid for the next 24 hours
    pub fn new(
        session_key: impl Into<String>,
        user_id: impl Into<String>,
        device: &DeviceProfile,
    ) -> Self {
        Self {
            session_key: session_key.into(),
            user_id: user_id.into(),
            device_code: device.device_code.clone(),
            device_model: device.device_model.clone(),
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A usable session has every identity field populated
    pub fn is_complete(&self) -> bool {
        !self.session_key.is_empty()
            && !self.user_id.is_empty()
            && !self.device_code.is_empty()
            && !self.device_model.is_empty()
    }
}

/// On-disk mapping from account to cached [`Session`]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cached session for `account`, if present, complete, and unexpired
    pub fn load(&self, account: &str) -> Option<Session> {
        let mut cache = self.read_cache();
        match cache.remove(account) {
            Some(session) if session.is_expired(Utc::now()) => {
                info!(account, "cached session has expired, fresh login required");
                None
            }
            Some(session) if !session.is_complete() => {
                warn!(account, "cached session is incomplete, ignoring it");
                None
            }
            Some(session) => {
                info!(account, user_id = %session.user_id, "loaded cached session");
                Some(session)
            }
            None => {
                debug!(account, "no cached session");
                None
            }
        }
    }

    /// Persist `session` under `account`, replacing any prior entry.
    ///
    /// Entries for other accounts are kept as-is.
    pub fn save(&self, account: &str, session: &Session) -> Result<()> {
        let mut cache = self.read_cache();
        cache.insert(account.to_string(), session.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&cache)
            .map_err(|e| FloorsignError::Cache(e.to_string()))?;

        // Write to a temp file, then rename for atomicity
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        info!(account, expires_at = %session.expires_at, "saved session to cache");
        Ok(())
    }

    fn read_cache(&self) -> BTreeMap<String, Session> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read session cache");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "session cache is corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> DeviceProfile {
        DeviceProfile::random()
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("login_cache.json"))
    }

    #[test]
    fn round_trip_reconstructs_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let session = Session::new("K", "U1", &device());

        store.save("13800000000", &session).unwrap();
        let loaded = store.load("13800000000").unwrap();

        assert_eq!(loaded, session);
    }

    #[test]
    fn fresh_session_expires_in_a_day() {
        let session = Session::new("K", "U1", &device());
        let horizon = session.expires_at - Utc::now();
        assert!(horizon > Duration::hours(23));
        assert!(horizon <= Duration::hours(24));
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut session = Session::new("K", "U1", &device());
        session.expires_at = Utc::now() - Duration::hours(1);

        store.save("acct", &session).unwrap();
        assert!(store.load("acct").is_none());
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load("acct").is_none());
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("login_cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load("acct").is_none());
    }

    #[test]
    fn save_replaces_entry_and_keeps_other_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let dev = device();

        store.save("a", &Session::new("K1", "U1", &dev)).unwrap();
        store.save("b", &Session::new("K2", "U2", &dev)).unwrap();
        store.save("a", &Session::new("K3", "U3", &dev)).unwrap();

        assert_eq!(store.load("a").unwrap().session_key, "K3");
        assert_eq!(store.load("b").unwrap().session_key, "K2");
    }

    #[test]
    fn incomplete_session_is_not_usable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut session = Session::new("", "U1", &device());
        session.session_key = String::new();

        store.save("acct", &session).unwrap();
        assert!(store.load("acct").is_none());
    }
}
