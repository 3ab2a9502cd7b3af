// Durable token storage behind `parkly_api::SessionStore`.
//
// Two backends: a JSON object in the platform data directory, or one
// keyring entry per key. The profile's `token_store` picks between them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parkly_api::{Error, TokenStorage};
use tracing::debug;

use crate::{Profile, TokenStore, session_path};

const KEYRING_SERVICE: &str = "parkly";

/// Open the storage a profile is configured for.
pub fn open_token_storage(profile_name: &str, profile: &Profile) -> Arc<dyn TokenStorage> {
    match profile.token_store {
        TokenStore::File => Arc::new(FileTokenStorage::new(session_path(profile_name))),
        TokenStore::Keyring => Arc::new(KeyringTokenStorage::new(profile_name)),
    }
}

// ── File ────────────────────────────────────────────────────────────

/// Flat string map serialized as one JSON object.
///
/// Each call reads and rewrites the whole file; the session store touches
/// it only on load, login, and logout.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                Error::Storage(format!("{} is corrupt: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                    Err(io_error(&self.path, &e))
                }
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::Storage(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| io_error(&self.path, &e))?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.read()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> Error {
    Error::Storage(format!("{}: {err}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_error(path, &e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), Error> {
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

/// One keyring entry per key, named `<profile>/<key>`.
#[derive(Debug, Clone)]
pub struct KeyringTokenStorage {
    profile: String,
}

impl KeyringTokenStorage {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, Error> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/{key}", self.profile))
            .map_err(|e| Error::Storage(format!("keyring: {e}")))
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::Storage(format!("keyring: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| Error::Storage(format!("keyring: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Storage(format!("keyring: {e}"))),
        }
    }
}
