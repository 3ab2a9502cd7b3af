// Session store: who is logged in and which bearer token to send.
//
// Durable storage is read exactly once, when the store is constructed.
// After that the in-memory state is authoritative and every mutation is
// written through to storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::Error;

/// Storage key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "token";
/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key holding the serialized identity.
pub const IDENTITY_KEY: &str = "user";

// ── Durable storage ─────────────────────────────────────────────────

/// Key/value storage that survives process restarts.
///
/// Implementations live next to the configuration layer (file, keyring);
/// [`MemoryTokenStorage`] is provided for tests and ephemeral sessions.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Process-local [`TokenStorage`].
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, Error> {
        self.entries
            .lock()
            .map_err(|_| Error::Storage("memory storage lock poisoned".into()))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ── Session types ───────────────────────────────────────────────────

/// Console role of the logged-in operator.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Admin,
    User,
}

/// The logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Token pair issued by the backend on login.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access: SecretString,
    pub refresh: Option<SecretString>,
}

/// Snapshot of the session. Cheap to clone; secrets stay wrapped.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub identity: Option<Identity>,
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

// ── Store ───────────────────────────────────────────────────────────

/// Owner of the current [`Session`].
///
/// Readers either poll ([`SessionStore::snapshot`]) or subscribe to
/// changes. Only `login` and `logout` mutate.
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Construct from durable storage, reading persisted tokens once.
    pub fn load(storage: Arc<dyn TokenStorage>) -> Result<Self, Error> {
        let access_token = storage.get(ACCESS_TOKEN_KEY)?.map(SecretString::from);
        let refresh_token = storage.get(REFRESH_TOKEN_KEY)?.map(SecretString::from);
        let identity = match storage.get(IDENTITY_KEY)? {
            Some(raw) => serde_json::from_str(&raw).ok(),
            None => None,
        };

        debug!(
            authenticated = access_token.is_some(),
            "session loaded from storage"
        );

        let (state, _) = watch::channel(Session {
            identity,
            access_token,
            refresh_token,
        });
        Ok(Self { storage, state })
    }

    /// A store backed by fresh in-memory storage.
    pub fn ephemeral() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            storage: Arc::new(MemoryTokenStorage::new()),
            state,
        }
    }

    /// Persist tokens and identity, then publish the new session.
    pub fn login(&self, identity: Identity, tokens: Tokens) -> Result<(), Error> {
        use secrecy::ExposeSecret;

        self.storage
            .set(ACCESS_TOKEN_KEY, tokens.access.expose_secret())?;
        match &tokens.refresh {
            Some(refresh) => self
                .storage
                .set(REFRESH_TOKEN_KEY, refresh.expose_secret())?,
            None => self.storage.remove(REFRESH_TOKEN_KEY)?,
        }
        let raw = serde_json::to_string(&identity).map_err(|e| Error::Storage(e.to_string()))?;
        self.storage.set(IDENTITY_KEY, &raw)?;

        info!(name = %identity.name, role = %identity.role, "logged in");
        self.state.send_replace(Session {
            identity: Some(identity),
            access_token: Some(tokens.access),
            refresh_token: tokens.refresh,
        });
        Ok(())
    }

    /// Clear storage and in-memory state. Idempotent.
    ///
    /// The in-memory session is cleared even when storage fails, so the
    /// process never keeps sending a token it was asked to forget.
    pub fn logout(&self) -> Result<(), Error> {
        let was_authenticated = self.state.borrow().is_authenticated();
        self.state.send_replace(Session::default());

        let mut first_err = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, IDENTITY_KEY] {
            if let Err(e) = self.storage.remove(key) {
                first_err.get_or_insert(e);
            }
        }

        if was_authenticated {
            info!("logged out");
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.state.borrow().access_token.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
