//! Session lifecycle
//!
//! ```text
//! SessionManager::init ──► Session { token, identity } ──► ApiClient::with_session
//!        │                                                       │
//!        ▼                                                       ▼
//! SessionStore (load/save/clear) ◄── login / logout ── auth failure (401/403)
//! ```
//!
//! The credential lives under a single well-known key, JSON-encoded.

pub mod identity;
pub mod storage;

pub use identity::{decode_identity, SessionIdentity};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage};

use crate::api::ApiClient;
use crate::error::{Error, Result};

/// Storage key holding the JSON-encoded bearer token
pub const TOKEN_KEY: &str = "token";

/// Persisted credential wrapper
pub struct SessionStore<S: CredentialStorage> {
    storage: S,
}

impl<S: CredentialStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored token, or `None` when absent or unparsable
    pub fn load(&self) -> Option<String> {
        let raw = match self.storage.get_item(TOKEN_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read stored credential: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<String>(&raw) {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Stored credential is not a JSON string: {}", e);
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        self.storage.set_item(TOKEN_KEY, &serde_json::to_string(token)?)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(TOKEN_KEY)
    }

    /// Identity decoded from the stored token; malformed tokens yield `None`
    pub fn current_identity(&self) -> Option<SessionIdentity> {
        let token = self.load()?;
        match decode_identity(&token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                log::warn!("Stored credential could not be decoded: {}", e);
                None
            }
        }
    }
}

/// An established session: the credential plus who it belongs to
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    identity: SessionIdentity,
}

impl Session {
    /// Build a session from a raw token, decoding its identity
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let identity = decode_identity(&token)
            .map_err(|e| Error::session(format!("Credential could not be decoded: {}", e)))?;
        Ok(Self { token, identity })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"****")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A usable credential was already stored; no request was made
    AlreadyLoggedIn(Session),
    LoggedIn(Session),
}

impl LoginOutcome {
    pub fn session(&self) -> &Session {
        match self {
            LoginOutcome::AlreadyLoggedIn(s) | LoginOutcome::LoggedIn(s) => s,
        }
    }
}

/// Owns the session lifecycle: init at startup, teardown at logout
pub struct SessionManager<S: CredentialStorage> {
    store: SessionStore<S>,
}

impl<S: CredentialStorage> SessionManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            store: SessionStore::new(storage),
        }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Establish the session from the stored credential.
    ///
    /// Any failure means the caller must go back to login; nothing is retried.
    pub fn init(&self) -> Result<Session> {
        let token = self
            .store
            .load()
            .ok_or_else(|| Error::session("Not logged in"))?;
        let session = Session::from_token(token)?;
        log::info!("Session established for {}", session.identity().username);
        Ok(session)
    }

    /// Log in with username and password, persisting the returned token.
    ///
    /// A stored credential that still decodes short-circuits the request.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<LoginOutcome> {
        if let Ok(session) = self.init() {
            return Ok(LoginOutcome::AlreadyLoggedIn(session));
        }

        let token = api.login(username, password).await?;
        let session = Session::from_token(token)?;
        self.store.save(session.token())?;
        log::info!("Logged in as {}", session.identity().username);
        Ok(LoginOutcome::LoggedIn(session))
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        log::info!("Logged out");
        Ok(())
    }

    /// Drop the stored credential when `err` shows the server rejected it.
    ///
    /// Returns true when the credential was cleared.
    pub fn invalidate_on_auth_failure(&self, err: &Error) -> Result<bool> {
        if !err.is_auth_failure() {
            return Ok(false);
        }
        log::info!("Clearing credential after auth failure: {}", err);
        self.store.clear()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn mint(username: &str, user_id: i64) -> String {
        encode(
            &Header::default(),
            &json!({"username": username, "user_id": user_id}),
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_load_absent() {
        let store = SessionStore::new(MemoryStorage::new());
        assert_eq!(store.load(), None);
        assert_eq!(store.current_identity(), None);
    }

    #[test]
    fn test_save_stores_json_encoded_string() {
        let store = SessionStore::new(MemoryStorage::new());
        store.save("abc.def.ghi").unwrap();
        assert_eq!(
            store.storage().get_item(TOKEN_KEY).unwrap().as_deref(),
            Some("\"abc.def.ghi\"")
        );
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_load_unparsable_is_none() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "abc.def.ghi").unwrap();
        let store = SessionStore::new(storage);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_load_then_identity_matches_claim() {
        let store = SessionStore::new(MemoryStorage::new());
        store.save(&mint("jdoe", 5)).unwrap();

        let identity = store.current_identity().unwrap();
        assert_eq!(identity.username, "jdoe");
        assert_eq!(identity.user_id, 5);
    }

    #[test]
    fn test_identity_of_malformed_token_is_none() {
        let store = SessionStore::new(MemoryStorage::new());
        store.save("garbage").unwrap();
        assert!(store.load().is_some());
        assert_eq!(store.current_identity(), None);
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::new(MemoryStorage::new());
        store.save(&mint("jdoe", 5)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_manager_init_without_credential() {
        let manager = SessionManager::new(MemoryStorage::new());
        let err = manager.init().unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_manager_init_with_undecodable_credential() {
        let manager = SessionManager::new(MemoryStorage::new());
        manager.store().save("garbage").unwrap();
        assert!(matches!(manager.init(), Err(Error::SessionInvalid(_))));
    }

    #[test]
    fn test_manager_init_and_logout() {
        let manager = SessionManager::new(MemoryStorage::new());
        manager.store().save(&mint("jdoe", 5)).unwrap();

        let session = manager.init().unwrap();
        assert_eq!(session.identity().username, "jdoe");

        manager.logout().unwrap();
        assert!(manager.init().is_err());
    }

    #[test]
    fn test_invalidate_only_on_auth_failure() {
        let manager = SessionManager::new(MemoryStorage::new());
        manager.store().save(&mint("jdoe", 5)).unwrap();

        assert!(!manager.invalidate_on_auth_failure(&Error::api(500, None)).unwrap());
        assert!(manager.store().load().is_some());

        assert!(manager.invalidate_on_auth_failure(&Error::api(401, None)).unwrap());
        assert!(manager.store().load().is_none());
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session::from_token(mint("jdoe", 5)).unwrap();
        let debug = format!("{:?}", session);
        assert!(debug.contains("****"));
        assert!(!debug.contains(session.token()));
    }
}
