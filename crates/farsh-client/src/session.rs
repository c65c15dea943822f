//! # Session / Auth State
//!
//! The logged-in operator's bearer token and profile, with an explicit
//! lifecycle.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │   startup                                                               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   SessionStore::hydrate(path)  ── reads session.json (if any)          │
//! │      │                           expired token → start logged out       │
//! │      ▼                                                                  │
//! │   SessionHandle ───────────────► ApiClient (reads token per request)   │
//! │      │                                                                  │
//! │      ├── login(user, pass) ──── POST auth/login → token + user         │
//! │      │                           written to memory AND disk             │
//! │      │                                                                  │
//! │      └── logout() ───────────── memory cleared, file deleted           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handle is shared, not global: whoever builds the `ApiClient` passes
//! it in, and tests build as many independent sessions as they like.

use chrono::Utc;
use farsh_core::User;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

/// Shared, lockable session injected into the API client.
pub type SessionHandle = Arc<RwLock<Session>>;

// =============================================================================
// Session
// =============================================================================

/// Token and profile of the logged-in operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Session {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// A shareable handle for a logged-out session.
    pub fn empty_handle() -> SessionHandle {
        Arc::new(RwLock::new(Session::default()))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The bearer token, if present and not expired.
    pub fn valid_token(&self) -> Option<&str> {
        let token = self.token.as_deref()?;
        if token_expired(token) {
            None
        } else {
            Some(token)
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.valid_token().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// True only when the token is a JWT whose `exp` lies in the past.
///
/// The signature is not checked: the client cannot know the server's key,
/// and the backend verifies every request anyway. Opaque (non-JWT) tokens
/// are never considered expired.
fn token_expired(token: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    match jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data
            .claims
            .exp
            .is_some_and(|exp| exp <= Utc::now().timestamp()),
        Err(_) => false,
    }
}

// =============================================================================
// Login Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: User,
}

// =============================================================================
// Session Store
// =============================================================================

/// Owns the session file and the shared handle.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    handle: SessionHandle,
}

impl SessionStore {
    /// Loads the persisted session, if any.
    ///
    /// A missing file, an unreadable file and an expired token all start
    /// the session logged out; only the latter two are logged.
    pub fn hydrate(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let session = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Session>(&contents) {
                Ok(session) if session.is_authenticated() => {
                    debug!(?path, "Session restored");
                    session
                }
                Ok(_) => {
                    info!(?path, "Stored session has expired");
                    Session::default()
                }
                Err(e) => {
                    warn!(?path, error = %e, "Ignoring unreadable session file");
                    Session::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(e) => return Err(ClientError::SessionStorage(e.to_string())),
        };

        Ok(SessionStore {
            path,
            handle: Arc::new(RwLock::new(session)),
        })
    }

    /// The handle to inject into an [`ApiClient`].
    pub fn handle(&self) -> SessionHandle {
        Arc::clone(&self.handle)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logs in against `auth/login` and persists the new session.
    pub async fn login(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> ClientResult<User> {
        let response: TokenResponse = api
            .post_public("auth/login", &LoginRequest { username, password })
            .await?;

        let session = Session::new(response.access_token, response.user.clone());
        *self.handle.write().await = session.clone();
        self.write_file(&session)?;

        info!(username = %response.user.username, role = %response.user.role, "Logged in");
        Ok(response.user)
    }

    /// Clears the session in memory and on disk.
    pub async fn logout(&self) -> ClientResult<()> {
        self.handle.write().await.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ClientError::SessionStorage(e.to_string())),
        }
        info!("Logged out");
        Ok(())
    }

    /// Writes the current in-memory session to disk.
    pub async fn persist(&self) -> ClientResult<()> {
        let session = self.handle.read().await.clone();
        self.write_file(&session)
    }

    fn write_file(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::SessionStorage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json).map_err(|e| ClientError::SessionStorage(e.to_string()))?;
        debug!(path = ?self.path, "Session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use farsh_core::UserRole;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn user(role: UserRole) -> User {
        User {
            id: 1,
            username: "owner".into(),
            email: "owner@farsh.ir".into(),
            full_name: Some("Shop Owner".into()),
            role,
            is_active: true,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            last_login: None,
        }
    }

    fn jwt(exp_offset_secs: i64) -> String {
        #[derive(Serialize)]
        struct C {
            sub: String,
            exp: i64,
        }
        encode(
            &Header::default(),
            &C {
                sub: "owner".into(),
                exp: Utc::now().timestamp() + exp_offset_secs,
            },
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_token_validity() {
        assert!(Session::new(jwt(3600), user(UserRole::User)).is_authenticated());
        assert!(!Session::new(jwt(-60), user(UserRole::User)).is_authenticated());
        assert!(Session::new("opaque-token", user(UserRole::User)).is_authenticated());
        assert!(!Session::default().is_authenticated());
    }

    #[test]
    fn test_admin_requires_valid_token() {
        assert!(Session::new(jwt(3600), user(UserRole::Admin)).is_admin());
        assert!(!Session::new(jwt(-60), user(UserRole::Admin)).is_admin());
        assert!(!Session::new(jwt(3600), user(UserRole::User)).is_admin());
    }

    #[tokio::test]
    async fn test_hydrate_persist_logout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::hydrate(&path).unwrap();
        assert!(!store.handle().read().await.is_authenticated());

        *store.handle().write().await = Session::new(jwt(3600), user(UserRole::Admin));
        store.persist().await.unwrap();

        let restored = SessionStore::hydrate(&path).unwrap();
        let session = restored.handle().read().await.clone();
        assert!(session.is_admin());
        assert_eq!(session.user().unwrap().username, "owner");

        restored.logout().await.unwrap();
        assert!(!path.exists());
        assert!(restored.handle().read().await.user().is_none());
        // Logging out twice is harmless.
        restored.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_hydrate_drops_expired_and_corrupt_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let expired = Session::new(jwt(-5), user(UserRole::User));
        std::fs::write(&path, serde_json::to_string(&expired).unwrap()).unwrap();
        let store = SessionStore::hydrate(&path).unwrap();
        assert_eq!(*store.handle().read().await, Session::default());

        std::fs::write(&path, "{not json").unwrap();
        let store = SessionStore::hydrate(&path).unwrap();
        assert!(!store.handle().read().await.is_authenticated());
    }
}
