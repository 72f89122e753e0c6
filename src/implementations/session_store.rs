use std::sync::{ Arc, PoisonError, RwLock };

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{ DateTime, Utc };
use log::{ debug, info, warn };

use crate::errors::{ RegistryError, RegistryResult };
use crate::models::user::{ AccountForm, AuthResponse, Credentials, User };
use crate::traits::backend::BackendApi;
use crate::traits::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// An authenticated identity: the user and the bearer token issued for them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    /// Expiry claim of the token, when it is a readable JWT. Only used for
    /// display; the server stays the authority on validity.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let payload = self.token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        DateTime::from_timestamp(claims.get("exp")?.as_i64()?, 0)
    }
}

/// Process-wide holder of the current session.
///
/// Cloning is cheap and every clone observes the same state. The user and
/// token are always persisted and cleared together: a store holding only
/// one of them restores as signed out.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Restore whatever session the storage holds
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let restored = Self::restore(storage.as_ref());
        if let Some(session) = &restored {
            info!("Restored session for {}", session.user.email);
        }
        Self {
            current: Arc::new(RwLock::new(restored)),
            storage,
        }
    }

    fn restore(storage: &dyn KeyValueStore) -> Option<Session> {
        let token = storage.get(TOKEN_KEY).unwrap_or_else(|err| {
            warn!("Failed to read stored token: {}", err);
            None
        });
        let user = storage.get(USER_KEY).unwrap_or_else(|err| {
            warn!("Failed to read stored user: {}", err);
            None
        });

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(raw_user)) =>
                match serde_json::from_str::<User>(&raw_user) {
                    Ok(user) => Some(Session { user, token }),
                    Err(err) => {
                        warn!("Discarding stored session with unreadable user: {}", err);
                        Self::clear_storage(storage);
                        None
                    }
                }
            _ => {
                warn!("Discarding half-stored session");
                Self::clear_storage(storage);
                None
            }
        }
    }

    fn clear_storage(storage: &dyn KeyValueStore) {
        if let Err(err) = storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
            warn!("Failed to clear stored session: {}", err);
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn user(&self) -> Option<User> {
        self.current().map(|session| session.user)
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Validate credentials locally, exchange them for a session and persist it.
    /// On any failure the current session is left as it was.
    pub async fn login<B>(&self, backend: &B, credentials: &Credentials) -> RegistryResult<User>
        where B: BackendApi + ?Sized
    {
        let credentials = credentials.validate().map_err(RegistryError::Validation)?;
        debug!("Logging in as {}", credentials.email);
        let response = backend.login(&credentials).await?;
        self.establish(response)
    }

    /// Create an account and sign in as the new user
    pub async fn register<B>(&self, backend: &B, form: &AccountForm) -> RegistryResult<User>
        where B: BackendApi + ?Sized
    {
        let account = form.validate().map_err(RegistryError::Validation)?;
        debug!("Registering account for {}", account.email);
        let response = backend.register(&account).await?;
        self.establish(response)
    }

    fn establish(&self, response: AuthResponse) -> RegistryResult<User> {
        let AuthResponse { token, user } = response;
        let raw_user = serde_json::to_string(&user).map_err(|e| RegistryError::Storage(e.to_string()))?;
        self.storage.set_all(&[(TOKEN_KEY, token.clone()), (USER_KEY, raw_user)])?;

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            user: user.clone(),
            token,
        });
        info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// Replace the stored user after a profile update, keeping the token
    pub fn replace_user(&self, user: User) -> RegistryResult<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let session = match current.as_mut() {
            Some(session) => session,
            None => {
                return Err(RegistryError::Unauthorized);
            }
        };
        let raw_user = serde_json::to_string(&user).map_err(|e| RegistryError::Storage(e.to_string()))?;
        self.storage.set_all(&[(TOKEN_KEY, session.token.clone()), (USER_KEY, raw_user)])?;
        session.user = user;
        Ok(())
    }

    pub fn logout(&self) {
        info!("Signing out");
        self.clear();
    }

    /// Called when the server rejects the token
    pub fn invalidate(&self) {
        if self.is_authenticated() {
            warn!("Session rejected by the server, clearing it");
        }
        self.clear();
    }

    /// Called when the server rejects the token a request was sent with.
    /// A session established after that request went out is kept.
    pub fn invalidate_token(&self, token: &str) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().map(|session| session.token.as_str()) != Some(token) {
            debug!("Ignoring rejection of a token that is no longer current");
            return false;
        }
        warn!("Session rejected by the server, clearing it");
        *current = None;
        Self::clear_storage(self.storage.as_ref());
        true
    }

    fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = None;
        Self::clear_storage(self.storage.as_ref());
    }
}
