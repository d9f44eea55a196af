//! Session token and user profile persistence.

use std::sync::Arc;

use todo_types::AuthUser;
use tracing::warn;

use crate::store::KeyValueStore;

pub const TOKEN_KEY: &str = "todo_auth_token";
pub const USER_KEY: &str = "todo_user_data";

/// Fixed-key accessors over a [`KeyValueStore`].
///
/// Never fails: backend errors are logged and read as "nothing stored", so a
/// broken store degrades to signed-out instead of an error. A detached store
/// (no backend) ignores writes and reads as empty.
#[derive(Clone, Default)]
pub struct TokenStore {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn detached() -> Self {
        Self { backend: None }
    }

    /// Persists both values. No validation.
    pub fn set_token(&self, token: &str, user: &AuthUser) {
        let Some(backend) = &self.backend else {
            return;
        };

        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize user data");
                return;
            }
        };

        if let Err(e) = backend.set(TOKEN_KEY, token) {
            warn!(error = %e, "Failed to store auth token");
        }
        if let Err(e) = backend.set(USER_KEY, &user_json) {
            warn!(error = %e, "Failed to store user data");
        }
    }

    pub fn get_token(&self) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    pub fn get_user(&self) -> Option<AuthUser> {
        let backend = self.backend.as_ref()?;
        let raw = match backend.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read user data");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Failed to parse user data");
                None
            }
        }
    }

    /// Removes both keys. Safe to call on an empty store.
    pub fn clear(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = backend.remove(key) {
                warn!(key, error = %e, "Failed to clear stored session");
            }
        }
    }

    /// Presence check only; says nothing about expiry.
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// `Bearer <token>` when a token is stored.
    pub fn auth_header(&self) -> Option<String> {
        self.get_token().map(|token| format!("Bearer {token}"))
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("attached", &self.backend.is_some())
            .finish()
    }
}
