//! In-memory holder for the single active access credential.
//!
//! The store is a cheap cloneable handle over one shared cell. [`ApiClient`]
//! reads it each time it builds a request, so `set` and `clear` take effect on
//! the very next call. A request that has already been built keeps the token
//! it was signed with.
//!
//! Nothing here touches disk.
//!
//! [`ApiClient`]: crate::client::ApiClient

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

/// A bearer access token issued by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    /// Always `Bearer` for this service.
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Space-separated scopes the token was granted, when reported.
    pub scope: Option<String>,
}

impl Credential {
    /// Wrap an already-obtained access token.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_at: None,
            scope: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Utc::now() >= expires,
            None => false,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    cell: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `credential`, replacing any previous one.
    pub fn set(&self, credential: Credential) {
        let mut guard = self.write();
        if guard.is_some() {
            debug!("replacing active credential");
        } else {
            debug!("installing credential");
        }
        *guard = Some(credential);
    }

    /// Drop the active credential, if any.
    pub fn clear(&self) {
        if self.write().take().is_some() {
            debug!("cleared credential");
        }
    }

    /// Snapshot of the active credential.
    pub fn current(&self) -> Option<Credential> {
        self.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.read().is_some()
    }

    // The cell only ever holds a fully-formed value, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Option<Credential>> {
        self.cell.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Credential>> {
        self.cell.write().unwrap_or_else(|e| e.into_inner())
    }
}
