//! Observable authentication session.
//!
//! [`Session`] owns the [`ApiClient`] and publishes a [`SessionSnapshot`]
//! through a `tokio::sync::watch` channel, so a UI (or anything else) can
//! follow `is_authenticated`, `user`, `loading` and `error` without polling.
//!
//! Only one login runs at a time. A second [`Session::login`] or
//! [`Session::login_with_token`] while one is pending fails immediately with
//! [`SpotlinkError::FlowInProgress`] and leaves the pending one alone.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::config::AuthConfig;
use crate::credentials::{Credential, CredentialStore};
use crate::error::SpotlinkError;
use crate::oauth::{AuthorizationAgent, AuthorizationFlow};
use crate::types::User;

/// The most recent failure, in a form that can be cloned into snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    /// Stable code from [`SpotlinkError::code`].
    pub code: &'static str,
    pub message: String,
    /// HTTP status for API failures that produced a response.
    pub status: Option<u16>,
}

impl From<&SpotlinkError> for SessionError {
    fn from(err: &SpotlinkError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            status: err.api_error().and_then(|e| e.status),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<SessionError>,
}

pub struct Session {
    config: AuthConfig,
    client: ApiClient,
    state: watch::Sender<SessionSnapshot>,
    login_pending: AtomicBool,
    // Bumped by logout so an in-flight login cannot resurrect the session.
    epoch: AtomicU64,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("client", &self.client)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl Session {
    /// Build a session with its own [`ApiClient`] and empty credential store.
    ///
    /// The client id is only checked when an authorization flow starts, so a
    /// session used purely through [`login_with_token`](Self::login_with_token)
    /// does not need one.
    pub fn new(config: AuthConfig) -> Result<Self, SpotlinkError> {
        let client = ApiClient::new(&config.api_base_url, CredentialStore::new())?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (custom HTTP settings, shared store).
    pub fn with_client(config: AuthConfig, client: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            config,
            client,
            state,
            login_pending: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Run the PKCE authorization flow through `agent`, install the resulting
    /// credential and load the user's profile.
    pub async fn login(&self, agent: &dyn AuthorizationAgent) -> Result<User, SpotlinkError> {
        let _pending = self.begin_login()?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let obtained = match AuthorizationFlow::new(self.config.clone()) {
            Ok(mut flow) => flow.run(agent, self.client.http()).await,
            Err(e) => Err(e),
        };
        match obtained {
            Ok(credential) => self.install(credential, epoch).await,
            Err(e) => {
                warn!(error = %e, "login failed before a credential was obtained");
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Install an access token obtained elsewhere and load the user's profile.
    pub async fn login_with_token(&self, access_token: &str) -> Result<User, SpotlinkError> {
        let _pending = self.begin_login()?;
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.install(Credential::bearer(access_token), epoch).await
    }

    /// Forget the credential and reset the snapshot.
    pub fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.client.credentials().clear();
        self.state.send_modify(|s| *s = SessionSnapshot::default());
        info!("logged out");
    }

    /// Re-fetch the user's profile.
    ///
    /// Returns `Ok(None)` without a request when not authenticated. On failure
    /// the error is recorded and the previous `user` stays in place.
    pub async fn refresh_user(&self) -> Result<Option<User>, SpotlinkError> {
        if !self.is_authenticated() {
            debug!("refresh_user skipped: not authenticated");
            return Ok(None);
        }
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.client.current_user().await {
            Ok(user) => {
                if self.epoch.load(Ordering::SeqCst) == epoch {
                    self.state.send_modify(|s| {
                        s.user = Some(user.clone());
                        s.loading = false;
                    });
                }
                Ok(Some(user))
            }
            Err(e) => {
                let err = SpotlinkError::from(e);
                warn!(error = %err, "refreshing user failed");
                if self.epoch.load(Ordering::SeqCst) == epoch {
                    self.record_error(&err);
                }
                Err(err)
            }
        }
    }

    fn begin_login(&self) -> Result<PendingLogin<'_>, SpotlinkError> {
        if self
            .login_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("rejecting login: another one is pending");
            return Err(SpotlinkError::FlowInProgress);
        }
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        Ok(PendingLogin { session: self })
    }

    async fn install(&self, credential: Credential, epoch: u64) -> Result<User, SpotlinkError> {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("logout during login; discarding credential");
            return Err(SpotlinkError::AuthorizationCancelled);
        }
        self.client.credentials().set(credential);

        match self.client.current_user().await {
            Ok(user) => {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    return Err(SpotlinkError::AuthorizationCancelled);
                }
                info!(user = %user.id, "logged in");
                self.state.send_modify(|s| {
                    s.is_authenticated = true;
                    s.user = Some(user.clone());
                    s.loading = false;
                    s.error = None;
                });
                Ok(user)
            }
            Err(e) => {
                let err = SpotlinkError::from(e);
                warn!(error = %err, "fetching user after login failed");
                if self.epoch.load(Ordering::SeqCst) == epoch {
                    self.client.credentials().clear();
                    let recorded = SessionError::from(&err);
                    self.state.send_modify(|s| {
                        s.is_authenticated = false;
                        s.user = None;
                        s.loading = false;
                        s.error = Some(recorded);
                    });
                }
                Err(err)
            }
        }
    }

    fn record_error(&self, err: &SpotlinkError) {
        let recorded = SessionError::from(err);
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(recorded);
        });
    }
}

/// Marks a login as pending until dropped, including when the login future
/// itself is dropped part-way.
#[derive(Debug)]
struct PendingLogin<'a> {
    session: &'a Session,
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        self.session.login_pending.store(false, Ordering::Release);
        self.session.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn session() -> Session {
        let mut config = AuthConfig::new("client-1");
        // Nothing listens on the discard port, so any request fails fast.
        config.api_base_url = "http://127.0.0.1:9/v1".to_string();
        Session::new(config).unwrap()
    }

    #[test]
    fn starts_logged_out() {
        let s = session();
        assert_eq!(s.snapshot(), SessionSnapshot::default());
        assert!(!s.is_authenticated());
        assert!(s.user().is_none());
    }

    #[test]
    fn session_error_carries_status() {
        let err = SpotlinkError::from(ApiError::http(401, None, "expired"));
        let recorded = SessionError::from(&err);
        assert_eq!(recorded.code, "api_error");
        assert_eq!(recorded.status, Some(401));
        assert!(recorded.to_string().contains("expired"));
    }

    #[test]
    fn pending_marker_rejects_second_login() {
        let s = session();
        let first = s.begin_login().unwrap();
        assert!(s.snapshot().loading);
        assert!(matches!(s.begin_login().unwrap_err(), SpotlinkError::FlowInProgress));
        drop(first);
        assert!(!s.snapshot().loading);
        assert!(s.begin_login().is_ok());
    }

    #[tokio::test]
    async fn refresh_without_login_is_noop() {
        let s = session();
        assert!(s.refresh_user().await.unwrap().is_none());
        assert!(s.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn unreachable_api_leaves_session_logged_out() {
        let s = session();
        let err = s.login_with_token("tok").await.unwrap_err();
        assert_eq!(err.api_error().unwrap().status, None);

        let snap = s.snapshot();
        assert!(!snap.is_authenticated);
        assert!(!snap.loading);
        assert_eq!(snap.error.unwrap().code, "api_error");
        assert!(!s.client().credentials().is_set());
    }

    #[test]
    fn logout_resets_everything() {
        let s = session();
        s.client().credentials().set(Credential::bearer("tok"));
        s.state.send_modify(|snap| {
            snap.is_authenticated = true;
            snap.error = Some(SessionError {
                code: "api_error",
                message: "boom".into(),
                status: None,
            });
        });
        let mut rx = s.subscribe();

        s.logout();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionSnapshot::default());
        assert!(!s.client().credentials().is_set());
    }
}
