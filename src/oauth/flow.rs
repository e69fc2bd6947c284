use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::credentials::Credential;
use crate::error::SpotlinkError;
use crate::oauth::agent::AuthorizationAgent;
use crate::oauth::pkce::{generate_pkce, generate_state, PkceMaterial};
use crate::oauth::redirect::{classify_redirect, AuthorizationResult};
use crate::oauth::request::AuthorizationRequest;
use crate::oauth::token::exchange_code;

/// Why a flow ended in [`FlowState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFailure {
    Denied,
    Cancelled,
    MalformedRedirect,
    StateMismatch,
    Agent,
    TokenExchange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Requested,
    RedirectReceived,
    CodeExtracted,
    Authenticated,
    Failed(FlowFailure),
}

/// One PKCE authorization-code attempt.
///
/// ```text
/// Idle -> Requested -> RedirectReceived -> CodeExtracted -> Authenticated
///                                      \-> Failed        \-> Failed
/// ```
///
/// The verifier lives only inside this value and is dropped once the flow
/// settles. The resulting [`Credential`] is handed back, not installed.
#[derive(Debug)]
pub struct AuthorizationFlow {
    config: AuthConfig,
    state: FlowState,
    pkce: Option<PkceMaterial>,
    request: Option<AuthorizationRequest>,
}

impl AuthorizationFlow {
    pub fn new(config: AuthConfig) -> Result<Self, SpotlinkError> {
        config.validate()?;
        Ok(Self {
            config,
            state: FlowState::Idle,
            pkce: None,
            request: None,
        })
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// The request issued by [`begin`](Self::begin), if any.
    pub fn request(&self) -> Option<&AuthorizationRequest> {
        self.request.as_ref()
    }

    /// Issue the authorization request with fresh PKCE material and state.
    pub fn begin(&mut self) -> Result<Url, SpotlinkError> {
        self.begin_with(generate_pkce(), generate_state())
    }

    /// [`begin`](Self::begin) with caller-supplied randomness.
    pub fn begin_with(&mut self, pkce: PkceMaterial, state: String) -> Result<Url, SpotlinkError> {
        self.expect_state(FlowState::Idle, "begin")?;

        let request = AuthorizationRequest::new(
            &self.config.client_id,
            &self.config.redirect_uri,
            self.config.scopes.iter().cloned(),
            &pkce.code_challenge,
            state,
        );
        let url = request.authorization_url(&self.config.authorization_endpoint)?;

        self.pkce = Some(pkce);
        self.request = Some(request);
        self.state = FlowState::Requested;
        debug!("authorization request issued");
        Ok(url)
    }

    /// Feed the terminal redirect (or `None` if the user walked away) and
    /// extract the authorization code.
    pub fn receive_redirect(&mut self, redirect: Option<&str>) -> Result<String, SpotlinkError> {
        self.expect_state(FlowState::Requested, "receive a redirect")?;
        let expected_state = self
            .request
            .as_ref()
            .map(|r| r.state().to_string())
            .unwrap_or_default();

        if redirect.is_some() {
            self.state = FlowState::RedirectReceived;
        }

        match classify_redirect(redirect, &expected_state).and_then(AuthorizationResult::into_code) {
            Ok(code) => {
                self.state = FlowState::CodeExtracted;
                debug!("authorization code extracted");
                Ok(code)
            }
            Err(e) => {
                let failure = match &e {
                    SpotlinkError::AuthorizationDenied(_) => FlowFailure::Denied,
                    SpotlinkError::AuthorizationCancelled => FlowFailure::Cancelled,
                    SpotlinkError::StateMismatch => FlowFailure::StateMismatch,
                    _ => FlowFailure::MalformedRedirect,
                };
                warn!(error = %e, "authorization redirect rejected");
                self.fail(failure);
                Err(e)
            }
        }
    }

    /// Exchange the extracted code for a credential. Consumes the verifier.
    pub async fn complete(
        &mut self,
        http: &reqwest::Client,
        code: &str,
    ) -> Result<Credential, SpotlinkError> {
        self.expect_state(FlowState::CodeExtracted, "exchange a code")?;
        let pkce = self.pkce.take().ok_or_else(|| {
            SpotlinkError::InvalidFlowState("PKCE verifier already consumed".to_string())
        })?;

        let result = exchange_code(
            http,
            &self.config.token_endpoint,
            code,
            &pkce.code_verifier,
            &self.config.redirect_uri,
            &self.config.client_id,
        )
        .await;

        match result {
            Ok(credential) => {
                self.state = FlowState::Authenticated;
                info!("authorization complete");
                Ok(credential)
            }
            Err(e) => {
                warn!(error = %e, "token exchange failed");
                self.fail(FlowFailure::TokenExchange);
                Err(e)
            }
        }
    }

    /// Drive the whole flow through `agent`.
    ///
    /// The wait for the redirect is bounded by the configured redirect
    /// timeout; running out of time counts as the user abandoning the flow.
    pub async fn run(
        &mut self,
        agent: &dyn AuthorizationAgent,
        http: &reqwest::Client,
    ) -> Result<Credential, SpotlinkError> {
        let url = self.begin()?;
        let timeout = self.config.redirect_timeout();

        let redirect = match tokio::time::timeout(timeout, agent.authorize(&url, &self.config.redirect_uri)).await {
            Ok(Ok(redirect)) => redirect,
            Ok(Err(e)) => {
                warn!(error = %e, "authorization agent failed");
                self.fail(FlowFailure::Agent);
                return Err(e);
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "timed out waiting for authorization redirect");
                None
            }
        };

        let code = self.receive_redirect(redirect.as_deref())?;
        self.complete(http, &code).await
    }

    fn expect_state(&self, expected: FlowState, action: &str) -> Result<(), SpotlinkError> {
        if self.state != expected {
            return Err(SpotlinkError::InvalidFlowState(format!(
                "cannot {action} while {:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn fail(&mut self, failure: FlowFailure) {
        self.pkce = None;
        self.state = FlowState::Failed(failure);
    }
}
