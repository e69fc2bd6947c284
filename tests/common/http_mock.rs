use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use spotlink::error::SpotlinkError;
use spotlink::oauth::AuthorizationAgent;
use tokio::sync::Notify;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::user_json;

/// `GET /v1/me` answering only requests signed with `token`.
#[allow(dead_code)]
pub async fn mount_user(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
}

/// Token endpoint answering a PKCE code exchange with `body`.
#[allow(dead_code)]
pub async fn mount_token(server: &MockServer, status: u16, body: Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// What a [`MockAgent`] does once it is handed the authorization URL.
#[allow(dead_code)]
pub enum AgentBehavior {
    /// Redirect with `code` and the issued state.
    Approve(String),
    /// Redirect with `error=<error>` and the issued state.
    Deny(String),
    /// Redirect with `code` and a forged state.
    ForgeState(String),
    /// Report that the user closed the page.
    Abandon,
    /// Never return.
    Hang,
}

/// In-process stand-in for the browser leg of the flow.
#[allow(dead_code)]
pub struct MockAgent {
    behavior: AgentBehavior,
    /// Notified as soon as `authorize` is entered.
    pub started: Arc<Notify>,
    /// `code_challenge` from the last authorization URL seen.
    pub challenge: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl MockAgent {
    pub fn new(behavior: AgentBehavior) -> Self {
        Self {
            behavior,
            started: Arc::new(Notify::new()),
            challenge: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AuthorizationAgent for MockAgent {
    async fn authorize(
        &self,
        authorization_url: &Url,
        redirect_uri: &str,
    ) -> Result<Option<String>, SpotlinkError> {
        self.started.notify_one();
        let param = |name: &str| {
            authorization_url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        *self.challenge.lock().unwrap() = param("code_challenge");
        let state = param("state").unwrap_or_default();

        match &self.behavior {
            AgentBehavior::Approve(code) => {
                Ok(Some(format!("{redirect_uri}?code={code}&state={state}")))
            }
            AgentBehavior::Deny(error) => {
                Ok(Some(format!("{redirect_uri}?error={error}&state={state}")))
            }
            AgentBehavior::ForgeState(code) => {
                Ok(Some(format!("{redirect_uri}?code={code}&state=forged")))
            }
            AgentBehavior::Abandon => Ok(None),
            AgentBehavior::Hang => std::future::pending().await,
        }
    }
}
