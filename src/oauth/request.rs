use std::collections::BTreeSet;

use reqwest::Url;

use crate::error::SpotlinkError;

/// Parameters of one authorization attempt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    client_id: String,
    redirect_uri: String,
    scopes: BTreeSet<String>,
    code_challenge: String,
    state: String,
}

impl AuthorizationRequest {
    pub fn new<I, S>(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: I,
        code_challenge: impl Into<String>,
        state: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: scopes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
            code_challenge: code_challenge.into(),
            state: state.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn code_challenge(&self) -> &str {
        &self.code_challenge
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Space-separated scope list as sent in the `scope` parameter.
    pub fn scope_param(&self) -> String {
        self.scopes.iter().cloned().collect::<Vec<_>>().join(" ")
    }

    /// Full URL of the authorization page for this request.
    pub fn authorization_url(&self, authorization_endpoint: &str) -> Result<Url, SpotlinkError> {
        let scope = self.scope_param();
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_challenge", self.code_challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("state", self.state.as_str()),
        ];
        if !scope.is_empty() {
            params.insert(3, ("scope", scope.as_str()));
        }

        Url::parse_with_params(authorization_endpoint, &params).map_err(|e| {
            SpotlinkError::InvalidConfig(format!(
                "Invalid authorization endpoint '{authorization_endpoint}': {e}"
            ))
        })
    }
}
