use serde::Deserialize;
use tracing::debug;

use crate::client::error_from_body;
use crate::credentials::Credential;
use crate::error::SpotlinkError;

/// Raw token response from the OAuth server. Every field is optional so a
/// missing `access_token` surfaces as our own error rather than a serde one.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

impl TokenResponse {
    fn into_credential(self) -> Result<Credential, SpotlinkError> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SpotlinkError::TokenExchange("Token response did not contain an access_token".to_string())
            })?;
        // An expiry that does not fit in a timestamp is dropped rather than trusted.
        let expires_at = self.expires_in.and_then(|secs| {
            chrono::TimeDelta::try_seconds(secs)
                .and_then(|delta| chrono::Utc::now().checked_add_signed(delta))
        });
        Ok(Credential {
            access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
            scope: self.scope,
        })
    }
}

/// Trade an authorization code and its PKCE verifier for a [`Credential`].
///
/// One attempt; the request is unauthenticated apart from the verifier.
pub async fn exchange_code(
    http: &reqwest::Client,
    token_endpoint: &str,
    code: &str,
    code_verifier: &str,
    redirect_uri: &str,
    client_id: &str,
) -> Result<Credential, SpotlinkError> {
    debug!(token_endpoint, "exchanging authorization code");
    let resp = http
        .post(token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
            ("code_verifier", code_verifier),
        ])
        .send()
        .await
        .map_err(|e| SpotlinkError::TokenExchange(format!("Token exchange request failed: {e}")))?;

    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| SpotlinkError::TokenExchange(format!("Failed to read token response: {e}")))?;

    if !status.is_success() {
        let err = error_from_body(status, &body);
        let detail = match err.code {
            Some(code) if code != err.message => format!("{code}: {}", err.message),
            _ => err.message,
        };
        return Err(SpotlinkError::TokenExchange(format!(
            "Token endpoint returned {status}: {detail}"
        )));
    }

    let token_resp: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
        SpotlinkError::TokenExchange(format!("Failed to parse token response: {e}"))
    })?;

    token_resp.into_credential()
}
