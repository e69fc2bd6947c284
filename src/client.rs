//! Authenticated request primitive for the Web API.
//!
//! Every endpoint wrapper in [`crate::api`] funnels through
//! [`ApiClient::request_json`]. Failures of any kind come back as
//! [`ApiError`]; nothing is retried.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, SpotlinkError};

pub type Query<'a> = [(&'a str, String)];

/// Web API client bound to one base URL and one [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: CredentialStore) -> Result<Self, SpotlinkError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spotlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SpotlinkError::InvalidConfig(format!("Cannot build HTTP client: {e}")))?;
        Self::with_http_client(http, base_url, credentials)
    }

    /// Use a caller-configured `reqwest::Client` (proxies, timeouts, TLS roots).
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: CredentialStore,
    ) -> Result<Self, SpotlinkError> {
        let mut base_url = Url::parse(base_url).map_err(|e| {
            SpotlinkError::InvalidConfig(format!("Invalid API base URL '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SpotlinkError::InvalidConfig(format!(
                "API base URL '{base_url}' cannot have paths joined onto it"
            )));
        }
        // Url::join replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The underlying HTTP client, used unauthenticated for the token endpoint.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (with or without a leading `/`) against the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::transport(format!("Invalid request path '{path}': {e}")))
    }

    /// Build a request signed with whatever credential is active right now.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
    ) -> Result<reqwest::Request, ApiError> {
        let url = self.endpoint_url(path)?;
        let method_has_body = method == Method::POST || method == Method::PUT;
        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(credential) = self.credentials.current() {
            let value = HeaderValue::from_str(&format!("Bearer {}", credential.access_token))
                .map_err(|_| ApiError::transport("Access token contains invalid header characters"))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        match body {
            Some(body) => builder = builder.json(body),
            // Bodiless POST/PUT still needs `Content-Length: 0` or the service answers 411
            None if method_has_body => builder = builder.body(Vec::<u8>::new()),
            None => {}
        }
        builder
            .build()
            .map_err(|e| ApiError::transport(format!("Cannot build request: {e}")))
    }

    /// Send one request and return the parsed JSON body.
    ///
    /// An empty success body (e.g. `204 No Content`) comes back as
    /// [`Value::Null`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method, path, query, body)?;
        debug!(method = %request.method(), url = %request.url().path(), "api request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::http(status.as_u16(), None, format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let err = error_from_body(status, &bytes);
            debug!(status = status.as_u16(), "api request failed");
            return Err(err);
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::http(status.as_u16(), None, format!("Response is not valid JSON: {e}"))
        })
    }

    /// [`request`](Self::request), then deserialize into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self.request(method, path, query, body).await?;
        serde_json::from_value(value).map_err(|e| ApiError {
            // The call itself succeeded; only the shape was wrong.
            status: Some(200),
            code: None,
            message: format!("Unexpected response shape from {path}: {e}"),
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, ApiError> {
        self.request_json(Method::GET, path, query, None).await
    }

    /// Fire a command endpoint whose success carries no payload.
    pub(crate) async fn command(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
    ) -> Result<(), ApiError> {
        self.request(method, path, query, None).await.map(|_| ())
    }
}

/// Map an error response to an [`ApiError`].
///
/// Understands both the Web API envelope
/// (`{"error": {"status": 401, "message": "...", "reason": "..."}}`) and the
/// OAuth one (`{"error": "invalid_grant", "error_description": "..."}`).
pub(crate) fn error_from_body(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    let fallback = || {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            text
        }
    };

    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let (code, message) = match parsed.as_ref().and_then(|v| v.get("error")) {
        Some(Value::Object(err)) => (
            err.get("reason").and_then(Value::as_str).map(str::to_string),
            err.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(fallback),
        ),
        Some(Value::String(code)) => (
            Some(code.clone()),
            parsed
                .as_ref()
                .and_then(|v| v.get("error_description"))
                .and_then(Value::as_str)
                .unwrap_or(code)
                .to_string(),
        ),
        _ => (None, fallback()),
    };

    ApiError::http(status.as_u16(), code, message)
}

/// Percent-encode a value for use as a single path segment.
pub(crate) fn encode_segment(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(b as char);
            }
            _ => {
                result.push('%');
                result.push_str(&format!("{b:02X}"));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::credentials::Credential;

    fn client() -> ApiClient {
        ApiClient::new("https://api.spotify.com/v1", CredentialStore::new()).unwrap()
    }

    #[test]
    fn endpoint_url_keeps_base_path() {
        let c = client();
        assert_eq!(
            c.endpoint_url("/me/top/tracks").unwrap().as_str(),
            "https://api.spotify.com/v1/me/top/tracks"
        );
        assert_eq!(
            c.endpoint_url("search").unwrap().as_str(),
            "https://api.spotify.com/v1/search"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = ApiClient::new("not a url", CredentialStore::new()).unwrap_err();
        assert!(err.to_string().contains("Invalid API base URL"), "got: {err}");
    }

    #[test]
    fn unauthenticated_request_has_no_header() {
        let c = client();
        let req = c.build_request(Method::GET, "/me", &[], None).unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn set_is_visible_to_next_request() {
        let c = client();
        c.credentials().set(Credential::bearer("tok-1"));
        let req = c.build_request(Method::GET, "/me", &[], None).unwrap();
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer tok-1");

        c.credentials().set(Credential::bearer("tok-2"));
        let req = c.build_request(Method::GET, "/me", &[], None).unwrap();
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer tok-2");
    }

    #[test]
    fn clear_is_visible_to_next_request() {
        let c = client();
        c.credentials().set(Credential::bearer("tok"));
        let signed = c.build_request(Method::GET, "/me", &[], None).unwrap();
        c.credentials().clear();
        let unsigned = c.build_request(Method::GET, "/me", &[], None).unwrap();

        // the already-built request keeps its signature
        assert_eq!(signed.headers()[AUTHORIZATION], "Bearer tok");
        assert!(unsigned.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn query_is_encoded() {
        let c = client();
        let req = c
            .build_request(
                Method::GET,
                "/search",
                &[("q", "daft punk".to_string()), ("type", "artist".to_string())],
                None,
            )
            .unwrap();
        assert_eq!(req.url().query(), Some("q=daft+punk&type=artist"));
    }

    #[test]
    fn web_api_error_envelope() {
        let err = error_from_body(
            StatusCode::NOT_FOUND,
            br#"{"error":{"status":404,"message":"Player command failed: No active device found","reason":"NO_ACTIVE_DEVICE"}}"#,
        );
        assert_eq!(err.status, Some(404));
        assert_eq!(err.code.as_deref(), Some("NO_ACTIVE_DEVICE"));
        assert_eq!(err.message, "Player command failed: No active device found");
    }

    #[test]
    fn oauth_error_envelope() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            br#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
        );
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("invalid_grant"));
        assert_eq!(err.message, "Invalid authorization code");
    }

    #[test]
    fn plain_text_and_empty_error_bodies() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.message, "upstream down");

        let err = error_from_body(StatusCode::TOO_MANY_REQUESTS, b"");
        assert_eq!(err.status, Some(429));
        assert_eq!(err.message, "Too Many Requests");
    }

    #[test]
    fn encode_segment_escapes_reserved() {
        assert_eq!(encode_segment("4uLU6hMCjMI75M1A2tKUQC"), "4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(encode_segment("a/b?c"), "a%2Fb%3Fc");
    }
}
