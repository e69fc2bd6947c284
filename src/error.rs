use std::fmt;
use std::path::PathBuf;

/// A failed Web API call.
///
/// `status` is `None` when the request never produced an HTTP response
/// (connection refused, TLS failure, body read error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    /// Machine-readable reason from the service, e.g. `NO_ACTIVE_DEVICE`.
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.code.as_deref()) {
            (Some(status), Some(code)) => {
                write!(f, "API error (HTTP {status}, {code}): {}", self.message)
            }
            (Some(status), None) => write!(f, "API error (HTTP {status}): {}", self.message),
            (None, _) => write!(f, "API request failed: {}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, thiserror::Error)]
pub enum SpotlinkError {
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Authorization was cancelled before a redirect was received")]
    AuthorizationCancelled,

    #[error("Malformed authorization redirect: {0}")]
    MalformedRedirect(String),

    #[error("Authorization redirect state does not match the issued request")]
    StateMismatch,

    #[error("A login is already in progress")]
    FlowInProgress,

    #[error("Invalid authorization flow state: {0}")]
    InvalidFlowState(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Error in config {}: {detail}", path.display())]
    ConfigError { path: PathBuf, detail: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SpotlinkError {
    /// Error code string for structured JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            SpotlinkError::AuthorizationDenied(_) => "authorization_denied",
            SpotlinkError::AuthorizationCancelled => "authorization_cancelled",
            SpotlinkError::MalformedRedirect(_) => "malformed_redirect",
            SpotlinkError::StateMismatch => "state_mismatch",
            SpotlinkError::FlowInProgress => "flow_in_progress",
            SpotlinkError::InvalidFlowState(_) => "invalid_flow_state",
            SpotlinkError::TokenExchange(_) => "token_exchange_error",
            SpotlinkError::Api(_) => "api_error",
            SpotlinkError::ConfigError { .. } => "config_error",
            SpotlinkError::InvalidConfig(_) => "config_error",
            SpotlinkError::IoError(_) => "io_error",
        }
    }

    /// Whether this error belongs to the authorization step of a login.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            SpotlinkError::AuthorizationDenied(_)
                | SpotlinkError::AuthorizationCancelled
                | SpotlinkError::MalformedRedirect(_)
                | SpotlinkError::StateMismatch
                | SpotlinkError::FlowInProgress
                | SpotlinkError::InvalidFlowState(_)
        )
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SpotlinkError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Produce a structured JSON error object.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(api) = self.api_error() {
            if let Some(status) = api.status {
                obj.insert("status".into(), serde_json::Value::from(status));
            }
            if let Some(ref reason) = api.code {
                obj.insert("reason".into(), serde_json::Value::String(reason.clone()));
            }
        }
        obj.insert("message".into(), serde_json::Value::String(self.to_string()));
        obj.insert("code".into(), serde_json::Value::String(self.code().to_string()));
        serde_json::json!({ "error": obj })
    }
}
