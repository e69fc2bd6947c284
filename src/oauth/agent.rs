use async_trait::async_trait;
use reqwest::Url;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::SpotlinkError;
use crate::oauth::callback::listen_for_redirect;

/// Presents the authorization page to the user and captures the redirect.
///
/// This is the seam to whatever the embedding application uses: a system
/// browser with a loopback listener, an embedded web view, a custom URL
/// scheme handler.
#[async_trait]
pub trait AuthorizationAgent: Send + Sync {
    /// Show `authorization_url` and wait for the terminal redirect to
    /// `redirect_uri`.
    ///
    /// Returns the redirect (full URI or request target), or `None` if the
    /// user abandoned the flow.
    async fn authorize(
        &self,
        authorization_url: &Url,
        redirect_uri: &str,
    ) -> Result<Option<String>, SpotlinkError>;
}

/// Opens the system browser and listens on a loopback redirect URI such as
/// `http://127.0.0.1:8888/callback`.
#[derive(Debug, Clone)]
pub struct LoopbackAgent {
    open_browser: bool,
}

impl Default for LoopbackAgent {
    fn default() -> Self {
        Self { open_browser: true }
    }
}

impl LoopbackAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// When false, only log the URL for the user to open by hand.
    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }
}

#[async_trait]
impl AuthorizationAgent for LoopbackAgent {
    async fn authorize(
        &self,
        authorization_url: &Url,
        redirect_uri: &str,
    ) -> Result<Option<String>, SpotlinkError> {
        let (addr, path) = loopback_address(redirect_uri)?;

        // Bind before the browser can possibly redirect
        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, "listening for authorization redirect");

        if !self.open_browser || webbrowser::open(authorization_url.as_str()).is_err() {
            warn!("Open this URL to authorize:\n{authorization_url}");
        }

        let target = listen_for_redirect(listener, &path).await?;
        Ok(Some(target))
    }
}

/// Split a loopback redirect URI into a bind address and the callback path.
fn loopback_address(redirect_uri: &str) -> Result<(String, String), SpotlinkError> {
    let url = Url::parse(redirect_uri).map_err(|e| {
        SpotlinkError::InvalidConfig(format!("Invalid redirect URI '{redirect_uri}': {e}"))
    })?;
    if url.scheme() != "http" {
        return Err(SpotlinkError::InvalidConfig(format!(
            "Loopback redirect URI must use http://, got '{redirect_uri}'"
        )));
    }
    let host = match url.host_str() {
        Some("127.0.0.1") => "127.0.0.1",
        Some("localhost") => "127.0.0.1",
        Some("[::1]") => "[::1]",
        _ => {
            return Err(SpotlinkError::InvalidConfig(format!(
                "Redirect URI '{redirect_uri}' is not a loopback address"
            )))
        }
    };
    let port = url.port().ok_or_else(|| {
        SpotlinkError::InvalidConfig(format!(
            "Loopback redirect URI '{redirect_uri}' needs an explicit port"
        ))
    })?;
    Ok((format!("{host}:{port}"), url.path().to_string()))
}
