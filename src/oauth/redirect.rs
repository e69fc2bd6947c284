use reqwest::Url;

use crate::error::SpotlinkError;

/// Outcome of the browser leg of an authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    Success { code: String },
    Denied { reason: String },
    Cancelled,
}

impl AuthorizationResult {
    pub fn into_code(self) -> Result<String, SpotlinkError> {
        match self {
            AuthorizationResult::Success { code } => Ok(code),
            AuthorizationResult::Denied { reason } => Err(SpotlinkError::AuthorizationDenied(reason)),
            AuthorizationResult::Cancelled => Err(SpotlinkError::AuthorizationCancelled),
        }
    }
}

/// Classify the terminal redirect of a flow.
///
/// `redirect` is either a full redirect URI (`myapp://callback?code=...`) or a
/// bare request target (`/callback?code=...`); `None` means no redirect ever
/// arrived. An `error` parameter wins over `code`. A `code` is only accepted
/// when `state` matches `expected_state` exactly.
pub fn classify_redirect(
    redirect: Option<&str>,
    expected_state: &str,
) -> Result<AuthorizationResult, SpotlinkError> {
    let Some(redirect) = redirect else {
        return Ok(AuthorizationResult::Cancelled);
    };

    let url = parse_redirect_url(redirect)?;
    let mut code = None;
    let mut error = None;
    let mut error_description = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        let reason = match error_description {
            Some(desc) if !desc.is_empty() => format!("{error}: {desc}"),
            _ => error,
        };
        return Ok(AuthorizationResult::Denied { reason });
    }

    match code {
        Some(code) if !code.is_empty() => {
            if state.as_deref() != Some(expected_state) {
                return Err(SpotlinkError::StateMismatch);
            }
            Ok(AuthorizationResult::Success { code })
        }
        _ => Err(SpotlinkError::MalformedRedirect(
            "redirect carried neither a code nor an error".to_string(),
        )),
    }
}

fn parse_redirect_url(redirect: &str) -> Result<Url, SpotlinkError> {
    let base = Url::parse("http://localhost/").map_err(|e| {
        SpotlinkError::MalformedRedirect(format!("cannot build redirect base: {e}"))
    })?;
    Url::options()
        .base_url(Some(&base))
        .parse(redirect.trim())
        .map_err(|e| SpotlinkError::MalformedRedirect(format!("'{redirect}' is not a URL: {e}")))
}
