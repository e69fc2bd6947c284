use crate::error::SpotlinkError;

use super::types::AuthConfig;

/// Environment variable consulted when the config leaves `clientId` empty.
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";

/// Expand environment variable references in a string.
///
/// Supported syntaxes:
/// - `${VAR}` - replaced with env var value; error if unset
/// - `${VAR:-fallback}` - replaced with env var value, or fallback if unset or empty
/// - `$env:VAR` - same as `${VAR}`
pub fn expand_env_vars(input: &str) -> Result<String, SpotlinkError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(body) = after.strip_prefix('{') {
            let close = body.find('}').ok_or_else(|| {
                env_error(&format!("Unclosed variable reference: ${{{body}"))
            })?;
            let expr = &body[..close];
            match expr.split_once(":-") {
                Some((name, fallback)) => match std::env::var(name) {
                    Ok(val) if !val.is_empty() => result.push_str(&val),
                    _ => result.push_str(fallback),
                },
                None => result.push_str(&lookup(expr)?),
            }
            rest = &body[close + 1..];
            continue;
        }

        if let Some(tail) = after.strip_prefix("env:") {
            let end = tail
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            let name = &tail[..end];
            if name.is_empty() {
                return Err(env_error("Empty variable name in $env: reference"));
            }
            result.push_str(&lookup(name)?);
            rest = &tail[end..];
            continue;
        }

        // Not a recognized pattern, output the '$' literally
        result.push('$');
        rest = after;
    }

    result.push_str(rest);
    Ok(result)
}

fn lookup(name: &str) -> Result<String, SpotlinkError> {
    std::env::var(name)
        .map_err(|_| env_error(&format!("Environment variable '{name}' is not set")))
}

/// Expand environment variables in every string field of an [`AuthConfig`],
/// then fill an empty client id from `SPOTIFY_CLIENT_ID`.
pub fn expand_auth_config(config: &mut AuthConfig) -> Result<(), SpotlinkError> {
    config.client_id = expand_env_vars(&config.client_id)?;
    for scope in &mut config.scopes {
        *scope = expand_env_vars(scope)?;
    }
    config.authorization_endpoint = expand_env_vars(&config.authorization_endpoint)?;
    config.token_endpoint = expand_env_vars(&config.token_endpoint)?;
    config.redirect_uri = expand_env_vars(&config.redirect_uri)?;
    config.api_base_url = expand_env_vars(&config.api_base_url)?;

    if config.client_id.is_empty() {
        if let Ok(id) = std::env::var(CLIENT_ID_ENV) {
            config.client_id = id;
        }
    }
    Ok(())
}

fn env_error(detail: &str) -> SpotlinkError {
    SpotlinkError::ConfigError {
        path: std::path::PathBuf::from("<env>"),
        detail: detail.to_string(),
    }
}
