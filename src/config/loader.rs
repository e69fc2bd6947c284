use std::path::{Path, PathBuf};

use crate::error::SpotlinkError;

use super::env::expand_auth_config;
use super::types::AuthConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SPOTLINK_CONFIG";

/// Strip JSONC comments (// line comments and /* */ block comments) from input.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(ch) = chars.next() {
        if escape_next {
            escape_next = false;
            result.push(ch);
            continue;
        }

        if in_string {
            result.push(ch);
            if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            result.push(ch);
            continue;
        }

        if ch == '/' {
            match chars.peek() {
                Some(&'/') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                Some(&'*') => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        // Keep line numbers stable for serde error messages
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                }
                _ => {
                    result.push(ch);
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Discover config files in precedence order (highest first).
///
/// Precedence:
/// 1. `--config` CLI flag
/// 2. `SPOTLINK_CONFIG` env var
/// 3. `./config/spotlink.json` (project-level)
/// 4. `~/.spotlink/spotlink.json` or `~/.spotlink/spotlink.jsonc` (home-level)
pub fn discover_config_files(cli_config: Option<&str>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Some(path) = cli_config {
        let p = PathBuf::from(path);
        if p.exists() {
            files.push(p);
        }
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        let p = PathBuf::from(&env_path);
        if p.exists() && !files.contains(&p) {
            files.push(p);
        }
    }

    let project_config = PathBuf::from("./config/spotlink.json");
    if project_config.exists() && !files.contains(&project_config) {
        files.push(project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_json = home.join(".spotlink").join("spotlink.json");
        let home_jsonc = home.join(".spotlink").join("spotlink.jsonc");
        if home_json.exists() && !files.contains(&home_json) {
            files.push(home_json);
        } else if home_jsonc.exists() && !files.contains(&home_jsonc) {
            files.push(home_jsonc);
        }
    }

    files
}

/// Load a single config file, stripping JSONC comments before parsing.
pub fn load_config_file(path: &Path) -> Result<AuthConfig, SpotlinkError> {
    let content = std::fs::read_to_string(path).map_err(|e| SpotlinkError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Cannot read file: {}", e),
    })?;

    let stripped = strip_jsonc_comments(&content);
    serde_json::from_str::<AuthConfig>(&stripped).map_err(|e| SpotlinkError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Invalid JSON: {}", e),
    })
}

/// Load the effective configuration.
///
/// The highest-precedence file wins outright; there is no field-level merge.
/// With no file present the built-in defaults are used. Environment references
/// are expanded either way. A `--config` path that does not exist is an error.
pub fn load_config(cli_config: Option<&str>) -> Result<AuthConfig, SpotlinkError> {
    if let Some(path) = cli_config {
        if !Path::new(path).exists() {
            return Err(SpotlinkError::ConfigError {
                path: PathBuf::from(path),
                detail: "File does not exist".to_string(),
            });
        }
    }

    let mut config = match discover_config_files(cli_config).first() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config_file(path)?
        }
        None => {
            tracing::debug!("no config file found, using defaults");
            AuthConfig::default()
        }
    };

    expand_auth_config(&mut config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_line_comments() {
        let input = r#"{
  // This is a comment
  "key": "value" // inline comment
}"#;
        let result = strip_jsonc_comments(input);
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["key"], "value");
    }

    #[test]
    fn strip_multiline_block_comments() {
        let input = r#"{
  /*
   * multi-line
   * block comment
   */
  "key": "value"
}"#;
        let result = strip_jsonc_comments(input);
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["key"], "value");
    }

    #[test]
    fn preserve_strings_with_slashes() {
        let input = r#"{
  "tokenEndpoint": "https://accounts.spotify.com/api/token",
  "pattern": "a//b"
}"#;
        let result = strip_jsonc_comments(input);
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["tokenEndpoint"], "https://accounts.spotify.com/api/token");
        assert_eq!(parsed["pattern"], "a//b");
    }

    #[test]
    fn no_comments() {
        let input = r#"{"key": "value"}"#;
        assert_eq!(strip_jsonc_comments(input), input);
    }

    #[test]
    fn discover_skips_missing_cli_path() {
        let files = discover_config_files(Some("/nonexistent/path/spotlink.json"));
        for f in &files {
            assert!(f.exists());
        }
    }

    #[test]
    fn load_config_file_parses_jsonc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spotlink.jsonc");
        std::fs::write(
            &path,
            r#"{
  // registered in the developer dashboard
  "clientId": "my-client",
  "scopes": ["user-top-read", "user-read-email"],
  "redirectUri": "http://127.0.0.1:7777/cb"
}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.client_id, "my-client");
        assert_eq!(config.scopes, vec!["user-top-read", "user-read-email"]);
        assert_eq!(config.redirect_uri, "http://127.0.0.1:7777/cb");
    }

    #[test]
    fn load_config_prefers_cli_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spotlink.json");
        std::fs::write(&path, r#"{"clientId": "from-cli-flag"}"#).unwrap();

        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.client_id, "from-cli-flag");
    }

    #[test]
    fn load_config_missing_cli_path_errors() {
        let err = load_config(Some("/nonexistent/spotlink.json")).unwrap_err();
        assert!(err.to_string().contains("does not exist"), "got: {err}");
    }

    #[test]
    fn load_config_file_error_on_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not valid json at all").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn load_config_file_error_on_missing_file() {
        let err = load_config_file(Path::new("/nonexistent/file.json")).unwrap_err();
        assert!(err.to_string().contains("Cannot read file"));
    }
}
