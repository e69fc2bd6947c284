use std::path::PathBuf;

use colored::Colorize;

use crate::cli::output::OutputMode;
use crate::config::loader::{discover_config_files, load_config};
use crate::config::AuthConfig;
use crate::error::SpotlinkError;

/// Display the effective configuration and the file it came from.
pub async fn run_config_show(cli_config: Option<&str>, mode: OutputMode) -> Result<(), SpotlinkError> {
    let config = load_config(cli_config)?;
    let source = discover_config_files(cli_config).into_iter().next();

    match mode {
        OutputMode::Json => {
            let json = serde_json::json!({
                "config": config,
                "source": source.as_ref().map(|p| p.display().to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputMode::Pretty => print_config(&config, source.as_ref(), atty_stdout()),
    }
    Ok(())
}

fn print_config(config: &AuthConfig, source: Option<&PathBuf>, is_tty: bool) {
    let label = |text: &str| {
        if is_tty {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    };

    let client_id = if config.client_id.is_empty() {
        "(not set)"
    } else {
        config.client_id.as_str()
    };
    println!("  {}: {}", label("Client ID"), client_id);
    println!("  {}: {}", label("Scopes"), config.scopes.join(" "));
    println!("  {}: {}", label("Authorize"), config.authorization_endpoint);
    println!("  {}: {}", label("Token"), config.token_endpoint);
    println!("  {}: {}", label("Redirect"), config.redirect_uri);
    println!("  {}: {}", label("API"), config.api_base_url);
    println!(
        "  {}: {} ms",
        label("Redirect timeout"),
        config.redirect_timeout_ms
    );
    let source = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    println!("  {}: {}", label("Source"), source);
}

fn atty_stdout() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}
