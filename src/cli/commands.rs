//! Handlers behind each `spotlink` subcommand.
//!
//! Everything except `login` starts from an access token (`--token` or
//! `SPOTLINK_TOKEN`) and goes through [`Session::login_with_token`], so the
//! profile fetch doubles as a token check.

use std::io::IsTerminal;

use crate::cli::output::{self, OutputMode};
use crate::config::AuthConfig;
use crate::error::SpotlinkError;
use crate::oauth::LoopbackAgent;
use crate::session::Session;
use crate::types::{FollowType, SearchType, TimeRange};

fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// A session already logged in with `token`.
pub async fn token_session(config: AuthConfig, token: Option<&str>) -> Result<Session, SpotlinkError> {
    let token = token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        SpotlinkError::InvalidConfig(
            "No access token. Pass --token or set SPOTLINK_TOKEN (run `spotlink login` to get one)"
                .to_string(),
        )
    })?;
    let session = Session::new(config)?;
    session.login_with_token(token.trim()).await?;
    Ok(session)
}

/// Run the browser flow and print the resulting access token.
pub async fn run_login(config: AuthConfig, open_browser: bool, mode: OutputMode) -> Result<(), SpotlinkError> {
    let session = Session::new(config)?;
    let agent = LoopbackAgent::new().open_browser(open_browser);
    let user = session.login(&agent).await?;
    let credential = session.client().credentials().current().ok_or_else(|| {
        SpotlinkError::InvalidFlowState("login finished without a credential".to_string())
    })?;

    match mode {
        OutputMode::Json => {
            let json = serde_json::json!({
                "user": user,
                "accessToken": credential.access_token,
                "tokenType": credential.token_type,
                "expiresAt": credential.expires_at,
                "scope": credential.scope,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputMode::Pretty => {
            eprintln!("Logged in as {}", user.name());
            if let Some(expires) = credential.expires_at {
                eprintln!("Token expires: {}", expires.to_rfc3339());
            }
            println!("{}", credential.access_token);
        }
    }
    Ok(())
}

pub async fn run_me(session: &Session, mode: OutputMode) -> Result<(), SpotlinkError> {
    let user = session
        .user()
        .ok_or_else(|| SpotlinkError::InvalidFlowState("session has no user".to_string()))?;
    output::print_user(&user, mode, is_tty());
    Ok(())
}

pub async fn run_top(
    session: &Session,
    limit: u32,
    offset: u32,
    time_range: TimeRange,
    mode: OutputMode,
) -> Result<(), SpotlinkError> {
    let tracks = session.client().top_tracks(limit, offset, time_range).await?;
    output::print_tracks(&tracks, mode, is_tty());
    Ok(())
}

pub async fn run_search(
    session: &Session,
    query: &str,
    search_type: SearchType,
    limit: u32,
    mode: OutputMode,
) -> Result<(), SpotlinkError> {
    let result = session.client().search(query, search_type, limit).await?;
    output::print_search(&result, mode, is_tty());
    Ok(())
}

pub async fn run_track(session: &Session, ids: &[String], mode: OutputMode) -> Result<(), SpotlinkError> {
    if let [id] = ids {
        let track = session.client().track(id).await?;
        output::print_track(&track, mode, is_tty());
    } else {
        let tracks: Vec<_> = session.client().tracks(ids).await?.into_iter().flatten().collect();
        output::print_tracks(&tracks, mode, is_tty());
    }
    Ok(())
}

pub async fn run_saved(session: &Session, limit: u32, offset: u32, mode: OutputMode) -> Result<(), SpotlinkError> {
    let page = session.client().saved_tracks(limit, offset).await?;
    output::print_saved(&page, mode, is_tty());
    Ok(())
}

pub async fn run_saved_contains(session: &Session, ids: &[String], mode: OutputMode) -> Result<(), SpotlinkError> {
    let flags = session.client().saved_tracks_contains(ids).await?;
    output::print_contains(ids, &flags, mode, is_tty());
    Ok(())
}

pub async fn run_artist(session: &Session, id: &str, mode: OutputMode) -> Result<(), SpotlinkError> {
    let artist = session.client().artist(id).await?;
    output::print_artist(&artist, mode, is_tty());
    Ok(())
}

pub async fn run_following(session: &Session, limit: u32, mode: OutputMode) -> Result<(), SpotlinkError> {
    let page = session.client().followed_artists(limit).await?;
    output::print_followed(&page, mode, is_tty());
    Ok(())
}

pub async fn run_following_contains(
    session: &Session,
    ids: &[String],
    follow_type: FollowType,
    mode: OutputMode,
) -> Result<(), SpotlinkError> {
    let flags = session.client().following_contains(ids, follow_type).await?;
    output::print_contains(ids, &flags, mode, is_tty());
    Ok(())
}

pub async fn run_next(session: &Session, device: Option<&str>, mode: OutputMode) -> Result<(), SpotlinkError> {
    session.client().next_track(device).await?;
    output::print_done("Skipped to next track", mode, is_tty());
    Ok(())
}

pub async fn run_pause(session: &Session, device: Option<&str>, mode: OutputMode) -> Result<(), SpotlinkError> {
    session.client().pause_playback(device).await?;
    output::print_done("Playback paused", mode, is_tty());
    Ok(())
}
