//! Playback commands.
//!
//! Both commands target the user's active device unless a `device_id` is
//! given, and return nothing on success (`204 No Content`). Without an active
//! device the service answers `404` with reason `NO_ACTIVE_DEVICE`; free
//! accounts get `403` with `PREMIUM_REQUIRED`.

use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;

fn device_query(device_id: Option<&str>) -> Vec<(&'static str, String)> {
    device_id
        .map(|id| vec![("device_id", id.to_string())])
        .unwrap_or_default()
}

impl ApiClient {
    /// Skip to the next track in the user's queue.
    pub async fn next_track(&self, device_id: Option<&str>) -> Result<(), ApiError> {
        self.command(Method::POST, "/me/player/next", &device_query(device_id))
            .await
    }

    pub async fn pause_playback(&self, device_id: Option<&str>) -> Result<(), ApiError> {
        self.command(Method::PUT, "/me/player/pause", &device_query(device_id))
            .await
    }
}
