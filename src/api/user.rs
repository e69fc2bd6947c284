//! Current-user endpoints.
//!
//! `GET /me` returns the profile; `GET /me/top/tracks` returns a
//! [`Paging`] of tracks ranked by affinity over `time_range`.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{Paging, TimeRange, Track, User};

impl ApiClient {
    /// Profile of the user the active credential belongs to.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/me", &[]).await
    }

    /// The user's top tracks, returning just the `items` of the page.
    pub async fn top_tracks(
        &self,
        limit: u32,
        offset: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Track>, ApiError> {
        Ok(self.top_tracks_page(limit, offset, time_range).await?.items)
    }

    /// The full page behind [`top_tracks`](Self::top_tracks).
    pub async fn top_tracks_page(
        &self,
        limit: u32,
        offset: u32,
        time_range: TimeRange,
    ) -> Result<Paging<Track>, ApiError> {
        self.get(
            "/me/top/tracks",
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("time_range", time_range.as_str().to_string()),
            ],
        )
        .await
    }
}
