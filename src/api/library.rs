//! Saved ("liked") tracks.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{Paging, SavedTrack};

use super::join_ids;

impl ApiClient {
    pub async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<Paging<SavedTrack>, ApiError> {
        self.get(
            "/me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    /// One flag per id, in the order given.
    pub async fn saved_tracks_contains<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<bool>, ApiError> {
        self.get("/me/tracks/contains", &[("ids", join_ids(ids))])
            .await
    }
}
