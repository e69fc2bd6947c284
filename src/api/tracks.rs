use serde::Deserialize;

use crate::client::{encode_segment, ApiClient};
use crate::error::ApiError;
use crate::types::Track;

use super::join_ids;

#[derive(Deserialize)]
struct TracksResponse {
    tracks: Vec<Option<Track>>,
}

impl ApiClient {
    pub async fn track(&self, id: &str) -> Result<Track, ApiError> {
        self.get(&format!("/tracks/{}", encode_segment(id)), &[]).await
    }

    /// Look up several tracks at once.
    ///
    /// The result lines up with `ids`; unknown ids come back as `None`.
    pub async fn tracks<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Option<Track>>, ApiError> {
        let resp: TracksResponse = self.get("/tracks", &[("ids", join_ids(ids))]).await?;
        Ok(resp.tracks)
    }
}
