use serde::Deserialize;

use crate::client::{encode_segment, ApiClient};
use crate::error::ApiError;
use crate::types::{Artist, CursorPaging, FollowType};

use super::join_ids;

#[derive(Deserialize)]
struct FollowedArtistsResponse {
    artists: CursorPaging<Artist>,
}

impl ApiClient {
    pub async fn artist(&self, id: &str) -> Result<Artist, ApiError> {
        self.get(&format!("/artists/{}", encode_segment(id)), &[]).await
    }

    /// Artists the user follows. Paged by cursor; see [`CursorPaging::cursors`].
    pub async fn followed_artists(&self, limit: u32) -> Result<CursorPaging<Artist>, ApiError> {
        let resp: FollowedArtistsResponse = self
            .get(
                "/me/following",
                &[("type", "artist".to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(resp.artists)
    }

    /// Whether the user follows each of `ids`, in order.
    pub async fn following_contains<S: AsRef<str>>(
        &self,
        ids: &[S],
        follow_type: FollowType,
    ) -> Result<Vec<bool>, ApiError> {
        self.get(
            "/me/following/contains",
            &[
                ("type", follow_type.as_str().to_string()),
                ("ids", join_ids(ids)),
            ],
        )
        .await
    }
}
