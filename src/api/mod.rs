//! Typed wrappers over [`ApiClient::request_json`](crate::client::ApiClient::request_json).
//!
//! Each wrapper is an `impl ApiClient` method with a fixed method and path.
//!
//! | Method                                | Endpoint                       |
//! |---------------------------------------|--------------------------------|
//! | [`ApiClient::current_user`]           | `GET /me`                      |
//! | [`ApiClient::top_tracks`]             | `GET /me/top/tracks`           |
//! | [`ApiClient::search`]                 | `GET /search`                  |
//! | [`ApiClient::track`]                  | `GET /tracks/{id}`             |
//! | [`ApiClient::tracks`]                 | `GET /tracks`                  |
//! | [`ApiClient::saved_tracks`]           | `GET /me/tracks`               |
//! | [`ApiClient::saved_tracks_contains`]  | `GET /me/tracks/contains`      |
//! | [`ApiClient::artist`]                 | `GET /artists/{id}`            |
//! | [`ApiClient::followed_artists`]       | `GET /me/following`            |
//! | [`ApiClient::following_contains`]     | `GET /me/following/contains`   |
//! | [`ApiClient::next_track`]             | `POST /me/player/next`         |
//! | [`ApiClient::pause_playback`]         | `PUT /me/player/pause`         |
//!
//! [`ApiClient`]: crate::client::ApiClient
//! [`ApiClient::current_user`]: crate::client::ApiClient::current_user
//! [`ApiClient::top_tracks`]: crate::client::ApiClient::top_tracks
//! [`ApiClient::search`]: crate::client::ApiClient::search
//! [`ApiClient::track`]: crate::client::ApiClient::track
//! [`ApiClient::tracks`]: crate::client::ApiClient::tracks
//! [`ApiClient::saved_tracks`]: crate::client::ApiClient::saved_tracks
//! [`ApiClient::saved_tracks_contains`]: crate::client::ApiClient::saved_tracks_contains
//! [`ApiClient::artist`]: crate::client::ApiClient::artist
//! [`ApiClient::followed_artists`]: crate::client::ApiClient::followed_artists
//! [`ApiClient::following_contains`]: crate::client::ApiClient::following_contains
//! [`ApiClient::next_track`]: crate::client::ApiClient::next_track
//! [`ApiClient::pause_playback`]: crate::client::ApiClient::pause_playback

mod artists;
mod library;
mod player;
mod search;
mod tracks;
mod user;

/// Join ids the way list endpoints expect them (`ids=a,b,c`).
fn join_ids<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter().map(|id| id.as_ref()).collect::<Vec<&str>>().join(",")
}
