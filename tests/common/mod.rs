pub mod http_mock;

use serde_json::{json, Value};
use spotlink::config::AuthConfig;
use spotlink::credentials::CredentialStore;
use spotlink::{ApiClient, Session};
use wiremock::MockServer;

/// Config pointing every endpoint at `server`.
#[allow(dead_code)]
pub fn mock_config(server: &MockServer) -> AuthConfig {
    let mut config = AuthConfig::new("test-client");
    config.authorization_endpoint = format!("{}/authorize", server.uri());
    config.token_endpoint = format!("{}/api/token", server.uri());
    config.api_base_url = format!("{}/v1", server.uri());
    config.redirect_timeout_ms = 2_000;
    config
}

#[allow(dead_code)]
pub fn mock_session(server: &MockServer) -> Session {
    Session::new(mock_config(server)).unwrap()
}

#[allow(dead_code)]
pub fn mock_client(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/v1", server.uri()), CredentialStore::new()).unwrap()
}

/// A base URL nothing is listening on.
#[allow(dead_code)]
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/v1")
}

/// Create a temp directory with a spotlink.json config file.
#[allow(dead_code)]
pub fn temp_config_dir(config: &AuthConfig) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("spotlink.json");
    let json = serde_json::to_string_pretty(config).unwrap();
    std::fs::write(config_path, json).unwrap();
    dir
}

#[allow(dead_code)]
pub fn user_json() -> Value {
    json!({
        "id": "wizzler",
        "display_name": "JM Wizzler",
        "email": "wizzler@example.com",
        "country": "SE",
        "product": "premium",
        "followers": { "href": null, "total": 3829 },
        "images": [{ "url": "https://i.scdn.co/image/abc", "height": 300, "width": 300 }],
        "type": "user",
        "uri": "spotify:user:wizzler"
    })
}

#[allow(dead_code)]
pub fn track_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{ "id": "4tZwfgrHOc3mvqYlEYSvVi", "name": "Daft Punk" }],
        "album": {
            "id": "2noRn2Aes5aoNVsU6iWThc",
            "name": "Discovery",
            "images": [{ "url": "https://i.scdn.co/image/disc", "height": 640, "width": 640 }]
        },
        "duration_ms": 224000,
        "explicit": false,
        "popularity": 77,
        "preview_url": null,
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") }
    })
}

#[allow(dead_code)]
pub fn artist_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "genres": ["french house", "electro"],
        "followers": { "href": null, "total": 9000000 },
        "popularity": 81,
        "images": [],
        "external_urls": { "spotify": format!("https://open.spotify.com/artist/{id}") }
    })
}

/// A page of `n` tracks as returned by `/me/top/tracks`.
#[allow(dead_code)]
pub fn top_tracks_json(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| track_json(&format!("track{i}"), &format!("Song {i}")))
        .collect();
    json!({
        "items": items,
        "total": 50,
        "limit": n,
        "offset": 0,
        "next": "https://api.spotify.com/v1/me/top/tracks?offset=5&limit=5",
        "previous": null,
        "href": "https://api.spotify.com/v1/me/top/tracks"
    })
}
