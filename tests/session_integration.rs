use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use spotlink::oauth::compute_challenge;
use spotlink::{Session, SpotlinkError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::http_mock::{mount_token, mount_user, AgentBehavior, MockAgent};

fn token_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-private user-top-read"
    })
}

#[tokio::test]
async fn login_installs_credential_and_loads_user() {
    let server = MockServer::start().await;
    mount_token(&server, 200, token_body("at-123"), 1).await;
    mount_user(&server, "at-123").await;

    let config = common::mock_config(&server);
    let session = Session::new(config.clone()).unwrap();
    let mut updates = session.subscribe();
    let agent = MockAgent::new(AgentBehavior::Approve("auth-code".into()));

    let user = session.login(&agent).await.unwrap();
    assert_eq!(user.id, "wizzler");
    assert_eq!(user.name(), "JM Wizzler");

    let snap = session.snapshot();
    assert!(snap.is_authenticated);
    assert!(!snap.loading);
    assert!(snap.error.is_none());
    assert_eq!(snap.user.unwrap().id, "wizzler");
    assert!(updates.has_changed().unwrap());
    assert!(updates.borrow_and_update().is_authenticated);

    let credential = session.client().credentials().current().unwrap();
    assert_eq!(credential.access_token, "at-123");
    assert!(credential.expires_at.is_some());

    let requests = server.received_requests().await.unwrap();
    let exchange = requests
        .iter()
        .find(|r| r.url.path() == "/api/token")
        .unwrap();
    let form = form_fields(&exchange.body);
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "auth-code");
    assert_eq!(form["client_id"], "test-client");
    assert_eq!(form["redirect_uri"], config.redirect_uri);

    // The verifier sent to the token endpoint must match the challenge in the
    // authorization URL.
    let challenge = agent.challenge.lock().unwrap().clone().unwrap();
    assert_eq!(compute_challenge(&form["code_verifier"]), challenge);
}

fn form_fields(body: &[u8]) -> HashMap<String, String> {
    let mut url = reqwest::Url::parse("http://localhost/").unwrap();
    url.set_query(Some(&String::from_utf8_lossy(body)));
    url.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn missing_access_token_leaves_store_untouched() {
    let server = MockServer::start().await;
    mount_user(&server, "old-token").await;
    mount_token(&server, 200, json!({ "token_type": "Bearer", "expires_in": 3600 }), 1).await;

    let session = common::mock_session(&server);
    session.login_with_token("old-token").await.unwrap();

    let agent = MockAgent::new(AgentBehavior::Approve("auth-code".into()));
    let err = session.login(&agent).await.unwrap_err();
    assert!(matches!(err, SpotlinkError::TokenExchange(_)), "got: {err}");

    let credential = session.client().credentials().current().unwrap();
    assert_eq!(credential.access_token, "old-token");
    let snap = session.snapshot();
    assert!(snap.is_authenticated);
    assert_eq!(snap.error.unwrap().code, "token_exchange_error");
}

#[tokio::test]
async fn token_endpoint_error_is_reported() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        400,
        json!({ "error": "invalid_grant", "error_description": "Invalid authorization code" }),
        1,
    )
    .await;

    let session = common::mock_session(&server);
    let agent = MockAgent::new(AgentBehavior::Approve("stale".into()));
    let err = session.login(&agent).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("invalid_grant"), "got: {msg}");
    assert!(msg.contains("Invalid authorization code"), "got: {msg}");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn access_denied_never_calls_token_endpoint() {
    let server = MockServer::start().await;
    mount_token(&server, 200, token_body("never"), 0).await;

    let session = common::mock_session(&server);
    let agent = MockAgent::new(AgentBehavior::Deny("access_denied".into()));
    let err = session.login(&agent).await.unwrap_err();

    assert!(matches!(err, SpotlinkError::AuthorizationDenied(ref r) if r == "access_denied"));
    let snap = session.snapshot();
    assert!(!snap.is_authenticated);
    assert!(!snap.loading);
    assert_eq!(snap.error.unwrap().code, "authorization_denied");
    assert!(!session.client().credentials().is_set());
}

#[tokio::test]
async fn forged_state_is_rejected() {
    let server = MockServer::start().await;
    mount_token(&server, 200, token_body("never"), 0).await;

    let session = common::mock_session(&server);
    let agent = MockAgent::new(AgentBehavior::ForgeState("auth-code".into()));
    let err = session.login(&agent).await.unwrap_err();
    assert!(matches!(err, SpotlinkError::StateMismatch));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn abandoned_login_is_cancelled() {
    let server = MockServer::start().await;
    mount_token(&server, 200, token_body("never"), 0).await;

    let session = common::mock_session(&server);
    let err = session
        .login(&MockAgent::new(AgentBehavior::Abandon))
        .await
        .unwrap_err();
    assert!(matches!(err, SpotlinkError::AuthorizationCancelled));
}

#[tokio::test]
async fn redirect_timeout_cancels_login() {
    let server = MockServer::start().await;
    mount_token(&server, 200, token_body("never"), 0).await;

    let mut config = common::mock_config(&server);
    config.redirect_timeout_ms = 50;
    let session = Session::new(config).unwrap();

    let err = session
        .login(&MockAgent::new(AgentBehavior::Hang))
        .await
        .unwrap_err();
    assert!(matches!(err, SpotlinkError::AuthorizationCancelled));
    assert!(!session.snapshot().loading);
}

#[tokio::test]
async fn missing_client_id_fails_before_agent() {
    let server = MockServer::start().await;
    let mut config = common::mock_config(&server);
    config.client_id = String::new();
    let session = Session::new(config).unwrap();

    let agent = MockAgent::new(AgentBehavior::Approve("auth-code".into()));
    let err = session.login(&agent).await.unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[tokio::test]
async fn second_login_while_pending_is_rejected() {
    let server = MockServer::start().await;
    mount_user(&server, "tok").await;

    let session = Arc::new(common::mock_session(&server));
    let agent = Arc::new(MockAgent::new(AgentBehavior::Hang));
    let started = agent.started.clone();

    let pending = {
        let session = session.clone();
        let agent = agent.clone();
        tokio::spawn(async move { session.login(agent.as_ref()).await })
    };
    started.notified().await;
    assert!(session.snapshot().loading);

    let second = MockAgent::new(AgentBehavior::Approve("auth-code".into()));
    assert!(matches!(
        session.login(&second).await.unwrap_err(),
        SpotlinkError::FlowInProgress
    ));
    assert!(matches!(
        session.login_with_token("tok").await.unwrap_err(),
        SpotlinkError::FlowInProgress
    ));
    // the pending flow was not disturbed
    assert!(session.snapshot().loading);
    assert!(session.snapshot().error.is_none());

    // dropping the pending login releases the marker
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());
    assert!(!session.snapshot().loading);
    session.login_with_token("tok").await.unwrap();
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn rejected_token_leaves_session_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "Invalid access token" }
        })))
        .mount(&server)
        .await;

    let session = common::mock_session(&server);
    let err = session.login_with_token("bad").await.unwrap_err();
    assert_eq!(err.api_error().unwrap().status, Some(401));

    let snap = session.snapshot();
    assert!(!snap.is_authenticated);
    assert!(snap.user.is_none());
    let recorded = snap.error.unwrap();
    assert_eq!(recorded.status, Some(401));
    assert!(!session.client().credentials().is_set());
}

#[tokio::test]
async fn logout_resets_state() {
    let server = MockServer::start().await;
    mount_user(&server, "tok").await;

    let session = common::mock_session(&server);
    session.login_with_token("tok").await.unwrap();
    assert!(session.is_authenticated());

    session.logout();
    let snap = session.snapshot();
    assert!(!snap.is_authenticated);
    assert!(snap.user.is_none());
    assert!(snap.error.is_none());
    assert!(!session.client().credentials().is_set());

    // refresh is a no-op once logged out
    assert!(session.refresh_user().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let session = common::mock_session(&server);
    session.login_with_token("tok").await.unwrap();

    let err = session.refresh_user().await.unwrap_err();
    assert_eq!(err.api_error().unwrap().status, Some(503));

    let snap = session.snapshot();
    assert!(snap.is_authenticated);
    assert_eq!(snap.user.unwrap().id, "wizzler");
    assert_eq!(snap.error.unwrap().status, Some(503));
    assert!(!snap.loading);
}

#[tokio::test]
async fn logout_during_failing_refresh_stays_clean() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string("Service Unavailable")
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let session = common::mock_session(&server);
    session.login_with_token("tok").await.unwrap();

    let (refreshed, ()) = tokio::join!(session.refresh_user(), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        session.logout();
    });
    assert_eq!(refreshed.unwrap_err().api_error().unwrap().status, Some(503));
    assert_eq!(session.snapshot(), spotlink::SessionSnapshot::default());
}

#[tokio::test]
async fn refresh_updates_user() {
    let server = MockServer::start().await;
    mount_user(&server, "tok").await;

    let session = common::mock_session(&server);
    session.login_with_token("tok").await.unwrap();
    let user = session.refresh_user().await.unwrap().unwrap();
    assert_eq!(user.email.as_deref(), Some("wizzler@example.com"));
}
