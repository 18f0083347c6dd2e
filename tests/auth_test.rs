use std::{collections::HashMap, net::SocketAddr, time::Duration as StdDuration};

use axum::{
    Form, Json, Router,
    extract::Query,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{Duration, TimeZone, Utc};
use monthlify::{
    api::LOGIN_COMPLETED,
    config::{self, Config},
    error::AppError,
    management::TokenStore,
    spotify::OAuthFlow,
    types::{Token, TokenResponse},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};

fn test_config() -> Config {
    Config {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

fn token(expiry: chrono::DateTime<Utc>) -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        token_type: "Bearer".to_string(),
        expiry,
    }
}

// Starts a fake token endpoint. Without a canned body it hands out
// `access-for-<code>`.
async fn spawn_token_endpoint(status: StatusCode, canned_body: Option<Value>) -> SocketAddr {
    let app = Router::new().route(
        "/api/token",
        post(move |Form(form): Form<HashMap<String, String>>| {
            let canned_body = canned_body.clone();
            async move {
                if let Some(body) = canned_body {
                    return (status, Json(body));
                }
                assert_eq!(form.get("grant_type").map(String::as_str), Some("authorization_code"));
                assert_eq!(
                    form.get("redirect_uri").map(String::as_str),
                    Some(config::REDIRECT_URI)
                );
                let code = form.get("code").cloned().unwrap_or_default();
                (
                    status,
                    Json(json!({
                        "access_token": format!("access-for-{}", code),
                        "token_type": "Bearer",
                        "scope": "user-library-read",
                        "expires_in": 3600,
                        "refresh_token": "refresh-token",
                    })),
                )
            }
        }),
    );

    serve(app).await
}

// Starts a fake accounts page answering `/authorize` with `status`.
async fn spawn_authorize_endpoint(status: StatusCode) -> SocketAddr {
    let app = Router::new().route(
        "/authorize",
        get(move |Query(query): Query<HashMap<String, String>>| async move {
            assert_eq!(query.get("state").map(String::as_str), Some("abc123"));
            (status, "authorize page")
        }),
    );

    serve(app).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_flow(token_addr: SocketAddr) -> OAuthFlow {
    OAuthFlow::new(&test_config())
        .with_endpoints(
            "https://accounts.example.com/authorize",
            format!("http://{}/api/token", token_addr),
        )
        .with_bind_address("127.0.0.1:0")
}

#[tokio::test]
async fn test_token_store_missing_file_is_absent() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));

    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let original = token(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap());

    store.save(&original).await.unwrap();
    let loaded = store.load().await.unwrap().unwrap();

    assert_eq!(loaded, original);
}

#[tokio::test]
async fn test_token_store_writes_indented_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".spotify-token");
    let store = TokenStore::new(&path);

    store
        .save(&token(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()))
        .await
        .unwrap();
    let content = std::fs::read_to_string(&path).unwrap();

    assert!(content.contains("\n  \"access_token\": \"access\""));
    for field in ["refresh_token", "token_type", "expiry"] {
        assert!(content.contains(field), "missing {}", field);
    }
}

#[tokio::test]
async fn test_token_store_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("nested/.spotify-token"));
    let mut second = token(Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap());
    second.access_token = "second".to_string();

    store
        .save(&token(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()))
        .await
        .unwrap();
    store.save(&second).await.unwrap();

    assert_eq!(store.load().await.unwrap().unwrap(), second);
}

#[tokio::test]
async fn test_token_store_corrupt_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".spotify-token");
    std::fs::write(&path, "{ not json").unwrap();

    let result = TokenStore::new(&path).load().await;

    assert!(matches!(result, Err(AppError::Json(_))));
}

#[test]
fn test_token_expiry() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    assert!(token(now - Duration::seconds(1)).is_expired(now));
    assert!(!token(now + Duration::seconds(1)).is_expired(now));
}

#[test]
fn test_token_response_expiry() {
    let obtained_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let response = |expires_in| TokenResponse {
        access_token: "access".to_string(),
        refresh_token: None,
        token_type: None,
        expires_in,
    };

    let token = response(3600).into_token(obtained_at).unwrap();
    assert_eq!(token.expiry, obtained_at + Duration::hours(1));
    assert_eq!(token.token_type, "Bearer");

    for expires_in in [i64::MAX, i64::MIN] {
        assert!(matches!(
            response(expires_in).into_token(obtained_at),
            Err(AppError::Auth(message)) if message.contains("expires_in")
        ));
    }
}

#[test]
fn test_authorize_url() {
    let url = OAuthFlow::new(&test_config()).authorize_url().unwrap();

    assert!(url.starts_with(config::SPOTIFY_AUTH_URL));
    assert!(url.contains("client_id=client-id"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("state=abc123"));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"));
    assert!(url.contains("user-library-read"));
    assert!(url.contains("playlist-modify-public"));
    assert!(!url.contains("client-secret"));
}

#[tokio::test]
async fn test_callback_completes_login() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;
    let flow = test_flow(token_addr);

    let pending = flow.listen(store.clone()).await.unwrap();
    let response = reqwest::get(format!(
        "http://{}/callback?code=the-code&state={}",
        pending.local_addr(),
        flow.state()
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), LOGIN_COMPLETED);

    let token = pending.wait().await.unwrap();
    assert_eq!(token.access_token, "access-for-the-code");
    assert_eq!(token.refresh_token, "refresh-token");
    assert!(token.expiry > Utc::now());

    assert_eq!(store.load().await.unwrap(), Some(token));
}

#[tokio::test]
async fn test_callback_state_mismatch() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;
    let flow = test_flow(token_addr);

    let pending = flow.listen(store.clone()).await.unwrap();
    let response = reqwest::get(format!(
        "http://{}/callback?code=the-code&state=forged",
        pending.local_addr()
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    match pending.wait().await {
        Err(AppError::StateMismatch { received, expected }) => {
            assert_eq!(received, "forged");
            assert_eq!(expected, "abc123");
        }
        other => panic!("expected state mismatch, got {:?}", other),
    }
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_callback_exchange_failure() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let token_addr = spawn_token_endpoint(
        StatusCode::BAD_REQUEST,
        Some(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code",
        })),
    )
    .await;
    let flow = test_flow(token_addr);

    let pending = flow.listen(store.clone()).await.unwrap();
    let response = reqwest::get(format!(
        "http://{}/callback?code=expired&state={}",
        pending.local_addr(),
        flow.state()
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    match pending.wait().await {
        Err(AppError::Auth(message)) => assert!(message.contains("Invalid authorization code")),
        other => panic!("expected auth error, got {:?}", other),
    }
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_callback_access_denied() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;
    let flow = test_flow(token_addr);

    let pending = flow.listen(store).await.unwrap();
    let response = reqwest::get(format!(
        "http://{}/callback?error=access_denied&state={}",
        pending.local_addr(),
        flow.state()
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert!(matches!(
        pending.wait().await,
        Err(AppError::Auth(reason)) if reason == "access_denied"
    ));
}

#[tokio::test]
async fn test_obtain_credential_uses_valid_cached_token() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let cached = token(Utc::now() + Duration::hours(1));
    store.save(&cached).await.unwrap();
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;

    let obtained = test_flow(token_addr).obtain_credential(&store).await.unwrap();

    assert_eq!(obtained, cached);
}

#[tokio::test]
async fn test_obtain_credential_rejects_corrupt_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".spotify-token");
    std::fs::write(&path, "garbage").unwrap();
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;

    let result = test_flow(token_addr)
        .obtain_credential(&TokenStore::new(&path))
        .await;

    assert!(matches!(result, Err(AppError::Json(_))));
}

#[tokio::test]
async fn test_callback_rejects_out_of_range_expiry() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let token_addr = spawn_token_endpoint(
        StatusCode::OK,
        Some(json!({
            "access_token": "access",
            "token_type": "Bearer",
            "expires_in": i64::MAX,
        })),
    )
    .await;
    let flow = test_flow(token_addr);

    let pending = flow.listen(store.clone()).await.unwrap();
    let response = reqwest::get(format!(
        "http://{}/callback?code=the-code&state={}",
        pending.local_addr(),
        flow.state()
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    let outcome = tokio::time::timeout(StdDuration::from_secs(10), pending.wait())
        .await
        .expect("login never finished");
    assert!(matches!(
        outcome,
        Err(AppError::Auth(message)) if message.contains("expires_in")
    ));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_login_answers_before_server_stops() {
    let dir = TempDir::new().unwrap();
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;
    let flow = test_flow(token_addr);

    let pending = flow
        .listen(TokenStore::new(dir.path().join(".spotify-token")))
        .await
        .unwrap();
    let addr = pending.local_addr();
    let request = tokio::spawn(reqwest::get(format!(
        "http://{}/callback?code=the-code&state=forged",
        addr
    )));

    assert!(matches!(pending.wait().await, Err(AppError::StateMismatch { .. })));

    // The browser still got its 404, and the server no longer accepts
    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_verify_authorize_url() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join(".spotify-token"));
    let token_addr = spawn_token_endpoint(StatusCode::OK, None).await;

    let accepted = spawn_authorize_endpoint(StatusCode::OK).await;
    let flow = test_flow(token_addr).with_endpoints(
        format!("http://{}/authorize", accepted),
        format!("http://{}/api/token", token_addr),
    );
    flow.verify_authorize_url().await.unwrap();

    let rejected = spawn_authorize_endpoint(StatusCode::BAD_REQUEST).await;
    let flow = test_flow(token_addr).with_endpoints(
        format!("http://{}/authorize", rejected),
        format!("http://{}/api/token", token_addr),
    );
    assert!(matches!(
        flow.verify_authorize_url().await,
        Err(AppError::Auth(message)) if message.contains("400")
    ));

    // A rejected URL ends the login before the browser is opened
    assert!(matches!(flow.complete_login(&store).await, Err(AppError::Auth(_))));
    assert!(store.load().await.unwrap().is_none());
}
