use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use datahub_core::auth::{TokenPair, TokenRepository};
use datahub_core::http::{ApiRequest, HttpTransport, UnauthorizedGuard};
use datahub_infrastructure::{InMemoryTokenRepository, ReqwestTransport};
use serde_json::{Value, json};

async fn echo(RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Json(json!({ "query": query, "authorization": auth }))
}

async fn echo_body(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
}

async fn bad_gateway() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/datasets/", get(echo))
        .route("/api/graphql/", post(echo_body))
        .route("/users/me/", get(unauthorized))
        .route("/broken/", get(bad_gateway))
        .route("/users/me/change-password/", post(no_content));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_repeated_query_and_fresh_bearer() {
    let base_url = spawn_server().await;
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let transport = ReqwestTransport::new(base_url).with_token_source(tokens.clone());

    let request = ApiRequest::get("/api/datasets/")
        .with_query("page", "2")
        .with_query("tags", "eau")
        .with_query("tags", "sol");

    let body = transport.send(request.clone()).await.unwrap();
    assert_eq!(body["query"], "page=2&tags=eau&tags=sol");
    assert_eq!(body["authorization"], Value::Null);

    // Token stored after the transport was built is used on the next request
    tokens.store(&TokenPair::new("fresh", None)).unwrap();
    let body = transport.send(request.clone()).await.unwrap();
    assert_eq!(body["authorization"], "Bearer fresh");

    let body = transport.send(request.anonymous()).await.unwrap();
    assert_eq!(body["authorization"], Value::Null);
}

#[tokio::test]
async fn test_json_body_round_trip() {
    let base_url = spawn_server().await;
    let transport = ReqwestTransport::new(base_url);

    let body = transport
        .send(ApiRequest::post("/api/graphql/").with_body(json!({"query": "{ allDatasets { title } }"})))
        .await
        .unwrap();

    assert_eq!(body["query"], "{ allDatasets { title } }");
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let base_url = spawn_server().await;
    let transport = ReqwestTransport::new(base_url);

    let body = transport
        .send(ApiRequest::post("/users/me/change-password/").with_body(json!({})))
        .await
        .unwrap();

    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_error_bodies_are_decoded() {
    let base_url = spawn_server().await;
    let transport = ReqwestTransport::new(base_url);

    let err = transport
        .send(ApiRequest::get("/users/me/"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(
        err.body().and_then(|b| b.get("detail")).and_then(Value::as_str),
        Some("Given token not valid for any token type")
    );

    let err = transport.send(ApiRequest::get("/broken/")).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.body(), Some(&json!("upstream unavailable")));
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let transport = ReqwestTransport::new("http://127.0.0.1:1");

    let err = transport
        .send(ApiRequest::get("/api/datasets/"))
        .await
        .unwrap_err();

    assert!(matches!(err, datahub_core::DatahubError::Transport(_)));
}

#[tokio::test]
async fn test_guarded_transport_invalidates_on_401() {
    let base_url = spawn_server().await;
    let tokens = Arc::new(InMemoryTokenRepository::with_tokens(TokenPair::new(
        "expired",
        Some("refresh".to_string()),
    )));
    let signals = Arc::new(AtomicUsize::new(0));
    let signals_clone = signals.clone();

    let transport = UnauthorizedGuard::new(
        ReqwestTransport::new(base_url).with_token_source(tokens.clone()),
        tokens.clone(),
    )
    .with_callback(Arc::new(move || {
        signals_clone.fetch_add(1, Ordering::SeqCst);
    }));

    let err = transport
        .send(ApiRequest::get("/users/me/"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(tokens.load().unwrap().is_empty());
    assert_eq!(signals.load(Ordering::SeqCst), 1);
}
