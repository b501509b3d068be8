#![cfg(not(target_arch = "wasm32"))]

use std::rc::Rc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::{Value, json};

use super::*;
use crate::config::{PortalConfig, PortalKind};
use crate::nav::RecordingNavigator;
use crate::net::client::{AuthClient, Credentials};
use crate::net::types::{FetchOutcome, Method, RequestOptions};
use crate::session::store::{AUTH_TOKEN_KEY, USER_KEY};
use crate::session::{KeyValueStore, MemoryStore, SessionStore};

// =============================================================
// Test server
// =============================================================

const GOOD_TOKEN: &str = "good-token";

async fn orders(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer == format!("Bearer {GOOD_TOKEN}") {
        (StatusCode::OK, Json(json!([{"id": 1, "status": "delivered"}])))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid or expired token"})))
    }
}

async fn echo(headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    Json(json!({"contentType": content_type, "body": body}))
}

async fn login(Json(creds): Json<Value>) -> (StatusCode, Json<Value>) {
    if creds["password"] == "pw" {
        let user = json!({"firstName": "Ana", "email": creds["email"], "userType": "customer"});
        (StatusCode::OK, Json(json!({"token": GOOD_TOKEN, "user": user})))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"})))
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/orders", get(orders))
        .route("/echo", post(echo))
        .route("/auth/login", post(login))
        .route("/slow", get(slow));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn request(method: Method, url: String, headers: &[(&str, &str)], body: Option<&str>) -> ApiRequest {
    ApiRequest {
        method,
        url,
        headers: headers
            .iter()
            .map(|(n, v)| ((*n).to_owned(), (*v).to_owned()))
            .collect(),
        body: body.map(str::to_owned),
        timeout: None,
    }
}

fn client_for(base: &str, backend: &MemoryStore, nav: &RecordingNavigator) -> AuthClient<ReqwestTransport> {
    AuthClient::new(
        ReqwestTransport::new(),
        SessionStore::new(Rc::new(backend.clone())),
        Rc::new(nav.clone()),
        PortalConfig { api_base_url: base.to_owned(), ..PortalConfig::default() },
        PortalKind::Customer,
    )
}

// =============================================================
// ReqwestTransport
// =============================================================

#[tokio::test]
async fn reqwest_transport_returns_status_and_body() {
    let base = spawn_server().await;
    let transport = ReqwestTransport::new();

    let ok = transport
        .send(request(
            Method::Get,
            format!("{base}/orders"),
            &[("Authorization", "Bearer good-token")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(ok.status, 200);
    let body: Value = ok.json().unwrap();
    assert_eq!(body[0]["status"], "delivered");

    let denied = transport
        .send(request(Method::Get, format!("{base}/orders"), &[], None))
        .await
        .unwrap();
    assert_eq!(denied.status, 401);
}

#[tokio::test]
async fn reqwest_transport_sends_headers_and_body() {
    let base = spawn_server().await;
    let reply = ReqwestTransport::new()
        .send(request(
            Method::Post,
            format!("{base}/echo"),
            &[("Content-Type", "application/json")],
            Some(r#"{"qty":2}"#),
        ))
        .await
        .unwrap();
    let body: Value = reply.json().unwrap();
    assert_eq!(body["contentType"], "application/json");
    assert_eq!(body["body"], r#"{"qty":2}"#);
}

#[tokio::test]
async fn reqwest_transport_maps_timeout() {
    let base = spawn_server().await;
    let mut req = request(Method::Get, format!("{base}/slow"), &[], None);
    req.timeout = Some(Duration::from_millis(100));
    let err = ReqwestTransport::new().send(req).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout));
}

#[tokio::test]
async fn reqwest_transport_maps_connection_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = ReqwestTransport::new()
        .send(request(Method::Get, format!("http://{addr}/orders"), &[], None))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

// =============================================================
// AuthClient over HTTP
// =============================================================

#[tokio::test]
async fn login_then_fetch_orders_end_to_end() {
    let base = spawn_server().await;
    let backend = MemoryStore::new();
    let nav = RecordingNavigator::new();
    let client = client_for(&base, &backend, &nav);

    client.login(&Credentials::new("ana@example.com", "pw")).await.unwrap();
    assert_eq!(backend.get(AUTH_TOKEN_KEY).as_deref(), Some(GOOD_TOKEN));

    let orders: Vec<Value> = client.get_json("/orders").await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(nav.visited().is_empty());
}

#[tokio::test]
async fn expired_token_end_to_end() {
    let base = spawn_server().await;
    let backend = MemoryStore::with_entries([(AUTH_TOKEN_KEY, "stale"), (USER_KEY, r#"{"firstName":"Ana"}"#)]);
    let nav = RecordingNavigator::new();
    let client = client_for(&base, &backend, &nav);

    let outcome = client.request("/orders", RequestOptions::get()).await.unwrap();

    let FetchOutcome::Unauthorized(response) = outcome else {
        panic!("expected unauthorized outcome");
    };
    let body: Value = response.json().unwrap();
    assert_eq!(body["message"], "Invalid or expired token");
    assert!(backend.is_empty());
    assert_eq!(nav.visited(), vec!["login.html".to_owned()]);
}
