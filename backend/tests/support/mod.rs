#![allow(dead_code)]
use axum::{
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use studio_backend::{app, config::Config, state::AppState, upstream::HttpUpstream};

pub const VALID_REFRESH: &str = "valid-refresh";
pub const VALID_ACCESS: &str = "valid-access";

/// Request ids seen by the fake backend, in arrival order.
#[derive(Clone, Default)]
pub struct SeenRequestIds(Arc<Mutex<Vec<String>>>);

impl SeenRequestIds {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().expect("lock request ids").clone()
    }

    fn record(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.0.lock().expect("lock request ids").push(id.to_string());
        }
    }
}

fn cookie_contains(headers: &HeaderMap, pair: &str) -> bool {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').any(|p| p.trim() == pair))
        .unwrap_or(false)
}

/// Starts a stand-in for the external backend on an ephemeral port.
pub async fn spawn_fake_backend() -> (String, SeenRequestIds) {
    let seen = SeenRequestIds::default();
    let reissue_seen = seen.clone();
    let me_seen = seen.clone();

    let router = Router::new()
        .route(
            "/auth/reissue",
            post(move |headers: HeaderMap| {
                let seen = reissue_seen.clone();
                async move {
                    seen.record(&headers);
                    if !cookie_contains(&headers, &format!("refreshToken={}", VALID_REFRESH)) {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    Json(json!({
                        "access_token": {
                            "value": "rotated-access",
                            "path": "/",
                            "secure": true,
                            "same_site": "lax",
                            "max_age": 900
                        },
                        "refresh_token": {
                            "value": "rotated-refresh",
                            "path": "/",
                            "secure": true,
                            "same_site": "strict",
                            "domain": "studio.test",
                            "max_age": 1209600
                        }
                    }))
                    .into_response()
                }
            }),
        )
        .route(
            "/users/me",
            get(move |headers: HeaderMap| {
                let seen = me_seen.clone();
                async move {
                    seen.record(&headers);
                    if cookie_contains(&headers, &format!("accessToken={}", VALID_ACCESS)) {
                        Json(json!({
                            "id": 7,
                            "email": "grace@studio.test",
                            "name": "Grace",
                            "roles": ["member", "creator"],
                            "subscription": { "id": "sub_1", "plan": "pro", "status": "active" }
                        }))
                        .into_response()
                    } else {
                        StatusCode::UNAUTHORIZED.into_response()
                    }
                }
            }),
        )
        .route("/broken/users/me", get(|| async { broken() }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake backend");
    });
    (format!("http://{}", addr), seen)
}

fn broken() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

pub fn test_app(upstream_url: &str) -> Router {
    let config = Config::for_upstream(upstream_url);
    let upstream =
        HttpUpstream::new(upstream_url, Duration::from_secs(5)).expect("upstream client");
    app(AppState::new(config, Arc::new(upstream)))
}

/// App wired to an address nothing listens on, for routes that never reach
/// the backend.
pub fn offline_app() -> Router {
    test_app("http://127.0.0.1:9")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().expect("set-cookie ascii").to_string())
        .collect()
}
