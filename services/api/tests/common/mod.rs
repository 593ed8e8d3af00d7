//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tracing::Level;

/// Nothing listens on port 1, so every backend call fails with a refused
/// connection.
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:1/api/v1";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub cache_path: PathBuf,
    // Keeps the cache directory alive for the test's duration.
    _dir: TempDir,
}

impl TestApp {
    /// An application whose backend is down, with its local cache in a
    /// fresh temporary directory.
    pub fn with_unreachable_backend() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("visamap_progress.json");
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            api_base_url: UNREACHABLE_BACKEND.parse().unwrap(),
            progress_cache_path: cache_path.clone(),
            log_level: Level::INFO,
            cors_origin: "http://localhost:3000".to_string(),
            scroll_delay: Duration::from_millis(0),
        };
        let state = Arc::new(AppState::new(Arc::new(config), reqwest::Client::new()));
        Self {
            state,
            cache_path,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone()).unwrap()
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
