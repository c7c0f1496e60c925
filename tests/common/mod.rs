//! Mock JSON backend shared by the integration tests
//!
//! Serves a few fixed routes on an ephemeral port and counts requests that
//! reach it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone, Default)]
pub struct Backend {
    hits: Arc<AtomicUsize>,
}

impl Backend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

async fn list_posts(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    backend.record();
    Json(json!({
        "posts": [{"id": 1, "title": "json-server"}, {"id": 2, "title": "axios"}],
        "query": params,
    }))
}

async fn get_post(
    State(backend): State<Backend>,
    Path(id): Path<u32>,
) -> Result<Json<Value>, StatusCode> {
    backend.record();
    if id == 1 {
        Ok(Json(json!({"id": 1, "title": "json-server"})))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn slow(State(backend): State<Backend>) -> Json<Value> {
    backend.record();
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({"slow": true}))
}

async fn broken(State(backend): State<Backend>) -> &'static str {
    backend.record();
    "this is not json"
}

async fn whoami(State(backend): State<Backend>, headers: HeaderMap) -> Json<Value> {
    backend.record();
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous");
    Json(json!({ "auth": auth }))
}

pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
        .route("/slow", get(slow))
        .route("/broken", get(broken))
        .route("/whoami", get(whoami))
        .layer(TraceLayer::new_for_http())
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}
