#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::put,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct StubInner {
    requests: Vec<RecordedRequest>,
    resources: HashSet<String>,
    failing: HashSet<String>,
}

#[derive(Clone, Default)]
struct StubState(Arc<Mutex<StubInner>>);

/// In-process stand-in for the Pub/Sub emulator REST API.
pub struct EmulatorStub {
    pub host: String,
    state: StubState,
    handle: JoinHandle<()>,
}

impl EmulatorStub {
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let host = listener.local_addr()?.to_string();
        let state = StubState::default();
        let app = Router::new()
            .route("/v1/projects/{project}/{collection}/{id}", put(handle_put))
            .with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(EmulatorStub { host, state, handle })
    }

    /// Makes creation of the topic or subscription with this id fail with a 500.
    pub fn fail(&self, id: &str) {
        self.state.0.lock().unwrap().failing.insert(id.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.0.lock().unwrap().requests.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.path).collect()
    }
}

impl Drop for EmulatorStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn error_body(code: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        code,
        Json(json!({ "error": { "code": code.as_u16(), "message": message } })),
    )
}

async fn handle_put(
    State(state): State<StubState>,
    Path((project, collection, id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut inner = state.0.lock().unwrap();
    inner.requests.push(RecordedRequest {
        path: format!("/v1/projects/{}/{}/{}", project, collection, id),
        body: body.clone(),
    });

    if inner.failing.contains(&id) {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    let name = format!("projects/{}/{}/{}", project, collection, id);
    match collection.as_str() {
        "topics" => {
            if !inner.resources.insert(name.clone()) {
                return error_body(StatusCode::CONFLICT, "Topic already exists");
            }
            (StatusCode::OK, Json(json!({ "name": name })))
        }
        "subscriptions" => {
            let topic = body["topic"].as_str().unwrap_or_default().to_string();
            if !inner.resources.contains(&topic) {
                return error_body(StatusCode::NOT_FOUND, "Subscription topic does not exist");
            }
            if !inner.resources.insert(name.clone()) {
                return error_body(StatusCode::CONFLICT, "Subscription already exists");
            }
            (StatusCode::OK, Json(json!({ "name": name, "topic": topic })))
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}
