use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use railbar::api::RailwayClient;

/// A request as the mock endpoint received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query(&self) -> &str {
        self.body["query"].as_str().unwrap_or_default()
    }

    pub fn variables(&self) -> &Value {
        &self.body["variables"]
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
}

/// Mock GraphQL endpoint on an ephemeral local port
///
/// Replays scripted responses in order, then `{"data": null}`.
pub struct MockRailway {
    pub endpoint: String,
    state: MockState,
}

impl MockRailway {
    pub async fn start() -> Self {
        let state = MockState::default();
        let router = Router::new()
            .route("/graphql/v2", post(handle_graphql))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock server failed");
        });

        Self {
            endpoint: format!("http://{}/graphql/v2", addr),
            state,
        }
    }

    pub fn client(&self) -> RailwayClient {
        RailwayClient::with_endpoint(&self.endpoint).expect("Mock endpoint is a valid URL")
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.state.responses.lock().unwrap().push_back((
            StatusCode::from_u16(status).unwrap(),
            body.to_string(),
        ));
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.respond_raw(status, &body.to_string());
    }

    /// Queue a 200 response carrying `{"data": data}`
    pub fn respond_data(&self, data: Value) {
        self.respond(200, json!({ "data": data }));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("Mock server received no request")
    }
}

async fn handle_graphql(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { headers, body });

    let (status, body) = state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::OK, r#"{"data":null}"#.to_string()));

    (status, [("content-type", "application/json")], body).into_response()
}

/// An endpoint URL on which nothing is listening
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/graphql/v2", addr)
}
