#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use qaffee_http::{ClientEvent, Notifier};
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: JsonValue,
    delay: Duration,
    retry_after: Option<&'static str>,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body,
            delay: Duration::from_millis(0),
            retry_after: None,
        }
    }

    pub fn ok(body: JsonValue) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_retry_after(mut self, value: &'static str) -> Self {
        self.retry_after = Some(value);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
    pub at: Instant,
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

fn route_key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

/// Serves queued responses per `METHOD path`. The last queued response for
/// a route repeats once the queue is down to one entry.
async fn handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    state
        .hits
        .lock()
        .expect("hit log mutex must not be poisoned")
        .push(Hit {
            method: method.to_string(),
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
            body,
            at: Instant::now(),
        });

    let response = {
        let mut routes = state
            .routes
            .lock()
            .expect("route table mutex must not be poisoned");
        match routes.get_mut(&route_key(method.as_str(), uri.path())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };
    let response = response.unwrap_or_else(|| {
        MockResponse::json(StatusCode::NOT_FOUND, json!({"message": "no mock route"}))
    });

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let mut http_response = (response.status, Json(response.body)).into_response();
    if let Some(retry_after) = response.retry_after {
        http_response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static(retry_after));
    }
    http_response
}

pub struct TestServer {
    pub base_url: String,
    state: MockState,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    pub fn hits(&self) -> Vec<Hit> {
        self.state
            .hits
            .lock()
            .expect("hit log mutex must not be poisoned")
            .clone()
    }

    pub fn hits_for(&self, method: &str, path: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.method == method && hit.path == path)
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.hits_for(method, path).len()
    }
}

pub async fn spawn_server(routes: Vec<(&str, &str, Vec<MockResponse>)>) -> TestServer {
    let state = MockState::default();
    {
        let mut table = state
            .routes
            .lock()
            .expect("route table mutex must not be poisoned");
        for (method, path, responses) in routes {
            table.insert(route_key(method, path), responses.into());
        }
    }

    let app = Router::new().fallback(handler).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        state,
        task,
    }
}

/// Notifier that records every event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<ClientEvent>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events
            .lock()
            .expect("event log mutex must not be poisoned")
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: ClientEvent) {
        self.events
            .lock()
            .expect("event log mutex must not be poisoned")
            .push(event);
    }
}

pub fn user_body(id: i64) -> JsonValue {
    json!({
        "id": id,
        "email": "kit@example.com",
        "first_name": "Kit",
        "last_name": null,
        "phone": null,
        "role": "customer",
        "is_active": true,
        "is_admin": false,
        "is_staff": false
    })
}
