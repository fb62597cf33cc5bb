//! Shared helpers for gateway integration tests: in-process servers on
//! ephemeral ports with graceful shutdown, a recording backend double, and
//! token minting.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::any;
use jsonwebtoken::{EncodingKey, Header};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use toolgate_gateway::auth::TokenVerifier;
use toolgate_gateway::server::{self, AppState};
use toolgate_tool_proxy::config::parse_document;
use toolgate_tool_proxy::dispatch::Dispatcher;
use toolgate_tool_proxy::registry::ToolRegistry;

pub const TEST_SECRET: &[u8] = b"integration-secret";

/// A server spawned on an ephemeral port; shut down when dropped.
pub struct SpawnedServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for SpawnedServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_router(app: Router) -> SpawnedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move {
        let _ = server.await;
    });

    SpawnedServer {
        base_url: format!("http://{addr}"),
        shutdown: Some(shutdown_tx),
    }
}

/// Spawn a gateway wired to the given registry document.
pub async fn spawn_gateway(registry_doc: &str) -> SpawnedServer {
    let registry = ToolRegistry::from_configs(parse_document(registry_doc).expect("parse doc"))
        .expect("build registry");
    let state = AppState {
        registry,
        verifier: TokenVerifier::new(TEST_SECRET),
        dispatcher: Dispatcher::new(Duration::from_secs(5)),
        started_at: Instant::now(),
    };
    spawn_router(server::router(state)).await
}

/// One request as observed by the backend double.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub user_id: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Backend double: records every request and answers with a fixed response.
#[derive(Clone)]
pub struct RecordingBackend {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: StatusCode,
    body: String,
}

impl RecordingBackend {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_string(),
        }
    }

    pub fn router(&self) -> Router {
        async fn record(
            State(backend): State<RecordingBackend>,
            uri: Uri,
            headers: HeaderMap,
            body: Bytes,
        ) -> impl IntoResponse {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            backend
                .requests
                .lock()
                .expect("lock requests")
                .push(RecordedRequest {
                    path: uri.path().to_string(),
                    user_id: header("x-user-id"),
                    content_type: header("content-type"),
                    body: body.to_vec(),
                });
            (
                backend.status,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                backend.body.clone(),
            )
        }

        Router::new()
            .route("/", any(record))
            .route("/{*path}", any(record))
            .with_state(self.clone())
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock requests").clone()
    }
}

/// Mint a bearer header value signed with [`TEST_SECRET`].
pub fn bearer(claims: &serde_json::Value) -> String {
    let token = jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("sign token");
    format!("Bearer {token}")
}

pub fn now_unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs()
}
