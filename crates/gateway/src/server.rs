//! Axum surface for the gateway.
//!
//! The tool route runs the pipeline strictly in order: credential gate,
//! registry lookup, transform, dispatch, response mapping. The descriptor
//! and health routes are unauthenticated.

use crate::auth::TokenVerifier;
use crate::contracts::{self, ErrorBody};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use toolgate_tool_proxy::descriptor;
use toolgate_tool_proxy::dispatch::Dispatcher;
use toolgate_tool_proxy::registry::ToolRegistry;
use toolgate_tool_proxy::transform;

/// Title of the synthesized descriptor document.
pub const DESCRIPTOR_TITLE: &str = "Toolgate Tool API";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state injected into every handler.
///
/// Everything here is write-once-at-startup and read-many; handlers share
/// it without locking.
#[derive(Clone)]
pub struct AppState {
    pub registry: ToolRegistry,
    pub verifier: TokenVerifier,
    pub dispatcher: Dispatcher,
    pub started_at: Instant,
}

/// Build the gateway router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tool/{name}", post(call_tool))
        // Sub-paths reach the same handler so rewrite rules see the suffix.
        .route("/tool/{name}/{*rest}", post(call_tool))
        .route("/openapi.json", get(openapi_json))
        .route("/openapi.yaml", get(openapi_yaml))
        .route("/health", get(health))
        .with_state(state)
}

async fn call_tool(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Gate first: no registry, transform, or dispatch work until the
    // credential clears.
    let raw_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let identity = match state.verifier.verify(raw_header) {
        Ok(identity) => identity,
        Err(e) => return contracts::auth_error_response(&e),
    };

    let name = params.get("name").cloned().unwrap_or_default();
    let tool = match state.registry.require(&name) {
        Ok(tool) => tool,
        Err(e) => {
            return contracts::error_response(
                StatusCode::NOT_FOUND,
                ErrorBody::new(e.to_string()),
            );
        }
    };

    let (outbound_path, proxy_body) = transform::transform(tool, uri.path(), &body);
    let outcome = state
        .dispatcher
        .dispatch(tool, &outbound_path, &proxy_body, Some(&identity.subject))
        .await;
    contracts::outcome_response(outcome)
}

async fn openapi_json(State(state): State<AppState>) -> Response {
    axum::Json(descriptor::synthesize(
        &state.registry,
        DESCRIPTOR_TITLE,
        VERSION,
    ))
    .into_response()
}

async fn openapi_yaml(State(state): State<AppState>) -> Response {
    let doc = descriptor::synthesize(&state.registry, DESCRIPTOR_TITLE, VERSION);
    match serde_yaml::to_string(&doc) {
        Ok(yaml) => ([(header::CONTENT_TYPE, "text/yaml")], yaml).into_response(),
        Err(e) => contracts::error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("Internal gateway error").with_detail(e.to_string()),
        ),
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime: f64,
    version: &'static str,
    time: String,
}

async fn health(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok",
        uptime: state.started_at.elapsed().as_secs_f64(),
        version: VERSION,
        time: chrono::Utc::now().to_rfc3339(),
    })
}
