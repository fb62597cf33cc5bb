//! Client-facing response contracts.
//!
//! Every gateway-synthesized error is a JSON object with at least an
//! `error` field and, where available, a `detail`. Backend responses pass
//! through verbatim; only transport failures become a gateway-authored
//! body. Internal paths and stack traces never appear here.

use crate::auth::AuthError;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use toolgate_tool_proxy::dispatch::Outcome;

/// Gateway-synthesized JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
            target: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

#[must_use]
pub fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

/// Map an auth failure to its response: 401 only when the credential is
/// absent, 403 for everything presented but rejected.
#[must_use]
pub fn auth_error_response(err: &AuthError) -> Response {
    let status = match err {
        AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
        AuthError::MalformedCredential | AuthError::InvalidCredential => StatusCode::FORBIDDEN,
    };
    error_response(status, ErrorBody::new(err.to_string()))
}

/// Map a classified dispatch outcome to the caller-facing response.
///
/// Backend outcomes relay status and body verbatim; only transport
/// failures get a gateway-authored 502 naming the unreachable target.
#[must_use]
pub fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Success(status, body) | Outcome::BackendError(status, body) => {
            passthrough(status, body)
        }
        Outcome::TransportError { target, detail } => error_response(
            StatusCode::BAD_GATEWAY,
            ErrorBody::new("Gateway proxy error")
                .with_detail(detail)
                .with_target(target),
        ),
        Outcome::MalformedRequest(detail) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorBody::new("Malformed request").with_detail(detail),
        ),
    }
}

fn passthrough(status: u16, body: Vec<u8>) -> Response {
    // The classifier only produces statuses it received from a backend, so
    // this conversion cannot fail in practice; a 502 keeps the failure
    // honest if it ever does.
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
