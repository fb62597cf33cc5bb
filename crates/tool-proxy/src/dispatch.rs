//! Outbound dispatch and outcome classification.
//!
//! The dispatcher issues exactly one outbound call per inbound request and
//! classifies the result. A response from the backend — any status — is a
//! classification, never an error; only failing to reach the backend at all
//! is a [`Outcome::TransportError`].

use crate::registry::RegisteredTool;
use crate::transform::ProxyBody;
use reqwest::Client;
use std::time::Duration;

/// Header carrying the verified caller identity to backends.
pub const IDENTITY_HEADER: &str = "x-user-id";

/// Identity marker for routes that carry no verified credential.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// Classified result of a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx from the backend; status and body pass through verbatim.
    Success(u16, Vec<u8>),
    /// Non-2xx from the backend; status and body pass through verbatim.
    BackendError(u16, Vec<u8>),
    /// Network-level failure: connection refused, DNS failure, timeout.
    TransportError { target: String, detail: String },
    /// The inbound request could not be interpreted at all.
    MalformedRequest(String),
}

/// Executes outbound calls against resolved tool backends.
///
/// One shared client for the process; per-request timeouts. Immutable and
/// cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    timeout: Duration,
}

impl Dispatcher {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Issue the single outbound call for one inbound request.
    ///
    /// Sends `body` to `tool.target + outbound_path` as JSON, propagating
    /// `subject` (or the anonymous marker) in the identity header. No
    /// retries, no caching; a timeout surfaces as a transport error.
    pub async fn dispatch(
        &self,
        tool: &RegisteredTool,
        outbound_path: &str,
        body: &ProxyBody,
        subject: Option<&str>,
    ) -> Outcome {
        let url = format!("{}{}", tool.target.trim_end_matches('/'), outbound_path);

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(IDENTITY_HEADER, subject.unwrap_or(ANONYMOUS_SUBJECT))
            .timeout(self.timeout);

        request = match body {
            ProxyBody::Envelope(envelope) => request.json(envelope),
            ProxyBody::Raw(bytes) => request.body(bytes.clone()),
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return transport_error(&tool.target, &e),
        };

        let status = response.status();
        match response.bytes().await {
            Ok(bytes) if status.is_success() => Outcome::Success(status.as_u16(), bytes.to_vec()),
            Ok(bytes) => Outcome::BackendError(status.as_u16(), bytes.to_vec()),
            Err(e) => transport_error(&tool.target, &e),
        }
    }
}

fn transport_error(target: &str, e: &reqwest::Error) -> Outcome {
    // `reqwest` error chains bury the useful part (connect refused, dns,
    // timeout) in the source; surface the whole chain.
    let mut detail = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    Outcome::TransportError {
        target: target.to_string(),
        detail,
    }
}
