//! Inbound-to-backend request transformation.
//!
//! Two pure steps per request: rewrite the inbound path with the tool's
//! single rewrite rule, and wrap the inbound JSON body in the backend's
//! invocation envelope. A body that fails to parse is forwarded raw rather
//! than failing the request; that branch is counted and logged so the
//! degraded mode stays observable.

use crate::registry::RegisteredTool;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Backend-facing invocation payload: `{ "tool": "get_<name>", "args": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationEnvelope {
    pub tool: String,
    pub args: Value,
}

/// Body selected for the outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    /// The parsed and wrapped envelope.
    Envelope(InvocationEnvelope),
    /// Degraded mode: the inbound body was not valid JSON and is forwarded
    /// untouched, unwrapped.
    Raw(Vec<u8>),
}

static DEGRADED_FORWARDS: AtomicU64 = AtomicU64::new(0);

/// Number of requests forwarded in degraded (raw passthrough) mode since
/// process start.
#[must_use]
pub fn degraded_forward_count() -> u64 {
    DEGRADED_FORWARDS.load(Ordering::Relaxed)
}

/// Fixed per-tool argument renames applied before wrapping.
///
/// These are part of the tool contract, not configuration: backends expect
/// canonical field names while clients send colloquial ones.
fn field_renames(tool_name: &str) -> &'static [(&'static str, &'static str)] {
    match tool_name {
        "weather" => &[("city", "location")],
        _ => &[],
    }
}

/// Produce the outbound path and body for one inbound request.
///
/// Pure function of its inputs plus the resolved tool config: transforming
/// the same `(tool, path, body)` twice yields identical results.
#[must_use]
pub fn transform(
    tool: &RegisteredTool,
    inbound_path: &str,
    inbound_body: &[u8],
) -> (String, ProxyBody) {
    (
        rewrite_path(tool, inbound_path),
        envelope_body(tool, inbound_body),
    )
}

/// Apply the tool's single rewrite rule, or pass the path through unchanged.
#[must_use]
pub fn rewrite_path(tool: &RegisteredTool, inbound_path: &str) -> String {
    match &tool.rewrite {
        Some(rule) => rule
            .pattern
            .replace(inbound_path, rule.replacement.as_str())
            .into_owned(),
        None => inbound_path.to_string(),
    }
}

fn envelope_body(tool: &RegisteredTool, inbound_body: &[u8]) -> ProxyBody {
    // An absent body means "no arguments", not a malformed request.
    let raw: &[u8] = if inbound_body.is_empty() {
        b"{}"
    } else {
        inbound_body
    };

    match serde_json::from_slice::<Value>(raw) {
        Ok(mut args) => {
            if let Value::Object(map) = &mut args {
                normalize_args(tool, map);
            }
            ProxyBody::Envelope(InvocationEnvelope {
                tool: format!("get_{}", tool.name),
                args,
            })
        }
        Err(e) => {
            DEGRADED_FORWARDS.fetch_add(1, Ordering::Relaxed);
            warn!(
                tool = %tool.name,
                error = %e,
                "inbound body is not valid JSON; forwarding raw and unwrapped"
            );
            ProxyBody::Raw(inbound_body.to_vec())
        }
    }
}

fn normalize_args(tool: &RegisteredTool, args: &mut Map<String, Value>) {
    for (from, to) in field_renames(&tool.name) {
        // Rename, never duplicate: the original key must not survive.
        if let Some(value) = args.remove(*from) {
            args.insert((*to).to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_document;
    use crate::registry::ToolRegistry;
    use serde_json::json;

    fn tool(doc: &str, name: &str) -> RegisteredTool {
        ToolRegistry::from_configs(parse_document(doc).expect("parse"))
            .expect("registry")
            .resolve(name)
            .expect("tool")
            .clone()
    }

    fn envelope(body: ProxyBody) -> InvocationEnvelope {
        match body {
            ProxyBody::Envelope(e) => e,
            ProxyBody::Raw(raw) => {
                panic!("expected envelope, got raw {:?}", String::from_utf8_lossy(&raw))
            }
        }
    }

    #[test]
    fn rewrites_the_path_with_the_first_rule() {
        let t = tool(
            r#"{ "t": { "target": "http://127.0.0.1:1", "pathRewrite": { "^/old": "/new" } } }"#,
            "t",
        );
        assert_eq!(rewrite_path(&t, "/old/123"), "/new/123");
        // Non-matching paths are untouched.
        assert_eq!(rewrite_path(&t, "/other/old"), "/other/old");
    }

    #[test]
    fn passes_the_path_through_without_a_rule() {
        let t = tool(r#"{ "t": { "target": "http://127.0.0.1:1" } }"#, "t");
        assert_eq!(rewrite_path(&t, "/tool/t"), "/tool/t");
    }

    #[test]
    fn wraps_the_body_in_the_invocation_envelope() {
        let t = tool(r#"{ "search": { "target": "http://127.0.0.1:1" } }"#, "search");
        let (_, body) = transform(&t, "/tool/search", br#"{"query":"rust"}"#);
        let env = envelope(body);
        assert_eq!(env.tool, "get_search");
        assert_eq!(env.args, json!({"query": "rust"}));
    }

    #[test]
    fn renames_city_to_location_for_the_weather_tool() {
        let t = tool(r#"{ "weather": { "target": "http://127.0.0.1:1" } }"#, "weather");
        let (_, body) = transform(&t, "/tool/weather", br#"{"city":"Paris"}"#);
        let env = envelope(body);
        assert_eq!(env.args, json!({"location": "Paris"}));
        assert!(env.args.get("city").is_none(), "renamed, not duplicated");
    }

    #[test]
    fn city_is_not_renamed_for_other_tools() {
        let t = tool(r#"{ "search": { "target": "http://127.0.0.1:1" } }"#, "search");
        let (_, body) = transform(&t, "/tool/search", br#"{"city":"Paris"}"#);
        assert_eq!(envelope(body).args, json!({"city": "Paris"}));
    }

    #[test]
    fn empty_body_becomes_empty_args() {
        let t = tool(r#"{ "t": { "target": "http://127.0.0.1:1" } }"#, "t");
        let (_, body) = transform(&t, "/tool/t", b"");
        assert_eq!(envelope(body).args, json!({}));
    }

    #[test]
    fn non_object_json_is_wrapped_verbatim() {
        let t = tool(r#"{ "t": { "target": "http://127.0.0.1:1" } }"#, "t");
        let (_, body) = transform(&t, "/tool/t", b"[1,2,3]");
        assert_eq!(envelope(body).args, json!([1, 2, 3]));
    }

    #[test]
    fn invalid_json_degrades_to_raw_forwarding() {
        let t = tool(r#"{ "t": { "target": "http://127.0.0.1:1" } }"#, "t");
        let before = degraded_forward_count();
        let (_, body) = transform(&t, "/tool/t", b"definitely not json");
        assert_eq!(body, ProxyBody::Raw(b"definitely not json".to_vec()));
        assert!(degraded_forward_count() > before, "degraded branch is counted");
    }

    #[test]
    fn transform_is_deterministic() {
        let t = tool(
            r#"{ "weather": { "target": "http://127.0.0.1:1", "pathRewrite": { "^/tool/weather": "/invoke" } } }"#,
            "weather",
        );
        let (path_a, body_a) = transform(&t, "/tool/weather", br#"{"city":"Berlin"}"#);
        let (path_b, body_b) = transform(&t, "/tool/weather", br#"{"city":"Berlin"}"#);
        assert_eq!(path_a, path_b);
        assert_eq!(body_a, body_b);

        // Byte-identical on the wire as well.
        let bytes = |b: &ProxyBody| match b {
            ProxyBody::Envelope(e) => serde_json::to_vec(e).expect("serialize"),
            ProxyBody::Raw(raw) => raw.clone(),
        };
        assert_eq!(bytes(&body_a), bytes(&body_b));
    }
}
