//! Live API descriptor synthesized from the tool registry.
//!
//! The descriptor is derived, never stored: the registry cannot change at
//! runtime, so the document is recomputed on demand instead of cached.

use crate::registry::ToolRegistry;
use serde_json::{Map, Value, json};

/// Build an OpenAPI 3.0.3 document with one `/tool/{name}` entry per
/// registered tool.
///
/// Pure and deterministic: tools appear in sorted name order and the
/// response-status vocabulary is fixed.
#[must_use]
pub fn synthesize(registry: &ToolRegistry, title: &str, version: &str) -> Value {
    let mut paths = Map::new();
    for tool in registry.iter() {
        let summary = tool
            .description
            .clone()
            .unwrap_or_else(|| format!("Tool {}", tool.name));
        let schema = tool
            .schema
            .clone()
            .unwrap_or_else(|| json!({ "type": "object" }));

        paths.insert(
            format!("/tool/{}", tool.name),
            json!({
                "post": {
                    "summary": summary,
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": { "schema": schema }
                        }
                    },
                    "responses": {
                        "200": { "description": "Successful response" },
                        "400": { "description": "Bad request" },
                        "401": { "description": "Unauthorized" },
                        "500": { "description": "Internal error" }
                    }
                }
            }),
        );
    }

    json!({
        "openapi": "3.0.3",
        "info": { "title": title, "version": version },
        "paths": paths
    })
}
