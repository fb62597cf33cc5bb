//! Tool registry document loading.
//!
//! The registry is a single JSON document mapping tool name to
//! [`ToolConfig`]:
//!
//! ```json
//! {
//!   "weather": {
//!     "target": "http://127.0.0.1:8080",
//!     "pathRewrite": { "^/tool/weather": "/mcp/tools/invoke" },
//!     "description": "Current weather by location",
//!     "schema": { "type": "object" }
//!   }
//! }
//! ```
//!
//! The document is read once at startup; any malformed entry is a fatal
//! load error, never a per-request one.

use crate::error::{ProxyError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// One registered tool as declared in the registry document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolConfig {
    /// Base URL of the backend serving this tool.
    pub target: String,
    /// Pattern -> replacement rules applied to the inbound path.
    ///
    /// Only the first declared rule is honored; extras are flagged at load
    /// time. `serde_json::Map` keeps declaration order, so "first" means
    /// first in the document.
    #[serde(default)]
    pub path_rewrite: serde_json::Map<String, Value>,
    /// Human-readable summary, surfaced by the descriptor synthesizer.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared request schema. Documentation only, never enforced.
    #[serde(default)]
    pub schema: Option<Value>,
}

/// Read and parse a registry document from disk.
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if the file cannot be read and
/// [`ProxyError::Config`] if it is not a JSON object of tool configs.
pub fn load_document(path: &Path) -> Result<HashMap<String, ToolConfig>> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}

/// Parse a registry document from a JSON string.
///
/// # Errors
///
/// Returns [`ProxyError::Config`] if the document is not a JSON object of
/// tool configs.
pub fn parse_document(text: &str) -> Result<HashMap<String, ToolConfig>> {
    serde_json::from_str::<HashMap<String, ToolConfig>>(text)
        .map_err(|e| ProxyError::Config(format!("invalid tool registry document: {e}")))
}
