//! Immutable tool registry shared across request tasks.
//!
//! The registry is built once at startup from the configuration document
//! and never mutated afterwards, so it is shared by reference with no
//! locking.

use crate::config::{self, ToolConfig};
use crate::error::{ProxyError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// A tool after load-time validation: parsed target, compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    /// Unique routing key; also names the backend invocation (`get_<name>`).
    pub name: String,
    /// Backend base URL, validated at load time.
    pub target: String,
    /// The single honored path-rewrite rule, if any.
    pub rewrite: Option<PathRewrite>,
    /// Documentation metadata.
    pub description: Option<String>,
    /// Declared request schema (documentation only).
    pub schema: Option<Value>,
}

/// Compiled pattern -> replacement rule for one tool.
#[derive(Debug, Clone)]
pub struct PathRewrite {
    pub pattern: Regex,
    pub replacement: String,
}

/// Mapping from tool name to [`RegisteredTool`], fixed for the process
/// lifetime.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    inner: Arc<Vec<RegisteredTool>>,
}

impl ToolRegistry {
    /// Build a registry from already-parsed tool configs.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] on a duplicate tool name, an invalid
    /// target URL, or an invalid rewrite pattern.
    pub fn from_configs(configs: impl IntoIterator<Item = (String, ToolConfig)>) -> Result<Self> {
        let mut names: HashSet<String> = HashSet::new();
        let mut tools = Vec::new();
        for (name, cfg) in configs {
            if !names.insert(name.clone()) {
                return Err(ProxyError::Config(format!(
                    "Duplicate tool name '{name}' in registry"
                )));
            }
            tools.push(compile_tool(name, cfg)?);
        }
        // Deterministic iteration order for the descriptor synthesizer.
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self {
            inner: Arc::new(tools),
        })
    }

    /// Load and build a registry from a document on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any entry fails
    /// validation; the caller treats this as fatal at startup.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_configs(config::load_document(path)?)
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.inner.iter().find(|t| t.name == name)
    }

    /// Resolve a tool or fail with [`ProxyError::UnknownTool`].
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnknownTool`] for names not in the registry;
    /// the routing layer maps this to a 404 before any dispatch work.
    pub fn require(&self, name: &str) -> Result<&RegisteredTool> {
        self.resolve(name)
            .ok_or_else(|| ProxyError::UnknownTool(name.to_string()))
    }

    /// Iterate all tools in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.inner.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn compile_tool(name: String, cfg: ToolConfig) -> Result<RegisteredTool> {
    Url::parse(&cfg.target).map_err(|e| {
        ProxyError::Config(format!(
            "Invalid target '{}' for tool '{name}': {e}",
            cfg.target
        ))
    })?;

    let rewrite = cfg
        .path_rewrite
        .iter()
        .next()
        .map(|(pattern, replacement)| compile_rewrite(&name, pattern, replacement))
        .transpose()?;

    let ignored = cfg.path_rewrite.len().saturating_sub(1);
    if ignored > 0 {
        warn!(
            tool = %name,
            ignored,
            "only the first pathRewrite rule is honored; ignoring the rest"
        );
    }

    Ok(RegisteredTool {
        name,
        target: cfg.target,
        rewrite,
        description: cfg.description,
        schema: cfg.schema,
    })
}

fn compile_rewrite(tool: &str, pattern: &str, replacement: &Value) -> Result<PathRewrite> {
    let replacement = replacement.as_str().ok_or_else(|| {
        ProxyError::Config(format!(
            "pathRewrite replacement for tool '{tool}' must be a string"
        ))
    })?;
    let pattern = Regex::new(pattern).map_err(|e| {
        ProxyError::Config(format!(
            "Invalid pathRewrite pattern '{pattern}' for tool '{tool}': {e}"
        ))
    })?;
    Ok(PathRewrite {
        pattern,
        replacement: replacement.to_string(),
    })
}
