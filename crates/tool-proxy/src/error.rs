//! Error types for the proxy pipeline.

use thiserror::Error;

/// Main error type for the proxy pipeline.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Configuration errors (invalid JSON, bad target URL, bad rewrite pattern)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lookup of a tool name that is not in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
