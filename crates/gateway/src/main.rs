//! Toolgate gateway entry point.
//!
//! Startup is all-or-nothing: a missing verification secret or a malformed
//! tool registry aborts the process before the listener binds.

use anyhow::Context as _;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use toolgate_gateway::auth::TokenVerifier;
use toolgate_gateway::server::{self, AppState};
use toolgate_tool_proxy::dispatch::Dispatcher;
use toolgate_tool_proxy::registry::ToolRegistry;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "toolgate-gateway",
    version,
    about = "Dynamic tool gateway: bearer-token gate + tool proxy + live OpenAPI surface"
)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "TOOLGATE_LISTEN", default_value = "127.0.0.1:8443")]
    listen: SocketAddr,

    /// Path to the tool registry document.
    #[arg(long, env = "TOOLGATE_TOOLS_CONFIG", default_value = "tools.config.json")]
    tools_config: PathBuf,

    /// Outbound dispatch timeout in seconds.
    #[arg(long, env = "TOOLGATE_DISPATCH_TIMEOUT_SECS", default_value_t = 30)]
    dispatch_timeout_secs: u64,

    /// Log output format.
    #[arg(long, env = "TOOLGATE_LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    // Env-only on purpose: the secret must not show up in `--help` output
    // or process listings.
    let secret = std::env::var("TOOLGATE_JWT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .context("TOOLGATE_JWT_SECRET is not set; refusing to start without a verification secret")?;

    let registry = ToolRegistry::from_file(&args.tools_config).with_context(|| {
        format!(
            "load tool registry from '{}'",
            args.tools_config.display()
        )
    })?;
    for tool in registry.iter() {
        info!(tool = %tool.name, target = %tool.target, "registered tool route");
    }

    let state = AppState {
        registry,
        verifier: TokenVerifier::new(secret.as_bytes()),
        dispatcher: Dispatcher::new(Duration::from_secs(args.dispatch_timeout_secs)),
        started_at: Instant::now(),
    };

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("bind {}", args.listen))?;
    info!(listen = %args.listen, "toolgate gateway listening");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve gateway")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler means no graceful shutdown; keep serving.
        std::future::pending::<()>().await;
    }
}
