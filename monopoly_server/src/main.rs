//! Monopoly simulation server: hosts any number of independent, fully
//! autonomous game sessions behind an HTTP/WebSocket API.
//!
//! Each session is a self-contained `GameRunner` driven entirely by agents
//! (no human input, no authentication surface) and is reachable only for as
//! long as its session id is known to a caller.

use std::net::SocketAddr;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use monopoly_core::registry::SessionRegistry;
use monopoly_server::api::{self, AppState};
use monopoly_server::config::ServerConfig;
use pico_args::Arguments;
use std::sync::Arc;

const HELP: &str = "\
Run a Monopoly multi-agent simulation server

USAGE:
  monopoly_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DEFAULT_SPEED            Default simulation speed multiplier for new sessions
  DEFAULT_MAX_TURNS        Default turn cap for new sessions
  AGENT_TIMEOUT_SECS       Per-decision agent timeout
  HISTORY_PAGE_SIZE        Max entries returned per GetHistory page
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(bind_override)?;
    config.validate()?;

    set_handler(|| std::process::exit(0))?;

    info!("Starting Monopoly simulation server at {}", config.bind);

    let registry = SessionRegistry::new();
    let state = AppState::new(registry, Arc::new(config.clone()));
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {}: {}", config.bind, e))?;

    info!("Server is running at http://{}. Press Ctrl+C to stop.", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install CTRL+C signal handler");
}
