//!
//! silmedy server binary
//! ----------------------
//! Command-line entry point for the consultation platform HTTP server.
//! Supports configuration via CLI flags and environment variables.

use anyhow::Result;
use std::env;

use silmedy::config::{has_flag, ServerConfig};

const USAGE: &str = "silmedy Server

USAGE:
  silmedy_server [--http-port N] [--bind ADDR] [--data-file PATH]

OPTIONS:
  --http-port N       HTTP API port (env: SILMEDY_HTTP_PORT, default 8000)
  --bind ADDR         Bind address (env: SILMEDY_BIND_ADDR, default 0.0.0.0)
  --data-file PATH    JSON seed file for hospitals, diseases, doctors and admins (env: SILMEDY_DATA_FILE)

ENVIRONMENT:
  SILMEDY_FCM_PROJECT_ID, SILMEDY_FCM_ACCESS_TOKEN   Enable FCM push delivery (otherwise logged only)
  SILMEDY_FCM_ENDPOINT                               Override the FCM API base URL
  RUST_LOG                                           Log filter (default: info)
";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args: Vec<String> = env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    // CLI arguments override environment
    let config = ServerConfig::from_env().apply_args(&args);
    tracing::info!(
        "Using http_port={}, bind={}, data_file={:?}",
        config.http_port, config.bind_addr, config.data_file
    );
    silmedy::server::run(config).await
}
