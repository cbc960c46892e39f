//! `atelier-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP server
//! over the configured projects root.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use atelier_api::config::Config;
use atelier_api::server::Server;
use atelier_core::{init_logging, LocalDirBackend, LogFormat, StorageBackend};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(choose_log_format(&config));

    let storage: Arc<dyn StorageBackend> =
        Arc::new(LocalDirBackend::new(config.projects_root.clone()));
    tracing::info!(
        projects_root = %config.projects_root.display(),
        "Using local projects root"
    );

    let server = Server::with_storage_backend(config, storage);
    server.serve().await?;
    Ok(())
}
