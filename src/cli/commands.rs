//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::http_server::{ApiState, HttpServer};
use crate::observability::Logger;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and dispatch
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Command::Init { config, force } => init(&config, force),
        Command::Serve { config, seed } => serve(&config, seed),
    }
}

/// Write a default configuration file
pub fn init(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path.display().to_string()));
    }

    AppConfig::default().write(path)?;
    Logger::info("CONFIG_WRITTEN", &[("path", &path.display().to_string())]);
    Ok(())
}

/// Load configuration and serve until the process exits
pub fn serve(path: &Path, seed: bool) -> CliResult<()> {
    let config = if path.exists() {
        AppConfig::load(path)?
    } else {
        Logger::info(
            "CONFIG_DEFAULTED",
            &[("path", &path.display().to_string())],
        );
        AppConfig::default()
    };

    let state = Arc::new(ApiState::new(&config));
    if seed {
        state.seed_demo_data();
    }

    let server = HttpServer::with_state(config.http.clone(), state);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    runtime
        .block_on(server.start())
        .map_err(|e| CliError::Server(e.to_string()))
}
