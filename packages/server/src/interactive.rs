//! Interactive mode for the server.
//!
//! Prompts for the listen address, port and census file before starting
//! the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use tree_census_metrics::config::PipelineConfig;

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from the environment, so pressing enter through every
/// prompt behaves like [`super::run_server`] with `from_env` configs.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid or
/// the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Tree Census Server");
    println!();

    let mut pipeline = PipelineConfig::from_env().map_err(std::io::Error::other)?;
    let mut server = ServerConfig::from_env();

    server.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(server.bind_addr.clone())
        .interact_text()
        .unwrap_or(server.bind_addr);

    server.port = Input::new()
        .with_prompt("Port")
        .default(server.port)
        .interact_text()
        .unwrap_or(server.port);

    let data_path: String = Input::new()
        .with_prompt("Census CSV")
        .default(pipeline.data_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| pipeline.data_path.display().to_string());
    pipeline.data_path = PathBuf::from(data_path);

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            server.bind_addr, server.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(pipeline, server).await
}
