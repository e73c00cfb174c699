#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the tree census dashboard.
//!
//! Reads its configuration from the environment (`TREE_CENSUS_*`,
//! `BIND_ADDR`, `PORT`) and delegates to [`tree_census_server::run_server`].

use tree_census_metrics::config::PipelineConfig;
use tree_census_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let pipeline = PipelineConfig::from_env().map_err(std::io::Error::other)?;
    run_server(pipeline, ServerConfig::from_env()).await
}
