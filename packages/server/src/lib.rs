#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the tree census dashboard.
//!
//! The census is loaded and aggregated once, before the server binds.
//! Handlers only read the resulting [`AppState`]; map samples are drawn
//! per request with a request-local seeded RNG. Species photographs and
//! the built frontend are served as static files.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use tree_census_metrics::aggregator::{CensusSnapshot, load_snapshot};
use tree_census_metrics::classifier::train_canopy_classifier;
use tree_census_metrics::config::PipelineConfig;
use tree_census_metrics::images::SPECIES_IMAGES_ROUTE;
use tree_census_metrics_models::CanopyClassifierReport;
use tree_census_notebook::{GalleryImage, extract_gallery};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8050;

/// Upper bound on `maxPoints` for map requests.
pub const MAX_POINTS_LIMIT: usize = 50_000;

/// Where and what the HTTP server serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// Built frontend directory.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("app/dist"),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            static_dir: defaults.static_dir,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Loaded census; `None` when the data could not be loaded.
    pub snapshot: Option<Arc<CensusSnapshot>>,
    /// Canopy classifier evaluation, when there was enough data to fit it.
    pub classifier: Option<Arc<CanopyClassifierReport>>,
    /// Charts extracted from the analysis notebook.
    pub gallery: Arc<Vec<GalleryImage>>,
}

impl AppState {
    /// Loads the census and notebook named by `config`.
    ///
    /// Blocks until aggregation is complete. Missing inputs are logged and
    /// leave the corresponding part of the state empty.
    #[must_use]
    pub fn load(config: &PipelineConfig) -> Self {
        log::info!("Loading census data from {}...", config.data_path.display());
        let mut snapshot = load_snapshot(&config.data_path, config.delimiter);
        if let Some(snapshot) = &mut snapshot {
            snapshot.attach_species_images(&config.species_images_dir);
        }

        log::info!("Extracting notebook gallery...");
        let gallery = extract_gallery(&config.notebook_path);

        Self::new(snapshot, gallery)
    }

    /// Builds the state from an already prepared snapshot, fitting the
    /// canopy classifier on it.
    #[must_use]
    pub fn new(snapshot: Option<CensusSnapshot>, gallery: Vec<GalleryImage>) -> Self {
        let classifier = snapshot.as_ref().and_then(|s| {
            train_canopy_classifier(s.table(), s.schema())
                .map_err(|e| log::warn!("Canopy classifier unavailable: {e}"))
                .ok()
        });

        Self {
            snapshot: snapshot.map(Arc::new),
            classifier: classifier.map(Arc::new),
            gallery: Arc::new(gallery),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/summary", web::get().to(handlers::summary))
            .route("/regions", web::get().to(handlers::regions))
            .route("/map/points", web::get().to(handlers::map_points))
            .route("/map/preview", web::get().to(handlers::map_preview))
            .route("/classifier", web::get().to(handlers::classifier))
            .route("/gallery", web::get().to(handlers::gallery)),
    );
}

/// Loads the census and starts the tree census API server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(pipeline: PipelineConfig, server: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState::load(&pipeline));
    if state.snapshot.is_none() {
        log::warn!("Census data unavailable; data endpoints will answer 503");
    }

    let ServerConfig {
        bind_addr,
        port,
        static_dir,
    } = server;
    let species_dir = pipeline.species_images_dir;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            .service(Files::new(SPECIES_IMAGES_ROUTE, &species_dir))
            // Serve frontend static files (production)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
