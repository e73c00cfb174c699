#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Metrics derivation pipeline for the municipal tree census.
//!
//! The pipeline runs once per process: [`resolver`] maps logical fields to
//! the columns the export actually has, [`aggregator`] reprojects
//! coordinates and runs every [`calculators`] function, and the resulting
//! [`aggregator::CensusSnapshot`] is shared read-only afterwards. A missing
//! column never aborts aggregation; it turns the affected statistic into
//! [`FieldMetric::Unavailable`](tree_census_metrics_models::FieldMetric).

pub mod aggregator;
pub mod calculators;
pub mod classifier;
pub mod config;
pub mod images;
pub mod resolver;

use thiserror::Error;
use tree_census_models::LogicalField;

/// Errors that can occur while loading data or fitting models.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Loading or reshaping the census table failed.
    #[error("Table error: {0}")]
    Table(#[from] tree_census_table::TableError),

    /// Coordinate reprojection failed.
    #[error("Geography error: {0}")]
    Geo(#[from] tree_census_geography::GeoError),

    /// A column required by the operation is absent.
    #[error("Missing column for field '{field}'")]
    MissingColumn {
        /// The logical field that could not be resolved.
        field: LogicalField,
    },

    /// Too few usable rows to fit a model.
    #[error("Insufficient data: {rows} usable rows, {required} required")]
    InsufficientData {
        /// Usable rows found.
        rows: usize,
        /// Minimum rows needed.
        required: usize,
    },

    /// One of the classes has fewer than two rows.
    #[error("Degenerate classes: {normal} normal, {large} large")]
    DegenerateClasses {
        /// Rows in the normal class.
        normal: usize,
        /// Rows in the large class.
        large: usize,
    },

    /// An environment variable holds an unusable value.
    #[error("Invalid configuration for {name}: {message}")]
    InvalidConfig {
        /// Variable name.
        name: String,
        /// What is wrong with the value.
        message: String,
    },
}
