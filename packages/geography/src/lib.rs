#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate reprojection and map sampling.
//!
//! Census exports store tree positions as UTM zone 25S easting/northing.
//! [`projection`] converts them to WGS84 latitude/longitude columns once at
//! startup, and [`sampling`] draws bounded, seeded subsets of those points
//! for map views.

pub mod projection;
pub mod sampling;

use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// No definition is registered for the requested EPSG code.
    #[error("Unsupported CRS: EPSG:{epsg}")]
    UnsupportedCrs {
        /// The EPSG code that was requested.
        epsg: u32,
    },

    /// Input coordinate sequences differ in length.
    #[error("Coordinate length mismatch: {x} x values, {y} y values")]
    LengthMismatch {
        /// Number of x values.
        x: usize,
        /// Number of y values.
        y: usize,
    },

    /// Writing projected columns into the table failed.
    #[error("Table error: {0}")]
    Table(#[from] tree_census_table::TableError),
}
