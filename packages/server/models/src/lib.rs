#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the tree census server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the pipeline types so the API contract can evolve independently.

use serde::{Deserialize, Serialize};
use tree_census_geography::sampling::{MapPoint, MapSample};
use tree_census_metrics_models::{FieldMetric, RegionDistribution, RegionHighlights};
use tree_census_models::{BoundingBox, REGION_NAMES, region_display_name};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether the census was loaded.
    pub data_loaded: bool,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Body returned whenever the census could not be loaded.
    #[must_use]
    pub fn data_unavailable() -> Self {
        Self {
            error: "data unavailable".to_string(),
        }
    }
}

/// One of the city's administrative regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegionName {
    /// Region key (e.g. `"1"`).
    pub key: String,
    /// Short label (e.g. `"RPA 1"`).
    pub label: String,
    /// Area name (e.g. `"Centro"`).
    pub name: String,
}

impl ApiRegionName {
    /// All known regions.
    #[must_use]
    pub fn all() -> Vec<Self> {
        REGION_NAMES
            .iter()
            .map(|(key, name)| Self {
                key: (*key).to_string(),
                label: region_display_name(key),
                name: (*name).to_string(),
            })
            .collect()
    }
}

/// `GET /api/regions` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegions {
    /// Per-region counts.
    pub distribution: FieldMetric<RegionDistribution>,
    /// Largest and smallest region.
    pub highlights: Option<RegionHighlights>,
    /// Every known region, for filter widgets.
    pub known_regions: Vec<ApiRegionName>,
}

/// Query parameters for `GET /api/map/points`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// Comma-separated region keys.
    pub regions: Option<String>,
    /// Bounding box as `west,south,east,north`.
    pub bbox: Option<String>,
    /// Maximum number of points.
    pub max_points: Option<usize>,
    /// Sampling seed.
    pub seed: Option<u64>,
}

/// A sampled tree location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapPoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Region key, if known.
    pub region: Option<String>,
}

impl From<MapPoint> for ApiMapPoint {
    fn from(point: MapPoint) -> Self {
        Self {
            latitude: point.coordinate.latitude,
            longitude: point.coordinate.longitude,
            region: point.region,
        }
    }
}

/// Map sample response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapSample {
    /// Rows matching the filters before capping.
    pub total_matching: usize,
    /// Whether `points` is a subset of the matching rows.
    pub sampled: bool,
    /// Bounding box applied, if any.
    pub bbox: Option<BoundingBox>,
    /// Returned points.
    pub points: Vec<ApiMapPoint>,
}

impl ApiMapSample {
    /// Builds the response for `sample`, drawn with `bbox`.
    #[must_use]
    pub fn new(sample: MapSample, bbox: Option<BoundingBox>) -> Self {
        Self {
            total_matching: sample.total_matching,
            sampled: sample.is_sampled(),
            bbox,
            points: sample.points.into_iter().map(ApiMapPoint::from).collect(),
        }
    }
}
