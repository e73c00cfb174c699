//! HTTP handler functions for the tree census API.

use actix_web::{HttpResponse, web};
use tree_census_geography::sampling::{MapQuery, sample};
use tree_census_metrics::aggregator::CensusSnapshot;
use tree_census_models::BoundingBox;
use tree_census_server_models::{
    ApiError, ApiHealth, ApiMapSample, ApiRegionName, ApiRegions, MapQueryParams,
};

use crate::{AppState, MAX_POINTS_LIMIT};

fn data_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ApiError::data_unavailable())
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_loaded: state.snapshot.is_some(),
    })
}

/// `GET /api/summary`
///
/// Returns the metrics summary, or 503 when the census is not loaded.
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    match &state.snapshot {
        Some(snapshot) => HttpResponse::Ok().json(snapshot.summary()),
        None => data_unavailable(),
    }
}

/// `GET /api/regions`
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    let Some(snapshot) = &state.snapshot else {
        return data_unavailable();
    };

    let distribution = snapshot.summary().regions.clone();
    let highlights = distribution.value().and_then(|d| d.highlights());

    HttpResponse::Ok().json(ApiRegions {
        distribution,
        highlights,
        known_regions: ApiRegionName::all(),
    })
}

/// `GET /api/map/points`
///
/// Samples tree locations with optional region and bounding box filters.
/// Without a `bbox` the city limits are used.
pub async fn map_points(
    state: web::Data<AppState>,
    params: web::Query<MapQueryParams>,
) -> HttpResponse {
    let query = match map_query(&params) {
        Ok(query) => query,
        Err(error) => return HttpResponse::BadRequest().json(error),
    };
    let Some(snapshot) = &state.snapshot else {
        return data_unavailable();
    };
    HttpResponse::Ok().json(sample_snapshot(snapshot, &query))
}

/// `GET /api/map/preview`
///
/// Unfiltered sample for the dashboard heat map.
pub async fn map_preview(state: web::Data<AppState>) -> HttpResponse {
    let Some(snapshot) = &state.snapshot else {
        return data_unavailable();
    };
    HttpResponse::Ok().json(sample_snapshot(snapshot, &MapQuery::preview()))
}

/// `GET /api/classifier`
pub async fn classifier(state: web::Data<AppState>) -> HttpResponse {
    match &state.classifier {
        Some(report) => HttpResponse::Ok().json(report.as_ref()),
        None => HttpResponse::NotFound().json(ApiError {
            error: "classifier unavailable".to_string(),
        }),
    }
}

/// `GET /api/gallery`
pub async fn gallery(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.gallery.as_slice())
}

fn sample_snapshot(snapshot: &CensusSnapshot, query: &MapQuery) -> ApiMapSample {
    let drawn = sample(snapshot.table(), snapshot.region_column(), query);
    ApiMapSample::new(drawn, query.bbox)
}

/// Builds a map query from request parameters on top of the detailed-map
/// defaults. `maxPoints` is clamped to `1..=MAX_POINTS_LIMIT`.
///
/// A `bbox` that is present but not four numbers is rejected rather than
/// replaced by the default box.
fn map_query(params: &MapQueryParams) -> Result<MapQuery, ApiError> {
    let mut query = MapQuery::detailed();

    if let Some(regions) = params.regions.as_deref() {
        let keys: Vec<&str> = regions.split(',').filter(|r| !r.trim().is_empty()).collect();
        query = query.with_regions(&keys);
    }
    if let Some(raw) = params.bbox.as_deref().filter(|b| !b.trim().is_empty()) {
        let bbox = parse_bbox(raw).ok_or_else(|| ApiError {
            error: format!("invalid bbox '{raw}': expected west,south,east,north"),
        })?;
        query = query.with_bbox(Some(bbox));
    }
    if let Some(max_points) = params.max_points {
        query = query.with_max_points(max_points.clamp(1, MAX_POINTS_LIMIT));
    }
    if let Some(seed) = params.seed {
        query = query.with_seed(seed);
    }

    Ok(query)
}

/// Parses a bounding box string `"west,south,east,north"` into a
/// [`BoundingBox`].
fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [west, south, east, north] => Some(BoundingBox::new(*west, *south, *east, *north)),
        _ => None,
    }
}
