//! Bounded, reproducible point sampling for map views.
//!
//! Map widgets cannot draw hundreds of thousands of markers, so every map
//! request is capped. The subset is drawn with a seeded [`StdRng`], which
//! makes the rendered map identical across requests with the same seed and
//! filters.

use geo::{Intersects as _, Rect, coord};
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rand::seq::index;
use tree_census_models::{BoundingBox, GeoCoordinate, normalize_region_key};
use tree_census_table::TreeTable;

use crate::projection::{LATITUDE_COLUMN, LONGITUDE_COLUMN};

/// Default seed for map sampling.
pub const DEFAULT_SEED: u64 = 42;

/// Point cap for the detailed map view.
pub const DETAILED_MAX_POINTS: usize = 1_000;

/// Point cap for the dashboard heat-map preview.
pub const PREVIEW_MAX_POINTS: usize = 2_000;

/// Filters and limits for a map sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MapQuery {
    /// Region keys to keep; empty keeps every region.
    pub regions: Vec<String>,
    /// Bounding box the points must fall in (inclusive).
    pub bbox: Option<BoundingBox>,
    /// Maximum number of points returned.
    pub max_points: usize,
    /// Seed for the subset draw.
    pub seed: u64,
}

impl MapQuery {
    /// Query used by the detailed map: city limits, 1,000 points.
    #[must_use]
    pub const fn detailed() -> Self {
        Self {
            regions: Vec::new(),
            bbox: Some(BoundingBox::RECIFE),
            max_points: DETAILED_MAX_POINTS,
            seed: DEFAULT_SEED,
        }
    }

    /// Query used by the dashboard preview: no filters, 2,000 points.
    #[must_use]
    pub const fn preview() -> Self {
        Self {
            regions: Vec::new(),
            bbox: None,
            max_points: PREVIEW_MAX_POINTS,
            seed: DEFAULT_SEED,
        }
    }

    /// Restricts the sample to the given region keys. Keys are normalized
    /// the same way region cells are.
    #[must_use]
    pub fn with_regions<S: AsRef<str>>(mut self, regions: &[S]) -> Self {
        self.regions = regions
            .iter()
            .filter_map(|r| normalize_region_key(r.as_ref()))
            .collect();
        self
    }

    /// Sets the bounding box filter.
    #[must_use]
    pub const fn with_bbox(mut self, bbox: Option<BoundingBox>) -> Self {
        self.bbox = bbox;
        self
    }

    /// Sets the point cap.
    #[must_use]
    pub const fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Sets the sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A sampled map point.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    /// Row index in the source table.
    pub row: usize,
    /// Projected coordinate.
    pub coordinate: GeoCoordinate,
    /// Normalized region key, if the row has one.
    pub region: Option<String>,
}

/// Result of [`sample`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapSample {
    /// Number of rows that matched the filters before capping.
    pub total_matching: usize,
    /// Returned points, in table order.
    pub points: Vec<MapPoint>,
}

impl MapSample {
    /// Whether the points are a subset of the matching rows.
    #[must_use]
    pub const fn is_sampled(&self) -> bool {
        self.points.len() < self.total_matching
    }
}

/// Draws a bounded sample of located rows from `table`.
///
/// Only rows with a projected coordinate are candidates. The region filter
/// applies only when `region_column` is known; the bounding box is
/// inclusive on every edge. When more than `max_points` rows match, a
/// uniform subset is drawn with `query.seed`.
#[must_use]
pub fn sample(table: &TreeTable, region_column: Option<&str>, query: &MapQuery) -> MapSample {
    let (Some(lat), Some(lon)) = (
        table.column(LATITUDE_COLUMN),
        table.column(LONGITUDE_COLUMN),
    ) else {
        log::debug!("Table has no projected coordinates; nothing to sample");
        return MapSample::default();
    };

    let regions = region_column.and_then(|name| table.column(name));
    let rect = query.bbox.map(|b| {
        Rect::new(
            coord! { x: b.west, y: b.south },
            coord! { x: b.east, y: b.north },
        )
    });

    let candidates: Vec<MapPoint> = (0..table.len())
        .filter_map(|row| {
            let coordinate = GeoCoordinate {
                latitude: lat.number(row)?,
                longitude: lon.number(row)?,
            };
            if let Some(rect) = rect
                && !rect.intersects(&coord! { x: coordinate.longitude, y: coordinate.latitude })
            {
                return None;
            }

            let region = regions
                .and_then(|c| c.text(row))
                .and_then(|raw| normalize_region_key(&raw));
            if regions.is_some()
                && !query.regions.is_empty()
                && !region.as_ref().is_some_and(|r| query.regions.contains(r))
            {
                return None;
            }

            Some(MapPoint {
                row,
                coordinate,
                region,
            })
        })
        .collect();

    let total_matching = candidates.len();
    if total_matching <= query.max_points {
        return MapSample {
            total_matching,
            points: candidates,
        };
    }

    let mut rng = StdRng::seed_from_u64(query.seed);
    let mut picked = index::sample(&mut rng, total_matching, query.max_points).into_vec();
    picked.sort_unstable();

    let mut slots: Vec<Option<MapPoint>> = candidates.into_iter().map(Some).collect();
    let points = picked.into_iter().filter_map(|i| slots[i].take()).collect();

    MapSample {
        total_matching,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_census_table::Column;

    fn grid_table(n: usize) -> TreeTable {
        #[allow(clippy::cast_precision_loss)]
        let lat: Vec<Option<f64>> = (0..n).map(|i| Some(-8.0 - (i as f64) * 1e-4)).collect();
        let lon: Vec<Option<f64>> = (0..n).map(|_| Some(-34.9)).collect();
        let rpa: Vec<Option<String>> = (0..n).map(|i| Some(format!("{}.0", i % 6 + 1))).collect();
        TreeTable::from_columns(vec![
            (LATITUDE_COLUMN.to_string(), Column::Number(lat)),
            (LONGITUDE_COLUMN.to_string(), Column::Number(lon)),
            ("rpa".to_string(), Column::Text(rpa)),
        ])
        .unwrap()
    }

    #[test]
    fn small_sets_are_returned_whole() {
        let table = grid_table(10);
        let out = sample(&table, Some("rpa"), &MapQuery::preview());
        assert_eq!(out.total_matching, 10);
        assert_eq!(out.points.len(), 10);
        assert!(!out.is_sampled());
    }

    #[test]
    fn large_sets_are_capped() {
        let table = grid_table(500);
        let query = MapQuery::preview().with_max_points(50);
        let out = sample(&table, Some("rpa"), &query);
        assert_eq!(out.total_matching, 500);
        assert_eq!(out.points.len(), 50);
        assert!(out.is_sampled());
        assert!(out.points.windows(2).all(|w| w[0].row < w[1].row));
    }

    #[test]
    fn same_seed_gives_same_sample() {
        let table = grid_table(500);
        let query = MapQuery::preview().with_max_points(25).with_seed(7);
        let a = sample(&table, Some("rpa"), &query);
        let b = sample(&table, Some("rpa"), &query);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_changes_sample() {
        let table = grid_table(500);
        let a = sample(&table, None, &MapQuery::preview().with_max_points(25).with_seed(1));
        let b = sample(&table, None, &MapQuery::preview().with_max_points(25).with_seed(2));
        assert_ne!(a.points, b.points);
    }

    #[test]
    fn filters_by_normalized_region() {
        let table = grid_table(12);
        let query = MapQuery::preview().with_regions(&["1", "2.0"]);
        let out = sample(&table, Some("rpa"), &query);
        assert_eq!(out.total_matching, 4);
        assert!(
            out.points
                .iter()
                .all(|p| matches!(p.region.as_deref(), Some("1" | "2")))
        );
    }

    #[test]
    fn region_filter_is_ignored_without_region_column() {
        let table = grid_table(12);
        let query = MapQuery::preview().with_regions(&["1"]);
        let out = sample(&table, None, &query);
        assert_eq!(out.total_matching, 12);
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let table = grid_table(5);
        // latitudes -8.0000 .. -8.0004; north and west edges sit exactly on points
        let bbox = BoundingBox::new(-34.9, -8.000_25, -34.8, -8.0);
        let out = sample(&table, None, &MapQuery::preview().with_bbox(Some(bbox)));
        assert_eq!(
            out.points.iter().map(|p| p.row).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn rows_without_coordinates_are_skipped() {
        let table = TreeTable::from_columns(vec![
            (
                LATITUDE_COLUMN.to_string(),
                Column::Number(vec![Some(-8.05), None]),
            ),
            (
                LONGITUDE_COLUMN.to_string(),
                Column::Number(vec![Some(-34.9), Some(-34.9)]),
            ),
        ])
        .unwrap();
        let out = sample(&table, None, &MapQuery::detailed());
        assert_eq!(out.total_matching, 1);
        assert_eq!(out.points[0].row, 0);
    }

    #[test]
    fn unprojected_table_yields_empty_sample() {
        let table = TreeTable::new();
        assert_eq!(sample(&table, None, &MapQuery::detailed()), MapSample::default());
    }
}
