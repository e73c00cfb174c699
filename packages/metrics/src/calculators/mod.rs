//! Metric calculators.
//!
//! Each calculator reads one resolved column and returns a
//! [`FieldMetric`]. A calculator whose column is absent returns
//! [`FieldMetric::Unavailable`]; none of them can fail.

pub mod height;
pub mod phytosanitary;
pub mod plantings;
pub mod regions;
pub mod species;

pub use height::height_stats;
pub use phytosanitary::phytosanitary_ratio;
pub use plantings::recent_plantings;
pub use regions::region_distribution;
pub use species::species_ranking;

use std::collections::HashMap;

use tree_census_metrics_models::FieldMetric;
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::{Column, TreeTable};

/// Looks up the column resolved for `field`, or the unavailable marker.
fn resolved_column<'a, T>(
    table: &'a TreeTable,
    schema: &ResolvedSchema,
    field: LogicalField,
) -> Result<&'a Column, FieldMetric<T>> {
    schema
        .column(field)
        .and_then(|name| table.column(name))
        .ok_or(FieldMetric::Unavailable { field })
}

/// Inserts `key` into an insertion-ordered counter.
fn bump(counts: &mut Vec<(String, u64)>, index: &mut HashMap<String, usize>, key: String) {
    if let Some(&i) = index.get(&key) {
        counts[i].1 += 1;
    } else {
        index.insert(key.clone(), counts.len());
        counts.push((key, 1));
    }
}

/// Orders counts by descending count. The sort is stable, so equal counts
/// keep first-encountered order.
fn rank(mut counts: Vec<(String, u64)>) -> Vec<(String, u64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
