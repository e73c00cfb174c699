#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Metric result types for the tree census pipeline.
//!
//! Every statistic the dashboard shows is wrapped in a [`FieldMetric`], so
//! that "the export has no phytosanitary column" is distinguishable from
//! "0% of trees need attention". The [`MetricsSummary`] is built once at
//! startup and shared read-only afterwards.

use serde::{Deserialize, Serialize};
use tree_census_models::LogicalField;

/// A statistic that is either computed or unavailable because the column
/// it needs is missing from the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum FieldMetric<T> {
    /// The statistic was computed.
    Available(T),
    /// No column for `field` was found.
    Unavailable {
        /// The logical field whose column is missing.
        field: LogicalField,
    },
}

impl<T> FieldMetric<T> {
    /// Returns `true` if the statistic was computed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Borrows the computed value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable { .. } => None,
        }
    }
}

/// One species and its share of the trees with a species recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesShare {
    /// Species name as written in the export.
    pub name: String,
    /// Number of trees.
    pub count: u64,
    /// Percentage of `total_with_species`.
    pub percentage: f64,
    /// Photograph URL, filled in once the species directory is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Species frequency ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRanking {
    /// Most frequent species, highest count first.
    pub top: Vec<SpeciesShare>,
    /// Number of distinct species.
    pub distinct_species: usize,
    /// Trees with a species recorded (the percentage denominator).
    pub total_with_species: u64,
}

impl SpeciesRanking {
    /// The most common species, if any tree has a species recorded.
    #[must_use]
    pub fn most_common(&self) -> Option<&SpeciesShare> {
        self.top.first()
    }
}

/// Share of evaluated trees in a critical phytosanitary condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhytosanitaryStats {
    /// Trees with an actual evaluation (the denominator).
    pub evaluated: u64,
    /// Evaluated trees in a critical condition.
    pub critical: u64,
    /// `critical / evaluated * 100`, or 0 when nothing was evaluated.
    pub attention_percentage: f64,
}

/// Height statistics over plausible heights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightStats {
    /// Mean height in meters (0 when no height is plausible).
    pub mean_m: f64,
    /// Maximum height in meters (0 when no height is plausible).
    pub max_m: f64,
    /// Number of heights that passed the plausibility filter.
    pub sample_size: u64,
}

/// Trees planted in or after a reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPlantings {
    /// Reference year (inclusive).
    pub since_year: i32,
    /// Trees planted in or after `since_year`.
    pub count: u64,
    /// Trees with a parseable planting date.
    pub dated: u64,
}

/// Tree count for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    /// Normalized region key (e.g. `"3"`).
    pub key: String,
    /// Display name (e.g. `"RPA 3"`).
    pub name: String,
    /// Number of trees.
    pub count: u64,
}

/// A region and its share of all region-coded trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionShare {
    /// Normalized region key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Number of trees.
    pub count: u64,
    /// Percentage of all region-coded trees.
    pub percentage: f64,
}

/// The regions with the most and fewest trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionHighlights {
    /// Region with the most trees.
    pub largest: RegionShare,
    /// Region with the fewest trees.
    pub smallest: RegionShare,
}

/// Per-region tree counts, highest count first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDistribution {
    /// Regions ordered by descending count; ties keep first-seen order.
    pub entries: Vec<RegionEntry>,
}

impl RegionDistribution {
    /// Total trees with a region code.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Tree count for `key`, if the region appears.
    #[must_use]
    pub fn count_for(&self, key: &str) -> Option<u64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.count)
    }

    /// Largest and smallest region. Ties go to the region listed first.
    #[must_use]
    pub fn highlights(&self) -> Option<RegionHighlights> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut largest = self.entries.first()?;
        let mut smallest = largest;
        for entry in &self.entries[1..] {
            if entry.count > largest.count {
                largest = entry;
            }
            if entry.count < smallest.count {
                smallest = entry;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let share = |e: &RegionEntry| RegionShare {
            key: e.key.clone(),
            name: e.name.clone(),
            count: e.count,
            percentage: e.count as f64 / total as f64 * 100.0,
        };

        Some(RegionHighlights {
            largest: share(largest),
            smallest: share(smallest),
        })
    }
}

/// The dashboard's summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    /// Total rows in the table.
    pub total_trees: u64,
    /// Species ranking.
    pub species: FieldMetric<SpeciesRanking>,
    /// Phytosanitary attention ratio.
    pub phytosanitary: FieldMetric<PhytosanitaryStats>,
    /// Height statistics.
    pub height: FieldMetric<HeightStats>,
    /// Recent plantings.
    pub recent_plantings: FieldMetric<RecentPlantings>,
    /// Per-region distribution.
    pub regions: FieldMetric<RegionDistribution>,
}

/// Confusion matrix of a binary classifier (`Normal` = 0, `Large` = 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrix {
    /// Normal trees predicted normal.
    pub true_negative: u64,
    /// Normal trees predicted large.
    pub false_positive: u64,
    /// Large trees predicted normal.
    pub false_negative: u64,
    /// Large trees predicted large.
    pub true_positive: u64,
}

/// Precision/recall figures for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMetrics {
    /// Precision (0 when nothing was predicted for the class).
    pub precision: f64,
    /// Recall (0 when the class has no support).
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Number of test rows in the class.
    pub support: u64,
}

/// A point on the ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocPoint {
    /// False positive rate.
    pub false_positive_rate: f64,
    /// True positive rate.
    pub true_positive_rate: f64,
}

/// A point on the precision/recall curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecisionRecallPoint {
    /// Precision at this threshold.
    pub precision: f64,
    /// Recall at this threshold.
    pub recall: f64,
}

/// Evaluation of the canopy-size classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanopyClassifierReport {
    /// Canopy diameter (m) above which a tree counts as large.
    pub canopy_threshold_m: f64,
    /// Rows used for fitting.
    pub training_rows: u64,
    /// Rows held out for evaluation.
    pub test_rows: u64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Fitted CAP coefficient.
    pub coefficient: f64,
    /// Confusion matrix on the test rows.
    pub confusion: ConfusionMatrix,
    /// Metrics for normal trees.
    pub normal: ClassMetrics,
    /// Metrics for large trees.
    pub large: ClassMetrics,
    /// Share of test rows classified correctly.
    pub accuracy: f64,
    /// ROC curve, by decreasing threshold.
    pub roc_curve: Vec<RocPoint>,
    /// Area under the ROC curve.
    pub roc_auc: f64,
    /// Precision/recall curve, by decreasing threshold.
    pub precision_recall_curve: Vec<PrecisionRecallPoint>,
    /// Average precision.
    pub average_precision: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, count: u64) -> RegionEntry {
        RegionEntry {
            key: key.to_string(),
            name: format!("RPA {key}"),
            count,
        }
    }

    #[test]
    fn unavailable_metric_has_no_value() {
        let m: FieldMetric<HeightStats> = FieldMetric::Unavailable {
            field: LogicalField::Height,
        };
        assert!(!m.is_available());
        assert!(m.value().is_none());
    }

    #[test]
    fn metric_serializes_with_status_tag() {
        let m = FieldMetric::Available(RecentPlantings {
            since_year: 2020,
            count: 3,
            dated: 5,
        });
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["value"]["sinceYear"], 2020);

        let missing: FieldMetric<RecentPlantings> = FieldMetric::Unavailable {
            field: LogicalField::PlantingDate,
        };
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["value"]["field"], "planting_date");
    }

    #[test]
    fn region_highlights_pick_extremes() {
        let dist = RegionDistribution {
            entries: vec![entry("2", 50), entry("1", 30), entry("6", 20)],
        };
        let h = dist.highlights().unwrap();
        assert_eq!(h.largest.key, "2");
        assert!((h.largest.percentage - 50.0).abs() < 1e-9);
        assert_eq!(h.smallest.key, "6");
        assert!((h.smallest.percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn region_highlights_ties_go_to_first_listed() {
        let dist = RegionDistribution {
            entries: vec![entry("1", 10), entry("2", 10)],
        };
        let h = dist.highlights().unwrap();
        assert_eq!(h.largest.key, "1");
        assert_eq!(h.smallest.key, "1");
    }

    #[test]
    fn empty_distribution_has_no_highlights() {
        assert!(RegionDistribution::default().highlights().is_none());
        assert_eq!(RegionDistribution::default().total(), 0);
    }

    #[test]
    fn count_for_finds_region() {
        let dist = RegionDistribution {
            entries: vec![entry("1", 2), entry("2", 2)],
        };
        assert_eq!(dist.count_for("2"), Some(2));
        assert_eq!(dist.count_for("9"), None);
    }
}
