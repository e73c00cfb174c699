//! Canopy-size classifier.
//!
//! Fits a one-feature logistic regression that predicts whether a tree has
//! a large canopy from its trunk circumference (CAP), and evaluates it on a
//! stratified hold-out split. The fit is deterministic: the split uses a
//! fixed seed and the optimizer is plain Newton iteration.

use std::cmp::Ordering;

use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use tree_census_metrics_models::{
    CanopyClassifierReport, ClassMetrics, ConfusionMatrix, PrecisionRecallPoint, RocPoint,
};
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::TreeTable;

use crate::MetricsError;

/// Canopy diameter (m) above which a tree counts as large.
pub const CANOPY_THRESHOLD_M: f64 = 6.0;

/// Open interval of canopy diameters kept for fitting.
pub const CANOPY_RANGE: (f64, f64) = (0.0, 30.0);

/// Open interval of CAP values kept for fitting.
pub const CAP_RANGE: (f64, f64) = (0.0, 5.0);

/// Minimum usable rows.
pub const MIN_ROWS: usize = 50;

/// Share of each class held out for evaluation.
pub const TEST_FRACTION: f64 = 0.3;

/// Seed of the train/test split.
pub const SPLIT_SEED: u64 = 42;

/// Inverse L2 regularization strength.
pub const REGULARIZATION_C: f64 = 1.0;

/// Newton iteration cap.
pub const MAX_ITERATIONS: usize = 1_000;

const TOLERANCE: f64 = 1e-10;

/// A fitted logistic regression on a single feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticModel {
    /// Intercept (not regularized).
    pub intercept: f64,
    /// Feature weight.
    pub coefficient: f64,
}

impl LogisticModel {
    /// Fits the model by Newton's method with step halving.
    ///
    /// Minimizes `w^2 / (2c) + sum(log_loss)`, leaving the intercept
    /// unpenalized.
    #[must_use]
    pub fn fit(xs: &[f64], ys: &[bool], c: f64, max_iterations: usize) -> Self {
        let mut model = Self {
            intercept: 0.0,
            coefficient: 0.0,
        };
        let mut loss = model.objective(xs, ys, c);

        for _ in 0..max_iterations {
            let (mut gb, mut gw) = (0.0, model.coefficient / c);
            let (mut hbb, mut hbw, mut hww) = (0.0, 0.0, 1.0 / c);
            for (&x, &y) in xs.iter().zip(ys) {
                let p = model.probability(x);
                let residual = p - f64::from(u8::from(y));
                let s = p * (1.0 - p);
                gb += residual;
                gw += residual * x;
                hbb += s;
                hbw += s * x;
                hww += s * x * x;
            }

            let det = hbb.mul_add(hww, -(hbw * hbw));
            if !det.is_finite() || det.abs() < f64::MIN_POSITIVE {
                break;
            }
            let db = gb.mul_add(hww, -(hbw * gw)) / det;
            let dw = hbb.mul_add(gw, -(hbw * gb)) / det;

            let mut step: f64 = 1.0;
            let mut next = model;
            let mut next_loss = loss;
            while step > 1e-8 {
                next = Self {
                    intercept: step.mul_add(-db, model.intercept),
                    coefficient: step.mul_add(-dw, model.coefficient),
                };
                next_loss = next.objective(xs, ys, c);
                if next_loss <= loss {
                    break;
                }
                step /= 2.0;
            }
            if next_loss > loss {
                break;
            }

            let moved = (next.intercept - model.intercept)
                .abs()
                .max((next.coefficient - model.coefficient).abs());
            model = next;
            loss = next_loss;
            if moved < TOLERANCE {
                break;
            }
        }

        model
    }

    /// Probability of the positive class.
    #[must_use]
    pub fn probability(&self, x: f64) -> f64 {
        sigmoid(self.coefficient.mul_add(x, self.intercept))
    }

    /// Predicted class (`true` = positive).
    #[must_use]
    pub fn predict(&self, x: f64) -> bool {
        self.probability(x) > 0.5
    }

    fn objective(&self, xs: &[f64], ys: &[bool], c: f64) -> f64 {
        let data: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let z = self.coefficient.mul_add(x, self.intercept);
                softplus(z) - if y { z } else { 0.0 }
            })
            .sum();
        self.coefficient * self.coefficient / (2.0 * c) + data
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// Rows with a plausible canopy and CAP, as `(cap, is_large)`.
///
/// # Errors
///
/// Returns [`MetricsError::MissingColumn`] if either column is unresolved.
pub fn training_samples(
    table: &TreeTable,
    schema: &ResolvedSchema,
) -> Result<Vec<(f64, bool)>, MetricsError> {
    let column = |field| {
        schema
            .column(field)
            .and_then(|name| table.column(name))
            .ok_or(MetricsError::MissingColumn { field })
    };
    let canopy = column(LogicalField::Canopy)?;
    let cap = column(LogicalField::TrunkCircumference)?;

    let in_range = |v: f64, (low, high): (f64, f64)| v > low && v < high;
    Ok((0..table.len())
        .filter_map(|row| Some((canopy.number(row)?, cap.number(row)?)))
        .filter(|&(c, x)| in_range(c, CANOPY_RANGE) && in_range(x, CAP_RANGE))
        .map(|(c, x)| (x, c > CANOPY_THRESHOLD_M))
        .collect())
}

/// Splits row indices into `(train, test)` keeping the class balance.
///
/// Each class contributes `round(n * test_fraction)` rows to the test
/// set, at least one and never all of them.
#[must_use]
pub fn stratified_split(
    labels: &[bool],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [false, true] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == class)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.shuffle(&mut rng);

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let wanted = (members.len() as f64 * test_fraction).round() as usize;
        let n_test = wanted.clamp(1, members.len().saturating_sub(1).max(1));

        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Fits and evaluates the canopy classifier.
///
/// # Errors
///
/// * [`MetricsError::MissingColumn`] if canopy or CAP is unresolved
/// * [`MetricsError::InsufficientData`] for fewer than [`MIN_ROWS`] usable rows
/// * [`MetricsError::DegenerateClasses`] if a class has fewer than two rows
pub fn train_canopy_classifier(
    table: &TreeTable,
    schema: &ResolvedSchema,
) -> Result<CanopyClassifierReport, MetricsError> {
    let samples = training_samples(table, schema)?;
    if samples.len() < MIN_ROWS {
        return Err(MetricsError::InsufficientData {
            rows: samples.len(),
            required: MIN_ROWS,
        });
    }

    let labels: Vec<bool> = samples.iter().map(|(_, l)| *l).collect();
    let large = labels.iter().filter(|l| **l).count();
    let normal = labels.len() - large;
    if large < 2 || normal < 2 {
        return Err(MetricsError::DegenerateClasses { normal, large });
    }

    let (train, test) = stratified_split(&labels, TEST_FRACTION, SPLIT_SEED);
    let xs: Vec<f64> = train.iter().map(|&i| samples[i].0).collect();
    let ys: Vec<bool> = train.iter().map(|&i| samples[i].1).collect();
    let model = LogisticModel::fit(&xs, &ys, REGULARIZATION_C, MAX_ITERATIONS);

    let truth: Vec<bool> = test.iter().map(|&i| samples[i].1).collect();
    let scores: Vec<f64> = test.iter().map(|&i| model.probability(samples[i].0)).collect();
    let predicted: Vec<bool> = test.iter().map(|&i| model.predict(samples[i].0)).collect();

    let confusion = confusion_matrix(&truth, &predicted);
    let roc_curve = roc_curve(&truth, &scores);
    let roc_auc = area_under(&roc_curve);
    let (precision_recall_curve, average_precision) = precision_recall(&truth, &scores);

    log::info!(
        "Canopy classifier: {} train / {} test rows, AUC {roc_auc:.3}",
        train.len(),
        test.len()
    );

    Ok(CanopyClassifierReport {
        canopy_threshold_m: CANOPY_THRESHOLD_M,
        training_rows: train.len() as u64,
        test_rows: test.len() as u64,
        intercept: model.intercept,
        coefficient: model.coefficient,
        confusion,
        normal: class_metrics(
            confusion.true_negative,
            confusion.false_negative,
            confusion.false_positive,
        ),
        large: class_metrics(
            confusion.true_positive,
            confusion.false_positive,
            confusion.false_negative,
        ),
        accuracy: ratio(
            confusion.true_positive + confusion.true_negative,
            test.len() as u64,
        ),
        roc_curve,
        roc_auc,
        precision_recall_curve,
        average_precision,
    })
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn confusion_matrix(truth: &[bool], predicted: &[bool]) -> ConfusionMatrix {
    let mut m = ConfusionMatrix::default();
    for (&t, &p) in truth.iter().zip(predicted) {
        match (t, p) {
            (false, false) => m.true_negative += 1,
            (false, true) => m.false_positive += 1,
            (true, false) => m.false_negative += 1,
            (true, true) => m.true_positive += 1,
        }
    }
    m
}

/// Metrics for one class given its hits, false alarms and misses.
fn class_metrics(hits: u64, false_alarms: u64, misses: u64) -> ClassMetrics {
    let precision = ratio(hits, hits + false_alarms);
    let recall = ratio(hits, hits + misses);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: hits + misses,
    }
}

/// Cumulative `(true positives, false positives)` at each distinct score,
/// highest score first.
#[allow(clippy::float_cmp)]
fn threshold_counts(truth: &[bool], scores: &[f64]) -> Vec<(u64, u64)> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut counts = Vec::new();
    let (mut tp, mut fp) = (0, 0);
    for (k, &i) in order.iter().enumerate() {
        if truth[i] {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_score = order
            .get(k + 1)
            .is_none_or(|&next| scores[next] != scores[i]);
        if last_of_score {
            counts.push((tp, fp));
        }
    }
    counts
}

fn roc_curve(truth: &[bool], scores: &[f64]) -> Vec<RocPoint> {
    let positives = truth.iter().filter(|t| **t).count() as u64;
    let negatives = truth.len() as u64 - positives;

    std::iter::once((0, 0))
        .chain(threshold_counts(truth, scores))
        .map(|(tp, fp)| RocPoint {
            false_positive_rate: ratio(fp, negatives),
            true_positive_rate: ratio(tp, positives),
        })
        .collect()
}

/// Trapezoidal area under a ROC curve.
fn area_under(curve: &[RocPoint]) -> f64 {
    curve
        .windows(2)
        .map(|w| {
            (w[1].false_positive_rate - w[0].false_positive_rate)
                * (w[1].true_positive_rate + w[0].true_positive_rate)
                / 2.0
        })
        .sum()
}

/// Precision/recall curve and average precision.
fn precision_recall(truth: &[bool], scores: &[f64]) -> (Vec<PrecisionRecallPoint>, f64) {
    let positives = truth.iter().filter(|t| **t).count() as u64;

    let mut curve = vec![PrecisionRecallPoint {
        precision: 1.0,
        recall: 0.0,
    }];
    let mut average_precision = 0.0;
    let mut previous_recall = 0.0;
    for (tp, fp) in threshold_counts(truth, scores) {
        let point = PrecisionRecallPoint {
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, positives),
        };
        average_precision += (point.recall - previous_recall) * point.precision;
        previous_recall = point.recall;
        curve.push(point);
    }

    (curve, average_precision)
}
