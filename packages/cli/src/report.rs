//! Plain-text rendering of pipeline results for the terminal.

use std::io::{self, Write};

use tree_census_metrics_models::{CanopyClassifierReport, FieldMetric, MetricsSummary};

fn line<T>(
    out: &mut impl Write,
    label: &str,
    metric: &FieldMetric<T>,
    render: impl Fn(&T) -> String,
) -> io::Result<()> {
    let text = match metric {
        FieldMetric::Available(value) => render(value),
        FieldMetric::Unavailable { field } => format!("unavailable (no {field} column)"),
    };
    writeln!(out, "{label:<20} {text}")
}

/// Writes the summary as aligned `label value` lines.
///
/// # Errors
///
/// * If writing to `out` fails
pub fn write_summary(out: &mut impl Write, summary: &MetricsSummary) -> io::Result<()> {
    writeln!(out, "{:<20} {}", "Trees", summary.total_trees)?;

    line(out, "Most common species", &summary.species, |s| {
        s.most_common().map_or_else(
            || "none recorded".to_string(),
            |top| format!("{} ({}, {:.1}%)", top.name, top.count, top.percentage),
        )
    })?;
    line(out, "Distinct species", &summary.species, |s| {
        format!("{} over {} identified trees", s.distinct_species, s.total_with_species)
    })?;
    line(out, "Need attention", &summary.phytosanitary, |p| {
        format!(
            "{:.1}% ({} of {} evaluated)",
            p.attention_percentage, p.critical, p.evaluated
        )
    })?;
    line(out, "Height", &summary.height, |h| {
        format!(
            "mean {:.2} m, max {:.2} m (n={})",
            h.mean_m, h.max_m, h.sample_size
        )
    })?;
    line(out, "Recent plantings", &summary.recent_plantings, |r| {
        format!("{} since {} ({} dated)", r.count, r.since_year, r.dated)
    })?;
    line(out, "Regions", &summary.regions, |d| {
        d.entries
            .iter()
            .map(|e| format!("{}: {}", e.name, e.count))
            .collect::<Vec<_>>()
            .join(", ")
    })?;

    if let Some(h) = summary.regions.value().and_then(|d| d.highlights()) {
        writeln!(
            out,
            "{:<20} {} ({:.1}%), smallest {} ({:.1}%)",
            "Largest region",
            h.largest.name,
            h.largest.percentage,
            h.smallest.name,
            h.smallest.percentage
        )?;
    }

    if let Some(species) = summary.species.value() {
        writeln!(out)?;
        for (rank, share) in species.top.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:<30} {:>8} {:>6.1}%",
                rank + 1,
                share.name,
                share.count,
                share.percentage
            )?;
        }
    }

    Ok(())
}

/// Writes the classifier evaluation.
///
/// # Errors
///
/// * If writing to `out` fails
pub fn write_classifier(out: &mut impl Write, report: &CanopyClassifierReport) -> io::Result<()> {
    let c = report.confusion;

    writeln!(
        out,
        "Large canopy (> {} m) from CAP: p = 1 / (1 + exp(-({:.4} + {:.4} * cap)))",
        report.canopy_threshold_m, report.intercept, report.coefficient
    )?;
    writeln!(
        out,
        "Train/test rows: {}/{}",
        report.training_rows, report.test_rows
    )?;
    writeln!(out)?;
    writeln!(out, "{:<10} {:>10} {:>10}", "", "pred.norm", "pred.large")?;
    writeln!(
        out,
        "{:<10} {:>10} {:>10}",
        "normal", c.true_negative, c.false_positive
    )?;
    writeln!(
        out,
        "{:<10} {:>10} {:>10}",
        "large", c.false_negative, c.true_positive
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<10} {:>9} {:>9} {:>9} {:>9}",
        "class", "precision", "recall", "f1", "support"
    )?;
    for (label, m) in [("normal", report.normal), ("large", report.large)] {
        writeln!(
            out,
            "{label:<10} {:>9.3} {:>9.3} {:>9.3} {:>9}",
            m.precision, m.recall, m.f1, m.support
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Accuracy {:.3}  ROC AUC {:.3}  Average precision {:.3}",
        report.accuracy, report.roc_auc, report.average_precision
    )?;

    Ok(())
}
