//! Share of evaluated trees in a critical phytosanitary condition.

use tree_census_metrics_models::{FieldMetric, PhytosanitaryStats};
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::TreeTable;

use super::{percentage, resolved_column};

/// Status recorded for trees nobody inspected.
pub const NOT_EVALUATED: &str = "Não avaliada";

/// Status values that count as needing attention.
///
/// Matched exactly and case-sensitively against the trimmed cell.
pub const CRITICAL_TERMS: &[&str] = &["Injuriada", "Morta", "Doente", "Ruim", "Péssima", "Critica"];

/// Whether a trimmed status value counts as an actual evaluation.
#[must_use]
pub fn is_evaluated(status: &str) -> bool {
    !status.is_empty() && status != "nan" && status != NOT_EVALUATED
}

/// Whether a trimmed status value is critical.
#[must_use]
pub fn is_critical(status: &str) -> bool {
    CRITICAL_TERMS.contains(&status)
}

/// Attention ratio over the resolved phytosanitary column.
///
/// The denominator is the evaluated subset, never the row count.
#[must_use]
pub fn phytosanitary_ratio(
    table: &TreeTable,
    schema: &ResolvedSchema,
) -> FieldMetric<PhytosanitaryStats> {
    let column = match resolved_column(table, schema, LogicalField::Phytosanitary) {
        Ok(c) => c,
        Err(unavailable) => return unavailable,
    };

    let mut evaluated = 0;
    let mut critical = 0;
    for row in 0..column.len() {
        let Some(value) = column.text(row) else {
            continue;
        };
        let status = value.trim();
        if !is_evaluated(status) {
            continue;
        }
        evaluated += 1;
        if is_critical(status) {
            critical += 1;
        }
    }

    FieldMetric::Available(PhytosanitaryStats {
        evaluated,
        critical,
        attention_percentage: percentage(critical, evaluated),
    })
}

#[cfg(test)]
mod tests {
    use tree_census_table::Column;

    use super::*;

    fn run(values: &[Option<&str>]) -> PhytosanitaryStats {
        let table = TreeTable::from_columns(vec![(
            "fitossanid_grupo".to_string(),
            Column::Text(values.iter().map(|v| v.map(str::to_string)).collect()),
        )])
        .unwrap();
        let mut schema = ResolvedSchema::new();
        schema.insert(LogicalField::Phytosanitary, "fitossanid_grupo");
        match phytosanitary_ratio(&table, &schema) {
            FieldMetric::Available(stats) => stats,
            FieldMetric::Unavailable { .. } => panic!("column should resolve"),
        }
    }

    #[test]
    fn ratio_uses_evaluated_subset() {
        let stats = run(&[
            Some("Boa"),
            Some("Morta"),
            Some("Doente"),
            Some("Não avaliada"),
            None,
            Some("Regular"),
        ]);
        assert_eq!(stats.evaluated, 4);
        assert_eq!(stats.critical, 2);
        assert!((stats.attention_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn nothing_evaluated_gives_zero() {
        let stats = run(&[Some("Não avaliada"), None, Some("nan")]);
        assert_eq!(stats.evaluated, 0);
        assert_eq!(stats.critical, 0);
        assert!(stats.attention_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn values_are_trimmed_before_matching() {
        let stats = run(&[Some("  Ruim "), Some("Boa")]);
        assert_eq!(stats.evaluated, 2);
        assert_eq!(stats.critical, 1);
    }

    #[test]
    fn critical_match_is_case_sensitive() {
        let stats = run(&[Some("morta"), Some("MORTA"), Some("Morta")]);
        assert_eq!(stats.evaluated, 3);
        assert_eq!(stats.critical, 1);
    }

    #[test]
    fn missing_column_is_unavailable() {
        let table = TreeTable::new();
        assert_eq!(
            phytosanitary_ratio(&table, &ResolvedSchema::new()),
            FieldMetric::Unavailable {
                field: LogicalField::Phytosanitary
            }
        );
    }
}
