//! Height statistics over plausible heights.

use tree_census_metrics_models::{FieldMetric, HeightStats};
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::TreeTable;

use super::resolved_column;

/// Open interval of plausible heights, in meters.
pub const HEIGHT_RANGE: (f64, f64) = (0.0, 60.0);

/// Mean and maximum of the heights strictly inside [`HEIGHT_RANGE`].
///
/// Text cells are parsed with a comma accepted as decimal separator. Both
/// statistics are 0 when no height is plausible.
#[must_use]
pub fn height_stats(table: &TreeTable, schema: &ResolvedSchema) -> FieldMetric<HeightStats> {
    let column = match resolved_column(table, schema, LogicalField::Height) {
        Ok(c) => c,
        Err(unavailable) => return unavailable,
    };

    let (low, high) = HEIGHT_RANGE;
    let heights: Vec<f64> = (0..column.len())
        .filter_map(|row| column.number(row))
        .filter(|h| *h > low && *h < high)
        .collect();

    if heights.is_empty() {
        return FieldMetric::Available(HeightStats {
            mean_m: 0.0,
            max_m: 0.0,
            sample_size: 0,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_m = heights.iter().sum::<f64>() / heights.len() as f64;
    let max_m = heights.iter().copied().fold(f64::MIN, f64::max);

    FieldMetric::Available(HeightStats {
        mean_m,
        max_m,
        sample_size: heights.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use tree_census_table::Column;

    use super::*;

    fn schema() -> ResolvedSchema {
        let mut schema = ResolvedSchema::new();
        schema.insert(LogicalField::Height, "altura");
        schema
    }

    fn stats(column: Column) -> HeightStats {
        let table = TreeTable::from_columns(vec![("altura".to_string(), column)]).unwrap();
        match height_stats(&table, &schema()) {
            FieldMetric::Available(s) => s,
            FieldMetric::Unavailable { .. } => panic!("height should resolve"),
        }
    }

    #[test]
    fn implausible_heights_are_ignored() {
        let s = stats(Column::Number(
            [5.0, 10.0, 65.0, -1.0, 20.0].into_iter().map(Some).collect(),
        ));
        assert_eq!(s.sample_size, 3);
        assert!((s.mean_m - 35.0 / 3.0).abs() < 1e-9);
        assert!((s.max_m - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bounds_are_exclusive() {
        let s = stats(Column::Number(vec![Some(0.0), Some(60.0), Some(59.9)]));
        assert_eq!(s.sample_size, 1);
        assert!((s.max_m - 59.9).abs() < f64::EPSILON);
    }

    #[test]
    fn text_heights_accept_decimal_comma() {
        let s = stats(Column::Text(vec![
            Some("7,5".to_string()),
            Some("2.5".to_string()),
            Some("alta".to_string()),
            None,
        ]));
        assert_eq!(s.sample_size, 2);
        assert!((s.mean_m - 5.0).abs() < 1e-9);
    }

    #[test]
    fn empty_subset_defaults_to_zero() {
        let s = stats(Column::Number(vec![Some(-3.0), None, Some(80.0)]));
        assert_eq!(s.sample_size, 0);
        assert!(s.mean_m.abs() < f64::EPSILON);
        assert!(s.max_m.abs() < f64::EPSILON);
    }

    #[test]
    fn missing_column_is_unavailable() {
        assert!(!height_stats(&TreeTable::new(), &ResolvedSchema::new()).is_available());
    }
}
