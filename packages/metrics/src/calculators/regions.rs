//! Per-region (RPA) tree counts.

use std::collections::HashMap;

use tree_census_metrics_models::{FieldMetric, RegionDistribution, RegionEntry};
use tree_census_models::{
    LogicalField, ResolvedSchema, normalize_region_key, region_display_name,
};
use tree_census_table::TreeTable;

use super::{bump, rank, resolved_column};

/// Groups rows by normalized region key.
///
/// `"1"`, `"1.0"` and the number `1` share the key `"1"`. Null cells are
/// dropped. Entries are ordered by descending count, equal counts by first
/// appearance.
#[must_use]
pub fn region_distribution(
    table: &TreeTable,
    schema: &ResolvedSchema,
) -> FieldMetric<RegionDistribution> {
    let column = match resolved_column(table, schema, LogicalField::Region) {
        Ok(c) => c,
        Err(unavailable) => return unavailable,
    };

    let mut counts = Vec::new();
    let mut index = HashMap::new();
    for row in 0..column.len() {
        if let Some(key) = column.text(row).and_then(|v| normalize_region_key(&v)) {
            bump(&mut counts, &mut index, key);
        }
    }

    let entries = rank(counts)
        .into_iter()
        .map(|(key, count)| RegionEntry {
            name: region_display_name(&key),
            key,
            count,
        })
        .collect();

    FieldMetric::Available(RegionDistribution { entries })
}

#[cfg(test)]
mod tests {
    use tree_census_table::Column;

    use super::*;

    fn schema() -> ResolvedSchema {
        let mut schema = ResolvedSchema::new();
        schema.insert(LogicalField::Region, "rpa");
        schema
    }

    fn distribution(column: Column) -> RegionDistribution {
        let table = TreeTable::from_columns(vec![("rpa".to_string(), column)]).unwrap();
        match region_distribution(&table, &schema()) {
            FieldMetric::Available(d) => d,
            FieldMetric::Unavailable { .. } => panic!("region should resolve"),
        }
    }

    #[test]
    fn mixed_integer_and_text_codes_merge() {
        let d = distribution(Column::Text(vec![
            Some("1".to_string()),
            Some("1.0".to_string()),
            Some("2".to_string()),
            Some("2".to_string()),
            None,
        ]));
        assert_eq!(d.entries.len(), 2);
        assert_eq!(d.count_for("1"), Some(2));
        assert_eq!(d.count_for("2"), Some(2));
        assert_eq!(d.total(), 4);
        assert_eq!(d.entries[0].name, "RPA 1");
    }

    #[test]
    fn numeric_column_keys_drop_decimal_point() {
        let d = distribution(Column::Number(vec![Some(3.0), Some(3.0), Some(6.0)]));
        assert_eq!(d.entries[0].key, "3");
        assert_eq!(d.entries[0].count, 2);
        assert_eq!(d.entries[1].key, "6");
    }

    #[test]
    fn ordering_is_by_count_then_first_seen() {
        let d = distribution(Column::Text(
            ["5", "4", "4", "5", "6", "6", "6"]
                .into_iter()
                .map(|v| Some(v.to_string()))
                .collect(),
        ));
        let keys: Vec<&str> = d.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["6", "5", "4"]);
    }

    #[test]
    fn non_integer_codes_are_kept_verbatim() {
        let d = distribution(Column::Text(vec![Some("Centro".to_string())]));
        assert_eq!(d.entries[0].key, "Centro");
        assert_eq!(d.entries[0].name, "RPA Centro");
    }

    #[test]
    fn missing_column_is_unavailable() {
        assert!(!region_distribution(&TreeTable::new(), &ResolvedSchema::new()).is_available());
    }
}
