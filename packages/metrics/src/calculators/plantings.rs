//! Recent planting count.

use chrono::Datelike as _;
use tree_census_metrics_models::{FieldMetric, RecentPlantings};
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::TreeTable;

use super::resolved_column;

/// Plantings in or after this year count as recent.
pub const RECENT_PLANTING_YEAR: i32 = 2020;

/// Counts trees planted in or after [`RECENT_PLANTING_YEAR`].
///
/// Dates are read day-first; cells that fail to parse are skipped.
#[must_use]
pub fn recent_plantings(
    table: &TreeTable,
    schema: &ResolvedSchema,
) -> FieldMetric<RecentPlantings> {
    let column = match resolved_column(table, schema, LogicalField::PlantingDate) {
        Ok(c) => c,
        Err(unavailable) => return unavailable,
    };

    let mut dated = 0;
    let mut count = 0;
    for date in (0..column.len()).filter_map(|row| column.date(row)) {
        dated += 1;
        if date.year() >= RECENT_PLANTING_YEAR {
            count += 1;
        }
    }

    FieldMetric::Available(RecentPlantings {
        since_year: RECENT_PLANTING_YEAR,
        count,
        dated,
    })
}

#[cfg(test)]
mod tests {
    use tree_census_table::Column;

    use super::*;

    #[test]
    fn counts_plantings_since_threshold() {
        let table = TreeTable::from_columns(vec![(
            "data_plantio".to_string(),
            Column::Text(
                [
                    Some("03/04/2021"),
                    Some("31/12/2019"),
                    Some("01/01/2020"),
                    Some("sem data"),
                    None,
                ]
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect(),
            ),
        )])
        .unwrap();
        let mut schema = ResolvedSchema::new();
        schema.insert(LogicalField::PlantingDate, "data_plantio");

        assert_eq!(
            recent_plantings(&table, &schema),
            FieldMetric::Available(RecentPlantings {
                since_year: 2020,
                count: 2,
                dated: 3,
            })
        );
    }

    #[test]
    fn coerced_date_column_is_read_directly() {
        let mut table = TreeTable::from_columns(vec![(
            "data_plantio".to_string(),
            Column::Text(vec![Some("15-06-2022".to_string()), Some("2018".to_string())]),
        )])
        .unwrap();
        assert!(table.coerce_dates("data_plantio"));
        let mut schema = ResolvedSchema::new();
        schema.insert(LogicalField::PlantingDate, "data_plantio");

        let FieldMetric::Available(recent) = recent_plantings(&table, &schema) else {
            panic!("planting date should resolve");
        };
        assert_eq!(recent.count, 1);
        assert_eq!(recent.dated, 2);
    }

    #[test]
    fn missing_column_is_unavailable() {
        assert_eq!(
            recent_plantings(&TreeTable::new(), &ResolvedSchema::new()),
            FieldMetric::Unavailable {
                field: LogicalField::PlantingDate
            }
        );
    }
}
