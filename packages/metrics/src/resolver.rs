//! Column resolution.
//!
//! Exports from different years name the same field differently. Each
//! [`LogicalField`] carries an ordered alias list and the first alias the
//! table has wins. Resolution happens once per table.

use std::collections::BTreeSet;

use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::TreeTable;

/// Returns the first candidate present in `columns`.
#[must_use]
pub fn resolve<'a>(columns: &BTreeSet<&str>, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| columns.contains(c))
}

/// Resolves every logical field against the columns of `table`.
#[must_use]
pub fn resolve_schema(table: &TreeTable) -> ResolvedSchema {
    resolve_columns(&table.column_set())
}

/// Resolves every logical field against a set of column names.
#[must_use]
pub fn resolve_columns(columns: &BTreeSet<&str>) -> ResolvedSchema {
    let mut schema = ResolvedSchema::new();
    for &field in LogicalField::all() {
        if let Some(column) = resolve(columns, field.candidates()) {
            schema.insert(field, column);
        }
    }

    let missing = schema.missing();
    if !missing.is_empty() {
        log::debug!("Unresolved fields: {missing:?}");
    }

    schema
}
