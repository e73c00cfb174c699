//! Metrics aggregation.
//!
//! [`aggregate`] is the single entry point of the pipeline: resolve
//! columns, coerce the typed ones, reproject coordinates, then run every
//! calculator independently. [`prepare`] keeps the augmented table around
//! as an immutable [`CensusSnapshot`] for the map views.

use std::path::Path;

use tree_census_geography::projection::{Transformer, project_table};
use tree_census_metrics_models::{FieldMetric, MetricsSummary};
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::{LoadOptions, TreeTable};

use crate::MetricsError;
use crate::calculators::{
    height_stats, phytosanitary_ratio, recent_plantings, region_distribution, species_ranking,
};
use crate::images::resolve_species_image;
use crate::resolver::resolve_schema;

/// Fields stored as numbers after preprocessing.
const NUMERIC_FIELDS: &[LogicalField] = &[
    LogicalField::Height,
    LogicalField::Canopy,
    LogicalField::TrunkCircumference,
    LogicalField::TrunkDiameter,
];

/// The loaded table, its resolved schema and its summary.
///
/// Built once before the server starts and only read afterwards.
#[derive(Debug, Clone)]
pub struct CensusSnapshot {
    table: TreeTable,
    schema: ResolvedSchema,
    summary: MetricsSummary,
}

impl CensusSnapshot {
    /// The preprocessed table, including `latitude`/`longitude` columns
    /// when coordinates were available.
    #[must_use]
    pub const fn table(&self) -> &TreeTable {
        &self.table
    }

    /// The resolved schema.
    #[must_use]
    pub const fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// The summary statistics.
    #[must_use]
    pub const fn summary(&self) -> &MetricsSummary {
        &self.summary
    }

    /// Column holding region codes, if the export has one.
    #[must_use]
    pub fn region_column(&self) -> Option<&str> {
        self.schema.column(LogicalField::Region)
    }

    /// Sets the photograph URL of every top species from `dir`.
    pub fn attach_species_images(&mut self, dir: &Path) {
        if let FieldMetric::Available(ranking) = &mut self.summary.species {
            for share in &mut ranking.top {
                share.image = Some(resolve_species_image(dir, &share.name));
            }
        }
    }
}

/// Computes the summary for `table`.
///
/// Adds projected coordinate columns and coerces typed columns in place.
/// Returns `None` only for a table without rows; any missing column just
/// makes the affected statistic unavailable.
#[must_use]
pub fn aggregate(table: &mut TreeTable) -> Option<MetricsSummary> {
    if table.is_empty() {
        log::warn!("Census table is empty; no summary computed");
        return None;
    }

    let schema = resolve_schema(table);
    Some(aggregate_resolved(table, &schema))
}

/// Runs [`aggregate`] and keeps the table and schema alongside the summary.
#[must_use]
pub fn prepare(mut table: TreeTable) -> Option<CensusSnapshot> {
    if table.is_empty() {
        log::warn!("Census table is empty; no snapshot prepared");
        return None;
    }

    let schema = resolve_schema(&table);
    let summary = aggregate_resolved(&mut table, &schema);

    Some(CensusSnapshot {
        table,
        schema,
        summary,
    })
}

/// Loads the census CSV at `path`, keeping only the columns the pipeline
/// knows about.
///
/// # Errors
///
/// Returns [`MetricsError::Table`] if the file cannot be read or parsed.
pub fn load_table(path: &Path, delimiter: u8) -> Result<TreeTable, MetricsError> {
    let options = LoadOptions::default()
        .with_delimiter(delimiter)
        .with_columns(&LogicalField::essential_columns());
    Ok(TreeTable::load(path, &options)?)
}

/// Loads and prepares the census at `path`.
///
/// Load failures are logged and reported as `None`, which callers surface
/// as "data unavailable".
#[must_use]
pub fn load_snapshot(path: &Path, delimiter: u8) -> Option<CensusSnapshot> {
    match load_table(path, delimiter) {
        Ok(table) => prepare(table),
        Err(e) => {
            log::error!("Failed to load census data from {}: {e}", path.display());
            None
        }
    }
}

fn aggregate_resolved(table: &mut TreeTable, schema: &ResolvedSchema) -> MetricsSummary {
    preprocess(table, schema);

    let summary = MetricsSummary {
        total_trees: table.len() as u64,
        species: species_ranking(table, schema),
        phytosanitary: phytosanitary_ratio(table, schema),
        height: height_stats(table, schema),
        recent_plantings: recent_plantings(table, schema),
        regions: region_distribution(table, schema),
    };

    log::info!(
        "Aggregated {} trees ({} fields unresolved)",
        summary.total_trees,
        schema.missing().len()
    );

    summary
}

/// Coerces typed columns once and adds projected coordinates.
fn preprocess(table: &mut TreeTable, schema: &ResolvedSchema) {
    for &field in NUMERIC_FIELDS {
        if let Some(name) = schema.column(field) {
            table.coerce_numeric(name);
        }
    }
    if let Some(name) = schema.column(LogicalField::PlantingDate) {
        table.coerce_dates(name);
    }

    let (Some(x), Some(y)) = (
        schema.column(LogicalField::X),
        schema.column(LogicalField::Y),
    ) else {
        log::warn!("No x/y columns; map views will be empty");
        return;
    };

    if let Err(e) = Transformer::census_default().and_then(|t| project_table(table, &t, x, y)) {
        log::warn!("Coordinate projection failed: {e}");
    }
}
