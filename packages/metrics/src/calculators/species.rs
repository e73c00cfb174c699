//! Species frequency ranking.

use std::collections::HashMap;

use tree_census_metrics_models::{FieldMetric, SpeciesRanking, SpeciesShare};
use tree_census_models::{LogicalField, ResolvedSchema};
use tree_census_table::{Column, TreeTable};

use super::{bump, percentage, rank, resolved_column};

/// Number of species listed in the ranking.
pub const TOP_K: usize = 5;

/// Ranks every species in `column`, highest count first.
///
/// Percentages use the number of trees with a species recorded as the
/// denominator. Equal counts keep the order in which the species first
/// appear in the table.
#[must_use]
pub fn rank_species(column: &Column) -> Vec<SpeciesShare> {
    let mut counts = Vec::new();
    let mut index = HashMap::new();
    for row in 0..column.len() {
        if let Some(name) = column.text(row) {
            bump(&mut counts, &mut index, name);
        }
    }

    let total: u64 = counts.iter().map(|(_, c)| c).sum();
    rank(counts)
        .into_iter()
        .map(|(name, count)| SpeciesShare {
            name,
            count,
            percentage: percentage(count, total),
            image: None,
        })
        .collect()
}

/// Top [`TOP_K`] species of the resolved species column.
#[must_use]
pub fn species_ranking(table: &TreeTable, schema: &ResolvedSchema) -> FieldMetric<SpeciesRanking> {
    let column = match resolved_column(table, schema, LogicalField::Species) {
        Ok(c) => c,
        Err(unavailable) => return unavailable,
    };

    let mut ranking = rank_species(column);
    let distinct_species = ranking.len();
    let total_with_species = ranking.iter().map(|s| s.count).sum();
    ranking.truncate(TOP_K);

    FieldMetric::Available(SpeciesRanking {
        top: ranking,
        distinct_species,
        total_with_species,
    })
}
