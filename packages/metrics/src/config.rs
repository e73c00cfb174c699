//! Pipeline configuration from environment variables.

use std::path::PathBuf;

use crate::MetricsError;

/// Default census export path.
pub const DEFAULT_DATA_PATH: &str = "censo_arboreo_final_geral.csv";

/// Default analysis notebook path.
pub const DEFAULT_NOTEBOOK_PATH: &str = "notebook/Verdefica_Unificado_12nov2025.ipynb";

/// Default directory of species photographs.
pub const DEFAULT_SPECIES_DIR: &str = "especies";

/// Where the pipeline reads its inputs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Census CSV export (`TREE_CENSUS_DATA`).
    pub data_path: PathBuf,
    /// CSV field delimiter (`TREE_CENSUS_DELIMITER`).
    pub delimiter: u8,
    /// Analysis notebook (`TREE_CENSUS_NOTEBOOK`).
    pub notebook_path: PathBuf,
    /// Species photographs (`TREE_CENSUS_SPECIES_DIR`).
    pub species_images_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            delimiter: b',',
            notebook_path: PathBuf::from(DEFAULT_NOTEBOOK_PATH),
            species_images_dir: PathBuf::from(DEFAULT_SPECIES_DIR),
        }
    }
}

impl PipelineConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::InvalidConfig`] if `TREE_CENSUS_DELIMITER`
    /// is not a single ASCII character.
    pub fn from_env() -> Result<Self, MetricsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset or empty variables.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::InvalidConfig`] if the delimiter is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MetricsError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        // A literal tab is all whitespace, so the delimiter is not trimmed.
        let delimiter = match lookup("TREE_CENSUS_DELIMITER").filter(|v| !v.is_empty()) {
            Some(value) => parse_delimiter(&value)?,
            None => defaults.delimiter,
        };

        Ok(Self {
            data_path: get("TREE_CENSUS_DATA").map_or(defaults.data_path, PathBuf::from),
            delimiter,
            notebook_path: get("TREE_CENSUS_NOTEBOOK").map_or(defaults.notebook_path, PathBuf::from),
            species_images_dir: get("TREE_CENSUS_SPECIES_DIR")
                .map_or(defaults.species_images_dir, PathBuf::from),
        })
    }
}

/// Parses a one-character delimiter. `\t` and `tab` mean a tab.
///
/// # Errors
///
/// Returns [`MetricsError::InvalidConfig`] for anything else.
pub fn parse_delimiter(value: &str) -> Result<u8, MetricsError> {
    match value {
        "\\t" | "tab" | "\t" => return Ok(b'\t'),
        _ => {}
    }

    match value.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(MetricsError::InvalidConfig {
            name: "TREE_CENSUS_DELIMITER".to_string(),
            message: format!("expected a single ASCII character, got '{value}'"),
        }),
    }
}
