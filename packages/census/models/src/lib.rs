#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Tree census field vocabulary and shared geographic types.
//!
//! Census exports name the same attribute differently depending on which
//! survey campaign produced them. This crate defines the canonical logical
//! fields, the ordered alias list for each one, and the [`ResolvedSchema`]
//! that records which concrete column was picked for a given table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A logical attribute of a tree record, independent of the column name a
/// particular export uses for it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogicalField {
    /// Popular or scientific species name.
    Species,
    /// Phytosanitary (health) status group.
    Phytosanitary,
    /// Total tree height in meters.
    Height,
    /// Date the tree was planted.
    PlantingDate,
    /// Regional administrative division (RPA) code.
    Region,
    /// Canopy diameter in meters.
    Canopy,
    /// Trunk circumference at breast height (CAP), in meters.
    TrunkCircumference,
    /// Trunk diameter at breast height (DAP).
    TrunkDiameter,
    /// Neighbourhood name.
    Neighbourhood,
    /// Projected easting.
    X,
    /// Projected northing.
    Y,
}

impl LogicalField {
    /// Returns every logical field.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Species,
            Self::Phytosanitary,
            Self::Height,
            Self::PlantingDate,
            Self::Region,
            Self::Canopy,
            Self::TrunkCircumference,
            Self::TrunkDiameter,
            Self::Neighbourhood,
            Self::X,
            Self::Y,
        ]
    }

    /// Candidate column names for this field, highest priority first.
    ///
    /// When several aliases are present in the same table the earliest
    /// entry wins.
    #[must_use]
    pub const fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Species => &["nome_popular", "especie"],
            Self::Phytosanitary => &[
                "fitossanid_grupo",
                "estado_fitossanitario",
                "condicao_fisica",
                "saude",
            ],
            Self::Height => &["altura", "altura_total"],
            Self::PlantingDate => &["data_plantio"],
            Self::Region => &["rpa"],
            Self::Canopy => &["copa"],
            Self::TrunkCircumference => &["cap"],
            Self::TrunkDiameter => &["dap"],
            Self::Neighbourhood => &["bairro"],
            Self::X => &["x"],
            Self::Y => &["y"],
        }
    }

    /// Every column name any logical field may resolve to.
    ///
    /// Loaders keep only these columns to bound memory on wide exports.
    #[must_use]
    pub fn essential_columns() -> Vec<&'static str> {
        Self::all()
            .iter()
            .flat_map(|f| f.candidates().iter().copied())
            .collect()
    }
}

/// Mapping from logical field to the concrete column found in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    columns: BTreeMap<LogicalField, String>,
}

impl ResolvedSchema {
    /// Creates an empty schema in which every field is unresolved.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: BTreeMap::new(),
        }
    }

    /// Records the column resolved for `field`.
    pub fn insert(&mut self, field: LogicalField, column: impl Into<String>) {
        self.columns.insert(field, column.into());
    }

    /// Returns the concrete column for `field`, if one was resolved.
    #[must_use]
    pub fn column(&self, field: LogicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    /// Fields for which no candidate column was present.
    #[must_use]
    pub fn missing(&self) -> Vec<LogicalField> {
        LogicalField::all()
            .iter()
            .copied()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCoordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Municipal limits of Recife, used to drop points projected outside
    /// the city.
    pub const RECIFE: Self = Self::new(-35.1, -8.2, -34.8, -7.9);

    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

/// The six RPAs of Recife with their region names.
pub const REGION_NAMES: &[(&str, &str)] = &[
    ("1", "Centro"),
    ("2", "Norte"),
    ("3", "Noroeste"),
    ("4", "Oeste"),
    ("5", "Sudoeste"),
    ("6", "Sul"),
];

/// Normalizes a raw region cell into its grouping key.
///
/// Integer-like values lose their decimal point (`"2.0"` becomes `"2"`);
/// anything else is kept as trimmed text. Returns `None` for blank input.
#[must_use]
pub fn normalize_region_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = trimmed.parse::<f64>()
        && value.is_finite()
        && value.fract() == 0.0
        && value.abs() < 1e15
    {
        #[allow(clippy::cast_possible_truncation)]
        return Some((value as i64).to_string());
    }

    Some(trimmed.to_string())
}

/// Display name for a region key (e.g. `"RPA 3"`).
#[must_use]
pub fn region_display_name(key: &str) -> String {
    format!("RPA {key}")
}

/// Returns the region name for a known RPA key (e.g. `"Centro"` for `"1"`).
#[must_use]
pub fn region_name(key: &str) -> Option<&'static str> {
    REGION_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_lists_are_non_empty() {
        for field in LogicalField::all() {
            assert!(!field.candidates().is_empty(), "{field:?} has no aliases");
        }
    }

    #[test]
    fn species_prefers_popular_name() {
        assert_eq!(
            LogicalField::Species.candidates(),
            &["nome_popular", "especie"]
        );
    }

    #[test]
    fn essential_columns_include_every_alias() {
        let cols = LogicalField::essential_columns();
        assert!(cols.contains(&"altura_total"));
        assert!(cols.contains(&"saude"));
        assert!(cols.contains(&"bairro"));
    }

    #[test]
    fn field_names_roundtrip_through_strum() {
        assert_eq!(LogicalField::PlantingDate.to_string(), "planting_date");
        assert_eq!(
            "trunk_circumference".parse::<LogicalField>().unwrap(),
            LogicalField::TrunkCircumference
        );
    }

    #[test]
    fn schema_reports_missing_fields() {
        let mut schema = ResolvedSchema::new();
        schema.insert(LogicalField::Species, "especie");
        assert_eq!(schema.column(LogicalField::Species), Some("especie"));
        assert!(schema.column(LogicalField::Height).is_none());
        let missing = schema.missing();
        assert!(missing.contains(&LogicalField::Height));
        assert!(!missing.contains(&LogicalField::Species));
    }

    #[test]
    fn region_keys_drop_integer_decimal_point() {
        assert_eq!(normalize_region_key("1"), Some("1".to_string()));
        assert_eq!(normalize_region_key("2.0"), Some("2".to_string()));
        assert_eq!(normalize_region_key(" 3 "), Some("3".to_string()));
    }

    #[test]
    fn region_keys_keep_non_integer_text() {
        assert_eq!(normalize_region_key("2.5"), Some("2.5".to_string()));
        assert_eq!(normalize_region_key("Centro"), Some("Centro".to_string()));
        assert_eq!(normalize_region_key("   "), None);
    }

    #[test]
    fn region_names_cover_all_six_rpas() {
        assert_eq!(region_name("1"), Some("Centro"));
        assert_eq!(region_name("6"), Some("Sul"));
        assert_eq!(region_name("7"), None);
        assert_eq!(region_display_name("4"), "RPA 4");
    }
}
