//! UTM to WGS84 reprojection.
//!
//! Implements the inverse transverse Mercator series (Snyder, USGS PP 1395)
//! for the two CRS definitions census exports have been delivered in. The
//! series is accurate to well under a meter inside a UTM zone, far below
//! the precision of a tree survey.

use geo::{Coord, coord};
use tree_census_table::{Column, TreeTable};

use crate::GeoError;

/// Name of the latitude column added by [`project_table`].
pub const LATITUDE_COLUMN: &str = "latitude";

/// Name of the longitude column added by [`project_table`].
pub const LONGITUDE_COLUMN: &str = "longitude";

/// EPSG code of SIRGAS 2000 / UTM zone 25S, tried first.
pub const PRIMARY_EPSG: u32 = 31985;

/// EPSG code of WGS 84 / UTM zone 25S, used when the primary CRS cannot be
/// constructed.
pub const FALLBACK_EPSG: u32 = 32725;

const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub semi_major_axis: f64,
    /// Inverse flattening.
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// GRS 1980, used by SIRGAS 2000.
    pub const GRS80: Self = Self {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_222_101,
    };

    /// WGS 84.
    pub const WGS84: Self = Self {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    /// First eccentricity squared.
    #[must_use]
    pub fn eccentricity_squared(self) -> f64 {
        let f = 1.0 / self.inverse_flattening;
        f.mul_add(-f, 2.0 * f)
    }
}

/// A projected UTM coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmDefinition {
    /// EPSG code.
    pub epsg: u32,
    /// Human-readable name.
    pub name: &'static str,
    /// Reference ellipsoid.
    pub ellipsoid: Ellipsoid,
    /// UTM zone number (1-60).
    pub zone: u8,
    /// Whether this is a southern-hemisphere zone.
    pub south: bool,
}

impl UtmDefinition {
    /// Central meridian of the zone, in degrees.
    #[must_use]
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.zone).mul_add(6.0, -183.0)
    }
}

const REGISTRY: &[UtmDefinition] = &[
    UtmDefinition {
        epsg: PRIMARY_EPSG,
        name: "SIRGAS 2000 / UTM zone 25S",
        ellipsoid: Ellipsoid::GRS80,
        zone: 25,
        south: true,
    },
    UtmDefinition {
        epsg: FALLBACK_EPSG,
        name: "WGS 84 / UTM zone 25S",
        ellipsoid: Ellipsoid::WGS84,
        zone: 25,
        south: true,
    },
];

/// Converts projected coordinates of one CRS to WGS84 longitude/latitude.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    definition: UtmDefinition,
    a: f64,
    e2: f64,
    ep2: f64,
    e1: f64,
    mu_denominator: f64,
    lon0: f64,
    false_northing: f64,
}

impl Transformer {
    /// Builds a transformer from the registered definition for `epsg`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnsupportedCrs`] if `epsg` is not registered or
    /// its definition is invalid.
    pub fn from_epsg(epsg: u32) -> Result<Self, GeoError> {
        let definition = REGISTRY
            .iter()
            .find(|d| d.epsg == epsg)
            .ok_or(GeoError::UnsupportedCrs { epsg })?;
        Self::from_definition(*definition)
    }

    /// Builds a transformer from an explicit definition.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnsupportedCrs`] if the zone is outside 1-60.
    pub fn from_definition(definition: UtmDefinition) -> Result<Self, GeoError> {
        if !(1..=60).contains(&definition.zone) {
            return Err(GeoError::UnsupportedCrs {
                epsg: definition.epsg,
            });
        }

        let a = definition.ellipsoid.semi_major_axis;
        let e2 = definition.ellipsoid.eccentricity_squared();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let root = (1.0 - e2).sqrt();

        Ok(Self {
            definition,
            a,
            e2,
            ep2: e2 / (1.0 - e2),
            e1: (1.0 - root) / (1.0 + root),
            mu_denominator: a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0),
            lon0: definition.central_meridian().to_radians(),
            false_northing: if definition.south {
                FALSE_NORTHING_SOUTH
            } else {
                0.0
            },
        })
    }

    /// Builds a transformer for `primary`, falling back to `fallback` only
    /// if the primary one cannot be constructed.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error if neither CRS can be constructed.
    pub fn with_fallback(primary: u32, fallback: u32) -> Result<Self, GeoError> {
        match Self::from_epsg(primary) {
            Ok(t) => Ok(t),
            Err(e) => {
                log::warn!("Could not build EPSG:{primary} transformer ({e}), using EPSG:{fallback}");
                Self::from_epsg(fallback)
            }
        }
    }

    /// The transformer used for Recife census exports.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if neither UTM 25S definition can be built.
    pub fn census_default() -> Result<Self, GeoError> {
        Self::with_fallback(PRIMARY_EPSG, FALLBACK_EPSG)
    }

    /// The CRS this transformer reads.
    #[must_use]
    pub const fn definition(&self) -> &UtmDefinition {
        &self.definition
    }

    /// Converts an easting/northing pair to a longitude (`x`) / latitude
    /// (`y`) pair in degrees.
    #[must_use]
    pub fn to_geographic(&self, projected: Coord<f64>) -> Coord<f64> {
        let (a, e2, ep2, e1) = (self.a, self.e2, self.ep2, self.e1);

        let x = (projected.x - FALSE_EASTING) / SCALE_FACTOR;
        let m = (projected.y - self.false_northing) / SCALE_FACTOR;
        let mu = m / self.mu_denominator;

        let phi1 = mu
            + (1.5 * e1 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let s = e2.mul_add(-sin1 * sin1, 1.0);
        let n1 = a / s.sqrt();
        let r1 = a * (1.0 - e2) / s.powf(1.5);
        let d = x / n1;

        let lat = phi1
            - (n1 * tan1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;

        coord! { x: lon.to_degrees(), y: lat.to_degrees() }
    }
}

/// Projected latitude/longitude sequences, aligned with the input rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectedColumns {
    /// Latitude per row; `None` where the input was missing.
    pub latitude: Vec<Option<f64>>,
    /// Longitude per row; `None` where the input was missing.
    pub longitude: Vec<Option<f64>>,
}

/// Projects x/y sequences to latitude/longitude.
///
/// Missing or non-finite inputs are transformed as the sentinel `(0, 0)`
/// and then masked back to `None`, so a missing input never yields a
/// coordinate.
///
/// # Errors
///
/// Returns [`GeoError::LengthMismatch`] if `x` and `y` differ in length.
pub fn project(
    transformer: &Transformer,
    x: &[Option<f64>],
    y: &[Option<f64>],
) -> Result<ProjectedColumns, GeoError> {
    if x.len() != y.len() {
        return Err(GeoError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    let mut out = ProjectedColumns {
        latitude: Vec::with_capacity(x.len()),
        longitude: Vec::with_capacity(x.len()),
    };

    for (xi, yi) in x.iter().zip(y) {
        let valid = (*xi)
            .zip(*yi)
            .filter(|(a, b)| a.is_finite() && b.is_finite());
        let (px, py) = valid.unwrap_or((0.0, 0.0));
        let geo = transformer.to_geographic(coord! { x: px, y: py });

        if valid.is_some() && geo.x.is_finite() && geo.y.is_finite() {
            out.latitude.push(Some(geo.y));
            out.longitude.push(Some(geo.x));
        } else {
            out.latitude.push(None);
            out.longitude.push(None);
        }
    }

    Ok(out)
}

/// Coerces the `x`/`y` columns of `table` to numbers and adds
/// [`LATITUDE_COLUMN`] / [`LONGITUDE_COLUMN`].
///
/// Returns the number of rows that received a coordinate. The x/y values
/// themselves are not modified beyond numeric coercion.
///
/// # Errors
///
/// Returns [`GeoError`] if the columns cannot be written back.
pub fn project_table(
    table: &mut TreeTable,
    transformer: &Transformer,
    x_column: &str,
    y_column: &str,
) -> Result<usize, GeoError> {
    table.coerce_numeric(x_column);
    table.coerce_numeric(y_column);

    let numbers = |name: &str| -> Vec<Option<f64>> {
        table.column(name).map_or_else(
            || vec![None; table.len()],
            |c| (0..table.len()).map(|i| c.number(i)).collect(),
        )
    };
    let xs = numbers(x_column);
    let ys = numbers(y_column);

    let projected = project(transformer, &xs, &ys)?;
    let located = projected.latitude.iter().filter(|v| v.is_some()).count();

    table.insert_column(LATITUDE_COLUMN, Column::Number(projected.latitude))?;
    table.insert_column(LONGITUDE_COLUMN, Column::Number(projected.longitude))?;

    log::info!(
        "Projected {located}/{} rows from {}",
        table.len(),
        transformer.definition().name
    );

    Ok(located)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARCO_ZERO_E: f64 = 293_802.680_847;
    const MARCO_ZERO_N: f64 = 9_108_253.958_882;

    #[test]
    fn inverts_known_recife_point() {
        let t = Transformer::from_epsg(PRIMARY_EPSG).unwrap();
        let geo = t.to_geographic(coord! { x: MARCO_ZERO_E, y: MARCO_ZERO_N });
        assert!((geo.y - -8.0631).abs() < 1e-6, "lat {}", geo.y);
        assert!((geo.x - -34.8711).abs() < 1e-6, "lon {}", geo.x);
    }

    #[test]
    fn central_meridian_maps_to_zone_center() {
        let t = Transformer::from_epsg(FALLBACK_EPSG).unwrap();
        let geo = t.to_geographic(coord! { x: 500_000.0, y: 10_000_000.0 });
        assert!(geo.y.abs() < 1e-9);
        assert!((geo.x - -33.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_epsg_is_rejected() {
        assert!(matches!(
            Transformer::from_epsg(4326),
            Err(GeoError::UnsupportedCrs { epsg: 4326 })
        ));
    }

    #[test]
    fn falls_back_when_primary_cannot_be_built() {
        let t = Transformer::with_fallback(999_999, FALLBACK_EPSG).unwrap();
        assert_eq!(t.definition().epsg, FALLBACK_EPSG);
    }

    #[test]
    fn prefers_primary_when_available() {
        let t = Transformer::census_default().unwrap();
        assert_eq!(t.definition().epsg, PRIMARY_EPSG);
    }

    #[test]
    fn invalid_zone_is_rejected() {
        let mut def = REGISTRY[0];
        def.zone = 0;
        assert!(Transformer::from_definition(def).is_err());
    }

    #[test]
    fn missing_inputs_are_masked() {
        let t = Transformer::census_default().unwrap();
        let x = [Some(MARCO_ZERO_E), None, Some(MARCO_ZERO_E), Some(f64::NAN)];
        let y = [Some(MARCO_ZERO_N), Some(MARCO_ZERO_N), None, Some(MARCO_ZERO_N)];
        let out = project(&t, &x, &y).unwrap();
        assert!(out.latitude[0].is_some());
        assert!(out.longitude[0].is_some());
        for i in 1..4 {
            assert_eq!(out.latitude[i], None, "row {i} latitude");
            assert_eq!(out.longitude[i], None, "row {i} longitude");
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let t = Transformer::census_default().unwrap();
        assert!(matches!(
            project(&t, &[Some(1.0)], &[]),
            Err(GeoError::LengthMismatch { x: 1, y: 0 })
        ));
    }

    #[test]
    fn project_table_adds_coordinate_columns() {
        let mut table = TreeTable::from_columns(vec![
            (
                "x".to_string(),
                Column::Text(vec![Some("293802,680847".to_string()), None]),
            ),
            (
                "y".to_string(),
                Column::Text(vec![Some("9108253.958882".to_string()), Some("1".to_string())]),
            ),
        ])
        .unwrap();
        let t = Transformer::census_default().unwrap();

        let located = project_table(&mut table, &t, "x", "y").unwrap();

        assert_eq!(located, 1);
        let lat = table.column(LATITUDE_COLUMN).unwrap();
        assert!((lat.number(0).unwrap() - -8.0631).abs() < 1e-5);
        assert_eq!(lat.number(1), None);
        assert_eq!(table.column(LONGITUDE_COLUMN).unwrap().number(1), None);
        assert_eq!(
            table.column("x").unwrap(),
            &Column::Number(vec![Some(293_802.680_847), None])
        );
    }
}
