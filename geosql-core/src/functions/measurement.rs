//! Measurement functions.
//!
//! ST_Area, ST_Perimeter, ST_Length, ST_Distance

use crate::error::{Result, SpatialError};
use crate::geometry::{measure, Geometry};
use crate::srs;

/// Geographic systems are not measured yet, and Cartesian ones have no unit.
fn check_units(function: &'static str, srid: u32, unit: Option<&str>) -> Result<()> {
    if srs::is_geographic(srid) {
        return Err(SpatialError::UnsupportedSrid { function, srid });
    }
    match unit {
        Some(unit) => Err(SpatialError::NoUnitsForSrid {
            function,
            srid,
            unit: unit.to_owned(),
        }),
        None => Ok(()),
    }
}

/// ST_Area — planar area of a Polygon, holes subtracted; `None` for other shapes.
///
/// # Example
///
/// ```
/// use geosql_core::functions::measurement::st_area;
/// use geosql_core::wkt;
///
/// let square = wkt::decode("POLYGON((0 0,0 1,1 1,1 0,0 0))").unwrap();
/// assert_eq!(st_area(&square), Some(1.0));
/// assert_eq!(st_area(&wkt::decode("POINT(1 1)").unwrap()), None);
/// ```
pub fn st_area(g: &Geometry) -> Option<f64> {
    match g {
        Geometry::Polygon(poly) => Some(measure::area(poly)),
        _ => None,
    }
}

/// ST_Perimeter — summed length of every ring of a Polygon.
pub fn st_perimeter(g: &Geometry) -> Option<f64> {
    match g {
        Geometry::Polygon(poly) => Some(measure::perimeter(poly)),
        _ => None,
    }
}

/// ST_Length — length of a LineString. A `unit` is rejected on Cartesian
/// values.
///
/// # Example
///
/// ```
/// use geosql_core::functions::measurement::st_length;
/// use geosql_core::wkt;
///
/// let line = wkt::decode("LINESTRING(0 0,3 4)").unwrap();
/// assert_eq!(st_length(&line, None).unwrap(), Some(5.0));
/// assert!(st_length(&line, Some("metre")).is_err());
/// ```
pub fn st_length(g: &Geometry, unit: Option<&str>) -> Result<Option<f64>> {
    let Geometry::LineString(ls) = g else {
        return Ok(None);
    };
    if unit.is_some() {
        check_units("st_length", g.srid(), unit)?;
    }
    Ok(Some(measure::length(ls)))
}

/// ST_Distance — closest-vertex distance between two Cartesian geometries.
///
/// # Example
///
/// ```
/// use geosql_core::functions::measurement::st_distance;
/// use geosql_core::functions::constructors::point;
///
/// let d = st_distance(&point(100.0, 200.0), &point(101.0, 201.0), None).unwrap();
/// assert_eq!(d, Some(2f64.sqrt()));
/// ```
pub fn st_distance(a: &Geometry, b: &Geometry, unit: Option<&str>) -> Result<Option<f64>> {
    const FUNCTION: &str = "st_distance";
    if a.srid() != b.srid() {
        return Err(SpatialError::DiffSrids {
            function: FUNCTION,
            left: a.srid(),
            right: b.srid(),
        });
    }
    check_units(FUNCTION, a.srid(), unit)?;
    Ok(measure::distance(a, b))
}
