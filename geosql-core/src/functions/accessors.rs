//! Geometry accessor functions.
//!
//! ST_X, ST_Y, ST_Longitude, ST_Latitude, ST_SRID, ST_SwapXY,
//! ST_StartPoint, ST_EndPoint, ST_IsClosed, ST_Dimension

use crate::error::{Result, SpatialError};
use crate::geometry::{Geometry, Point};
use crate::srs;

fn point<'g>(g: &'g Geometry, function: &'static str) -> Result<&'g Point> {
    match g {
        Geometry::Point(p) => Ok(p),
        _ => Err(SpatialError::InvalidGisData { function }),
    }
}

fn geographic_point<'g>(g: &'g Geometry, function: &'static str) -> Result<&'g Point> {
    let p = point(g, function)?;
    if !srs::is_geographic(p.srid()) {
        return Err(SpatialError::invalid_argument(
            function,
            format!("SRID {} is not a geographic spatial reference system", p.srid()),
        ));
    }
    Ok(p)
}

fn check_range(function: &'static str, value: f64, limit: f64) -> Result<f64> {
    if !(-limit..=limit).contains(&value) {
        return Err(SpatialError::invalid_argument(
            function,
            format!("{value} is out of range [-{limit}, {limit}]"),
        ));
    }
    Ok(value)
}

// ── Coordinates ───────────────────────────────────────────────────────────────

/// ST_X — the X coordinate of a Point.
///
/// # Example
///
/// ```
/// use geosql_core::functions::accessors::st_x;
/// use geosql_core::geometry::{Geometry, Point};
///
/// let p = Geometry::from(Point::new(123.456, 78.9));
/// assert_eq!(st_x(&p).unwrap(), 123.456);
/// ```
pub fn st_x(g: &Geometry) -> Result<f64> {
    point(g, "st_x").map(Point::x)
}

/// ST_X (setter form) — a copy of the Point with X replaced.
pub fn st_set_x(g: &Geometry, x: f64) -> Result<Geometry> {
    point(g, "st_x").map(|p| p.with_x(x).into())
}

/// ST_Y — the Y coordinate of a Point.
pub fn st_y(g: &Geometry) -> Result<f64> {
    point(g, "st_y").map(Point::y)
}

pub fn st_set_y(g: &Geometry, y: f64) -> Result<Geometry> {
    point(g, "st_y").map(|p| p.with_y(y).into())
}

/// ST_Longitude — the longitude (X) of a Point in a geographic SRID.
///
/// # Example
///
/// ```
/// use geosql_core::functions::accessors::{st_longitude, st_set_longitude};
/// use geosql_core::geometry::{Geometry, Point};
///
/// let p = Geometry::from(Point::new(1.0, 2.0).with_srid(4326));
/// assert_eq!(st_longitude(&p).unwrap(), 1.0);
/// assert!(st_set_longitude(&p, 999.0).is_err());
/// ```
pub fn st_longitude(g: &Geometry) -> Result<f64> {
    geographic_point(g, "st_longitude").map(Point::x)
}

pub fn st_set_longitude(g: &Geometry, longitude: f64) -> Result<Geometry> {
    let p = geographic_point(g, "st_longitude")?;
    let longitude = check_range("st_longitude", longitude, 180.0)?;
    Ok(p.with_x(longitude).into())
}

/// ST_Latitude — the latitude (Y) of a Point in a geographic SRID.
pub fn st_latitude(g: &Geometry) -> Result<f64> {
    geographic_point(g, "st_latitude").map(Point::y)
}

pub fn st_set_latitude(g: &Geometry, latitude: f64) -> Result<Geometry> {
    let p = geographic_point(g, "st_latitude")?;
    let latitude = check_range("st_latitude", latitude, 90.0)?;
    Ok(p.with_y(latitude).into())
}

// ── Reference system ──────────────────────────────────────────────────────────

/// ST_SRID — the SRID of the root geometry.
pub fn st_srid(g: &Geometry) -> u32 {
    g.srid()
}

/// ST_SRID (setter form) — restamp every nested component with `srid`.
///
/// # Example
///
/// ```
/// use geosql_core::functions::accessors::{st_set_srid, st_srid};
/// use geosql_core::wkt;
///
/// let line = wkt::decode("LINESTRING(0 0,1 1)").unwrap();
/// let moved = st_set_srid(&line, 4326).unwrap();
/// assert_eq!(st_srid(&moved), 4326);
/// assert!(moved.points().all(|p| p.srid() == 4326));
/// assert!(st_set_srid(&line, 1234).is_err());
/// ```
pub fn st_set_srid(g: &Geometry, srid: i64) -> Result<Geometry> {
    let srid = srs::validate_srid(srid)?;
    Ok(g.clone().with_srid(srid))
}

/// ST_SwapXY — swap X and Y of every point.
pub fn st_swap_xy(g: &Geometry) -> Geometry {
    g.swap_xy()
}

// ── LineString structure ──────────────────────────────────────────────────────

/// ST_StartPoint — first point of a LineString; `None` for other shapes.
///
/// # Example
///
/// ```
/// use geosql_core::functions::accessors::st_start_point;
/// use geosql_core::wkt;
///
/// let line = wkt::decode("LINESTRING(1 2,3 4)").unwrap();
/// assert_eq!(st_start_point(&line).unwrap().to_string(), "POINT(1 2)");
/// assert!(st_start_point(&wkt::decode("POINT(1 2)").unwrap()).is_none());
/// ```
pub fn st_start_point(g: &Geometry) -> Option<Geometry> {
    match g {
        Geometry::LineString(ls) => ls.start_point().copied().map(Geometry::from),
        _ => None,
    }
}

/// ST_EndPoint — last point of a LineString; `None` for other shapes.
pub fn st_end_point(g: &Geometry) -> Option<Geometry> {
    match g {
        Geometry::LineString(ls) => ls.end_point().copied().map(Geometry::from),
        _ => None,
    }
}

/// ST_IsClosed — every component line starts where it ends.
pub fn st_is_closed(g: &Geometry) -> Option<bool> {
    match g {
        Geometry::LineString(ls) => Some(ls.is_closed()),
        Geometry::MultiLineString(ml) => Some(ml.lines().iter().all(|ls| ls.is_closed())),
        _ => None,
    }
}

/// ST_Dimension — 0, 1 or 2; `None` for an empty collection at any depth.
pub fn st_dimension(g: &Geometry) -> Option<u8> {
    g.dimension()
}
