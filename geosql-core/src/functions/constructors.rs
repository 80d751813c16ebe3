//! Geometry constructor functions.
//!
//! Point, LineString, Polygon, MultiPoint, MultiLineString, MultiPolygon,
//! GeometryCollection / GeomCollection

use crate::error::{Result, SpatialError};
use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

/// The SRID shared by every argument, or `0` when there are none.
fn common_srid(function: &'static str, parts: &[&Geometry]) -> Result<u32> {
    let Some((first, rest)) = parts.split_first() else {
        return Ok(0);
    };
    let srid = first.srid();
    match rest.iter().find(|g| g.srid() != srid) {
        Some(other) => Err(SpatialError::DiffSrids {
            function,
            left: srid,
            right: other.srid(),
        }),
        None => Ok(srid),
    }
}

fn at_least(function: &'static str, parts: &[&Geometry], min: usize) -> Result<()> {
    if parts.len() < min {
        return Err(SpatialError::InvalidArgumentCount {
            function,
            given: parts.len(),
        });
    }
    Ok(())
}

/// Collect the members of one variant, failing on any other shape.
fn members<'g, T: 'g>(
    function: &'static str,
    parts: &[&'g Geometry],
    pick: impl Fn(&'g Geometry) -> Option<&'g T>,
) -> Result<Vec<&'g T>> {
    parts
        .iter()
        .map(|&g| pick(g).ok_or(SpatialError::InvalidGisData { function }))
        .collect()
}

fn as_point(g: &Geometry) -> Option<&Point> {
    match g {
        Geometry::Point(p) => Some(p),
        _ => None,
    }
}

fn as_line(g: &Geometry) -> Option<&LineString> {
    match g {
        Geometry::LineString(ls) => Some(ls),
        _ => None,
    }
}

fn as_polygon(g: &Geometry) -> Option<&Polygon> {
    match g {
        Geometry::Polygon(p) => Some(p),
        _ => None,
    }
}

/// Point — a Cartesian point (SRID 0).
///
/// # Example
///
/// ```
/// use geosql_core::functions::constructors::point;
///
/// assert_eq!(point(1.0, 2.0).to_string(), "POINT(1 2)");
/// ```
pub fn point(x: f64, y: f64) -> Geometry {
    Point::new(x, y).into()
}

/// LineString — at least two Point arguments sharing one SRID.
///
/// # Example
///
/// ```
/// use geosql_core::functions::constructors::{line_string, point};
///
/// let line = line_string(&[&point(0.0, 0.0), &point(1.0, 1.0)]).unwrap();
/// assert_eq!(line.to_string(), "LINESTRING(0 0,1 1)");
/// assert!(line_string(&[&point(0.0, 0.0)]).is_err());
/// ```
pub fn line_string(parts: &[&Geometry]) -> Result<Geometry> {
    const FUNCTION: &str = "linestring";
    at_least(FUNCTION, parts, 2)?;
    let srid = common_srid(FUNCTION, parts)?;
    let points = members(FUNCTION, parts, as_point)?;
    Ok(LineString::new(srid, points.into_iter().copied().collect()).into())
}

/// Polygon — one or more closed LineString rings, exterior first.
///
/// # Example
///
/// ```
/// use geosql_core::functions::constructors::polygon;
/// use geosql_core::wkt;
///
/// let ring = wkt::decode("LINESTRING(0 0,0 1,1 1,1 0,0 0)").unwrap();
/// assert_eq!(polygon(&[&ring]).unwrap().to_string(), "POLYGON((0 0,0 1,1 1,1 0,0 0))");
///
/// let open = wkt::decode("LINESTRING(0 0,0 1,1 1)").unwrap();
/// assert!(polygon(&[&open]).is_err());
/// ```
pub fn polygon(parts: &[&Geometry]) -> Result<Geometry> {
    const FUNCTION: &str = "polygon";
    at_least(FUNCTION, parts, 1)?;
    let srid = common_srid(FUNCTION, parts)?;
    let rings = members(FUNCTION, parts, as_line)?;
    Polygon::new(srid, rings.into_iter().cloned().collect())
        .map(Geometry::from)
        .map_err(|_| SpatialError::InvalidGisData { function: FUNCTION })
}

/// MultiPoint — one or more Point arguments.
pub fn multi_point(parts: &[&Geometry]) -> Result<Geometry> {
    const FUNCTION: &str = "multipoint";
    at_least(FUNCTION, parts, 1)?;
    let srid = common_srid(FUNCTION, parts)?;
    let points = members(FUNCTION, parts, as_point)?;
    Ok(MultiPoint::new(srid, points.into_iter().copied().collect()).into())
}

/// MultiLineString — one or more LineString arguments.
pub fn multi_line_string(parts: &[&Geometry]) -> Result<Geometry> {
    const FUNCTION: &str = "multilinestring";
    at_least(FUNCTION, parts, 1)?;
    let srid = common_srid(FUNCTION, parts)?;
    let lines = members(FUNCTION, parts, as_line)?;
    Ok(MultiLineString::new(srid, lines.into_iter().cloned().collect()).into())
}

/// MultiPolygon — one or more Polygon arguments.
pub fn multi_polygon(parts: &[&Geometry]) -> Result<Geometry> {
    const FUNCTION: &str = "multipolygon";
    at_least(FUNCTION, parts, 1)?;
    let srid = common_srid(FUNCTION, parts)?;
    let polygons = members(FUNCTION, parts, as_polygon)?;
    Ok(MultiPolygon::new(srid, polygons.into_iter().cloned().collect()).into())
}

/// GeometryCollection — any number of geometries of any kind.
///
/// # Example
///
/// ```
/// use geosql_core::functions::constructors::{geometry_collection, point};
///
/// assert_eq!(geometry_collection(&[]).unwrap().to_string(), "GEOMETRYCOLLECTION()");
/// let gc = geometry_collection(&[&point(1.0, 2.0)]).unwrap();
/// assert_eq!(gc.to_string(), "GEOMETRYCOLLECTION(POINT(1 2))");
/// ```
pub fn geometry_collection(parts: &[&Geometry]) -> Result<Geometry> {
    let srid = common_srid("geometrycollection", parts)?;
    let members = parts.iter().map(|g| (*g).clone()).collect();
    Ok(GeometryCollection::new(srid, members)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wkt;

    fn text(s: &str) -> Geometry {
        wkt::decode(s).unwrap()
    }

    #[test]
    fn line_needs_points() {
        let a = point(0.0, 0.0);
        let ring = text("LINESTRING(0 0,1 1)");
        assert!(matches!(
            line_string(&[&a, &ring]),
            Err(SpatialError::InvalidGisData { function: "linestring" })
        ));
    }

    #[test]
    fn mixed_srids_fail() {
        let a = point(0.0, 0.0);
        let b = Geometry::from(Point::new(1.0, 1.0).with_srid(4326));
        assert!(matches!(
            line_string(&[&a, &b]),
            Err(SpatialError::DiffSrids {
                left: 0,
                right: 4326,
                ..
            })
        ));
        assert!(geometry_collection(&[&a, &b]).is_err());
    }

    #[test]
    fn srid_carries_to_members() {
        let a = Geometry::from(Point::new(0.0, 0.0).with_srid(4326));
        let b = Geometry::from(Point::new(1.0, 1.0).with_srid(4326));
        let line = line_string(&[&a, &b]).unwrap();
        assert_eq!(line.srid(), 4326);
        assert!(line.points().all(|p| p.srid() == 4326));
    }

    #[test]
    fn polygon_with_hole() {
        let outer = text("LINESTRING(0 0,3 0,0 3,0 0)");
        let hole = text("LINESTRING(1 1,2 1,1 2,1 1)");
        let poly = polygon(&[&outer, &hole]).unwrap();
        assert_eq!(
            poly.to_string(),
            "POLYGON((0 0,3 0,0 3,0 0),(1 1,2 1,1 2,1 1))"
        );
    }

    #[test]
    fn multis_keep_order() {
        let pts = [point(3.0, 4.0), point(1.0, 2.0)];
        let mp = multi_point(&[&pts[0], &pts[1]]).unwrap();
        assert_eq!(mp.to_string(), "MULTIPOINT(3 4,1 2)");
        assert!(multi_point(&[]).is_err());

        let l = text("LINESTRING(0 0,1 1)");
        assert_eq!(
            multi_line_string(&[&l, &l]).unwrap().to_string(),
            "MULTILINESTRING((0 0,1 1),(0 0,1 1))"
        );
        assert!(multi_line_string(&[&pts[0]]).is_err());

        let p = text("POLYGON((0 0,1 1,1 0,0 0))");
        assert_eq!(
            multi_polygon(&[&p]).unwrap().to_string(),
            "MULTIPOLYGON(((0 0,1 1,1 0,0 0)))"
        );
        assert!(multi_polygon(&[&l]).is_err());
    }

    #[test]
    fn nested_collections() {
        let inner = geometry_collection(&[]).unwrap();
        let outer = geometry_collection(&[&inner, &point(1.0, 2.0)]).unwrap();
        assert_eq!(
            outer.to_string(),
            "GEOMETRYCOLLECTION(GEOMETRYCOLLECTION(),POINT(1 2))"
        );
        assert_eq!(outer.concrete_count(), 1);
    }
}
