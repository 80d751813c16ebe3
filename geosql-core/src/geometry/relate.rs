//! Spatial predicates: Equals, Intersects and Within.
//!
//! Boundary tests use the orientation + bounding-box primitive throughout;
//! no distance sums, so a point on a segment is classified exactly whenever
//! the cross product is exact.

use std::cmp::Ordering;

use super::{Geometry, GeometryKind, LineString, Point, Polygon, Shape};
use crate::error::{Result, SpatialError};

// ── Primitives ────────────────────────────────────────────────────────────────

/// Turn direction of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Orientation {
    Collinear = 0,
    Clockwise = 1,
    CounterClockwise = 2,
}

/// Classify `a -> b -> c` by the sign of
/// `(b.y - a.y) * (c.x - b.x) - (b.x - a.x) * (c.y - b.y)`.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::relate::{orientation, Orientation};
/// use geosql_core::geometry::Point;
///
/// let (a, b) = (Point::new(0.0, 0.0), Point::new(1.0, 1.0));
/// assert_eq!(orientation(&a, &b, &Point::new(2.0, 2.0)), Orientation::Collinear);
/// assert_eq!(orientation(&a, &b, &Point::new(2.0, 0.0)), Orientation::Clockwise);
/// assert_eq!(orientation(&a, &b, &Point::new(0.0, 2.0)), Orientation::CounterClockwise);
/// ```
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let val = (b.y() - a.y()) * (c.x() - b.x()) - (b.x() - a.x()) * (c.y() - b.y());
    match val.partial_cmp(&0.0) {
        Some(Ordering::Greater) => Orientation::Clockwise,
        Some(Ordering::Less) => Orientation::CounterClockwise,
        _ => Orientation::Collinear,
    }
}

/// Inclusive test of `p` against the bounding box of segment `ab`.
pub fn in_bbox(p: &Point, a: &Point, b: &Point) -> bool {
    let (min_x, max_x) = (a.x().min(b.x()), a.x().max(b.x()));
    let (min_y, max_y) = (a.y().min(b.y()), a.y().max(b.y()));
    (min_x..=max_x).contains(&p.x()) && (min_y..=max_y).contains(&p.y())
}

/// Whether segments `ab` and `cd` share a point.
pub fn segments_intersect(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    let abc = orientation(a, b, c);
    let abd = orientation(a, b, d);
    let cda = orientation(c, d, a);
    let cdb = orientation(c, d, b);

    if abc != abd && cda != cdb {
        return true;
    }

    (abc == Orientation::Collinear && in_bbox(c, a, b))
        || (abd == Orientation::Collinear && in_bbox(d, a, b))
        || (cda == Orientation::Collinear && in_bbox(a, c, d))
        || (cdb == Orientation::Collinear && in_bbox(b, c, d))
}

fn point_on_line(p: &Point, line: &LineString) -> bool {
    line.segments()
        .any(|(a, b)| in_bbox(p, a, b) && orientation(a, b, p) == Orientation::Collinear)
}

fn point_on_boundary(p: &Point, poly: &Polygon) -> bool {
    poly.rings().iter().any(|ring| point_on_line(p, ring))
}

/// Ray-casting parity against a closed ring; a ray runs from `p` towards +X.
fn ring_encloses(ring: &LineString, p: &Point) -> bool {
    let mut inside = false;
    for (a, b) in ring.segments() {
        if a.y() == b.y() {
            continue;
        }
        let (lo, hi) = (a.y().min(b.y()), a.y().max(b.y()));
        if p.y() <= lo || p.y() > hi {
            continue;
        }
        let cross_x = a.x() + (p.y() - a.y()) * (b.x() - a.x()) / (b.y() - a.y());
        if p.x() < cross_x {
            inside = !inside;
        }
    }
    inside
}

/// Inside the exterior ring and outside every hole. Boundary points are
/// not classified reliably here; callers test the boundary first.
fn point_in_interior(p: &Point, poly: &Polygon) -> bool {
    ring_encloses(poly.exterior(), p)
        && !poly.interiors().iter().any(|hole| ring_encloses(hole, p))
}

// ── Intersects ────────────────────────────────────────────────────────────────

fn lines_intersect(l1: &LineString, l2: &LineString) -> bool {
    l1.segments()
        .any(|(a, b)| l2.segments().any(|(c, d)| segments_intersect(a, b, c, d)))
}

fn point_intersects_polygon(p: &Point, poly: &Polygon) -> bool {
    point_on_boundary(p, poly) || point_in_interior(p, poly)
}

fn line_intersects_polygon(line: &LineString, poly: &Polygon) -> bool {
    let endpoint_inside = [line.start_point(), line.end_point()]
        .into_iter()
        .flatten()
        .any(|p| point_intersects_polygon(p, poly));
    endpoint_inside || poly.rings().iter().any(|ring| lines_intersect(line, ring))
}

/// Shared area or boundary: a vertex of one inside the other, or crossing
/// ring edges when neither holds a vertex of the other.
fn polygons_intersect(a: &Polygon, b: &Polygon) -> bool {
    let vertex_inside = |from: &Polygon, into: &Polygon| {
        from.rings()
            .iter()
            .flat_map(LineString::points)
            .any(|p| point_intersects_polygon(p, into))
    };
    vertex_inside(a, b)
        || vertex_inside(b, a)
        || a.rings()
            .iter()
            .any(|ra| b.rings().iter().any(|rb| lines_intersect(ra, rb)))
}

/// A one-point line has no segments; treat it as its point.
fn degenerate(shape: Shape<'_>) -> Shape<'_> {
    match shape {
        Shape::LineString(ls) if ls.len() == 1 => Shape::Point(&ls.points()[0]),
        other => other,
    }
}

fn shapes_intersect(a: Shape<'_>, b: Shape<'_>) -> bool {
    match (degenerate(a), degenerate(b)) {
        (Shape::Point(p), Shape::Point(q)) => p == q,
        (Shape::Point(p), Shape::LineString(l)) | (Shape::LineString(l), Shape::Point(p)) => {
            point_on_line(p, l)
        }
        (Shape::Point(p), Shape::Polygon(poly)) | (Shape::Polygon(poly), Shape::Point(p)) => {
            point_intersects_polygon(p, poly)
        }
        (Shape::LineString(l1), Shape::LineString(l2)) => lines_intersect(l1, l2),
        (Shape::LineString(l), Shape::Polygon(poly))
        | (Shape::Polygon(poly), Shape::LineString(l)) => line_intersects_polygon(l, poly),
        (Shape::Polygon(p1), Shape::Polygon(p2)) => polygons_intersect(p1, p2),
    }
}

/// Whether `a` and `b` share at least one point. Multi* values and
/// collections intersect when any pair of their members does.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::relate::intersects;
/// use geosql_core::wkt;
///
/// let square = wkt::decode("POLYGON((0 0,0 4,4 4,4 0,0 0))").unwrap();
/// let line = wkt::decode("LINESTRING(-1 2,5 2)").unwrap();
/// let far = wkt::decode("POINT(9 9)").unwrap();
/// assert!(intersects(&square, &line));
/// assert!(!intersects(&square, &far));
/// ```
pub fn intersects(a: &Geometry, b: &Geometry) -> bool {
    a.shapes()
        .any(|sa| b.shapes().any(|sb| shapes_intersect(sa, sb)))
}

// ── Within ────────────────────────────────────────────────────────────────────

/// Points strictly on an open line's endpoints are on its boundary, not
/// within it.
fn point_within_line(p: &Point, line: &LineString) -> bool {
    if !line.is_closed() && (line.start_point() == Some(p) || line.end_point() == Some(p)) {
        return false;
    }
    match line.points() {
        [only] => only == p,
        _ => point_on_line(p, line),
    }
}

fn point_within_polygon(p: &Point, poly: &Polygon) -> bool {
    !point_on_boundary(p, poly) && point_in_interior(p, poly)
}

fn point_within_shape(p: &Point, shape: Shape<'_>) -> bool {
    match shape {
        Shape::Point(q) => p == q,
        Shape::LineString(l) => point_within_line(p, l),
        Shape::Polygon(poly) => point_within_polygon(p, poly),
    }
}

fn point_within(p: &Point, g: &Geometry) -> bool {
    g.shapes().any(|shape| point_within_shape(p, shape))
}

/// Whether `a` lies within `b`.
///
/// The left operand must be a Point or a non-empty MultiPoint; any other
/// left shape fails with `UnsupportedGeometryType`.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::relate::within;
/// use geosql_core::wkt;
///
/// let square = wkt::decode("POLYGON((0 0,0 4,4 4,4 0,0 0))").unwrap();
/// assert!(within(&wkt::decode("POINT(1 1)").unwrap(), &square).unwrap());
/// assert!(!within(&wkt::decode("POINT(0 2)").unwrap(), &square).unwrap());
/// assert!(within(&square, &square).is_err());
/// ```
pub fn within(a: &Geometry, b: &Geometry) -> Result<bool> {
    match a {
        Geometry::Point(p) => Ok(point_within(p, b)),
        Geometry::MultiPoint(mp) => {
            let points = mp.points();
            Ok(!points.is_empty() && points.iter().all(|p| point_within(p, b)))
        }
        other => Err(unsupported("st_within", other.kind(), b.kind())),
    }
}

fn unsupported(function: &'static str, left: GeometryKind, right: GeometryKind) -> SpatialError {
    SpatialError::UnsupportedGeometryType {
        function,
        left: left.geojson_name(),
        right: right.geojson_name(),
    }
}

// ── Equals ────────────────────────────────────────────────────────────────────

fn point_set(g: &Geometry) -> Vec<(f64, f64)> {
    // adding +0.0 folds -0.0 into 0.0 so total_cmp orders them together
    let mut set: Vec<(f64, f64)> = g.points().map(|p| (p.x() + 0.0, p.y() + 0.0)).collect();
    set.sort_by(|l, r| l.0.total_cmp(&r.0).then(l.1.total_cmp(&r.1)));
    set.dedup();
    set
}

/// Coordinate equality for two points; set equality of the flattened
/// point sets otherwise.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::relate::equals;
/// use geosql_core::wkt;
///
/// let a = wkt::decode("MULTIPOINT(1 2,3 4,1 2)").unwrap();
/// let b = wkt::decode("LINESTRING(3 4,1 2)").unwrap();
/// assert!(equals(&a, &b));
/// ```
pub fn equals(a: &Geometry, b: &Geometry) -> bool {
    match (a, b) {
        (Geometry::Point(p), Geometry::Point(q)) => p == q,
        _ => point_set(a) == point_set(b),
    }
}
