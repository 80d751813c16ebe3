//! Planar measurements.
//!
//! Area, perimeter, length and point-set distance on the Cartesian plane,
//! computed with `geo`'s Euclidean metric space.

use geo::algorithm::line_measures::metric_spaces::Euclidean;
use geo::algorithm::line_measures::{Distance, Length};
use geo::{Area, BoundingRect};

use super::{Geometry, LineString, Point, Polygon};

fn to_geo_point(p: &Point) -> geo::Point<f64> {
    geo::Point::new(p.x(), p.y())
}

fn to_geo_line(ls: &LineString) -> geo::LineString<f64> {
    ls.points().iter().map(|p| (p.x(), p.y())).collect()
}

fn to_geo_polygon(poly: &Polygon) -> geo::Polygon<f64> {
    geo::Polygon::new(
        to_geo_line(poly.exterior()),
        poly.interiors().iter().map(to_geo_line).collect(),
    )
}

/// Exterior area minus the area of every hole.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::{measure, Geometry};
/// use geosql_core::wkt;
///
/// let Geometry::Polygon(p) = wkt::decode("POLYGON((0 0,0 1,1 1,1 0,0 0))").unwrap() else {
///     unreachable!()
/// };
/// assert_eq!(measure::area(&p), 1.0);
/// ```
pub fn area(poly: &Polygon) -> f64 {
    to_geo_polygon(poly).unsigned_area()
}

/// Summed length of every ring.
pub fn perimeter(poly: &Polygon) -> f64 {
    poly.rings()
        .iter()
        .map(|ring| Euclidean.length(&to_geo_line(ring)))
        .sum()
}

pub fn length(ls: &LineString) -> f64 {
    Euclidean.length(&to_geo_line(ls))
}

/// Minimum distance between the point sets of `a` and `b`.
/// `None` when either side has no points.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::{measure, Geometry, Point};
///
/// let a = Geometry::from(Point::new(100.0, 200.0));
/// let b = Geometry::from(Point::new(101.0, 201.0));
/// assert_eq!(measure::distance(&a, &b), Some(2f64.sqrt()));
/// ```
pub fn distance(a: &Geometry, b: &Geometry) -> Option<f64> {
    let right: Vec<geo::Point<f64>> = b.points().map(to_geo_point).collect();
    a.points()
        .map(to_geo_point)
        .flat_map(|pa| right.iter().map(move |&pb| Euclidean.distance(pa, pb)))
        .min_by(f64::total_cmp)
}

/// Axis-aligned extent of a geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Extent over every point; `None` for a geometry without points.
    pub fn of(g: &Geometry) -> Option<Self> {
        let points: geo::MultiPoint<f64> = g.points().map(to_geo_point).collect();
        points.bounding_rect().map(|rect| Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }
}
