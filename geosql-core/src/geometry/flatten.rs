//! Iterative traversal over nested geometries.
//!
//! Everything here runs on an explicit stack, so traversal cost never grows
//! the call stack regardless of collection depth.

use std::iter::Flatten;
use std::slice;

use super::{Geometry, LineString, Point, Polygon};

/// Pre-order walk over a geometry and every collection member, yielding each
/// node with its collection level (the root is level 0).
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(&'a Geometry, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a Geometry, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, level) = self.stack.pop()?;
        if let Geometry::GeometryCollection(gc) = node {
            self.stack
                .extend(gc.geometries().iter().rev().map(|child| (child, level + 1)));
        }
        Some((node, level))
    }
}

/// A single Point, LineString or Polygon inside a geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Point(&'a Point),
    LineString(&'a LineString),
    Polygon(&'a Polygon),
}

impl<'a> Shape<'a> {
    pub fn points(self) -> ShapePoints<'a> {
        match self {
            Shape::Point(p) => ShapePoints::Single(Some(p)),
            Shape::LineString(ls) => ShapePoints::Line(ls.points().iter()),
            Shape::Polygon(poly) => ShapePoints::Rings(poly.rings().iter().flatten()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ShapePoints<'a> {
    Single(Option<&'a Point>),
    Line(slice::Iter<'a, Point>),
    Rings(Flatten<slice::Iter<'a, LineString>>),
}

impl<'a> Iterator for ShapePoints<'a> {
    type Item = &'a Point;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ShapePoints::Single(p) => p.take(),
            ShapePoints::Line(it) => it.next(),
            ShapePoints::Rings(it) => it.next(),
        }
    }
}

enum Members<'a> {
    Single(Option<Shape<'a>>),
    Points(slice::Iter<'a, Point>),
    Lines(slice::Iter<'a, LineString>),
    Polygons(slice::Iter<'a, Polygon>),
}

impl<'a> Members<'a> {
    fn of(g: &'a Geometry) -> Self {
        match g {
            Geometry::Point(p) => Members::Single(Some(Shape::Point(p))),
            Geometry::LineString(ls) => Members::Single(Some(Shape::LineString(ls))),
            Geometry::Polygon(p) => Members::Single(Some(Shape::Polygon(p))),
            Geometry::MultiPoint(mp) => Members::Points(mp.points().iter()),
            Geometry::MultiLineString(ml) => Members::Lines(ml.lines().iter()),
            Geometry::MultiPolygon(mp) => Members::Polygons(mp.polygons().iter()),
            Geometry::GeometryCollection(_) => Members::Single(None),
        }
    }

    fn next(&mut self) -> Option<Shape<'a>> {
        match self {
            Members::Single(s) => s.take(),
            Members::Points(it) => it.next().map(Shape::Point),
            Members::Lines(it) => it.next().map(Shape::LineString),
            Members::Polygons(it) => it.next().map(Shape::Polygon),
        }
    }
}

/// Every Point, LineString and Polygon in a geometry, Multi* members and
/// collections expanded, in document order.
pub struct Shapes<'a> {
    walk: Walk<'a>,
    current: Members<'a>,
}

impl<'a> Iterator for Shapes<'a> {
    type Item = Shape<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(shape) = self.current.next() {
                return Some(shape);
            }
            let (node, _) = self.walk.next()?;
            self.current = Members::of(node);
        }
    }
}

impl Geometry {
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(self, 0)],
        }
    }

    pub fn shapes(&self) -> Shapes<'_> {
        Shapes {
            walk: self.walk(),
            current: Members::Single(None),
        }
    }

    /// Point-set flattening: every point the geometry transitively contains.
    ///
    /// # Example
    ///
    /// ```
    /// use geosql_core::wkt;
    ///
    /// let g = wkt::decode("GEOMETRYCOLLECTION(POINT(1 2),MULTIPOINT(3 4,5 6))").unwrap();
    /// let xs: Vec<f64> = g.points().map(|p| p.x()).collect();
    /// assert_eq!(xs, vec![1.0, 3.0, 5.0]);
    /// ```
    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.shapes().flat_map(Shape::points)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{line, poly, pt, square};
    use super::super::{GeometryCollection, MultiLineString, MultiPoint};
    use super::*;

    #[test]
    fn walk_is_preorder_with_levels() {
        let inner = GeometryCollection::new(0, vec![pt(2.0, 2.0).into()]).unwrap();
        let gc = Geometry::from(
            GeometryCollection::new(0, vec![pt(1.0, 1.0).into(), inner.into(), pt(3.0, 3.0).into()])
                .unwrap(),
        );
        let levels: Vec<usize> = gc.walk().map(|(_, level)| level).collect();
        assert_eq!(levels, vec![0, 1, 1, 2, 1]);
    }

    #[test]
    fn shapes_expand_multi_members() {
        let ml = MultiLineString::new(
            0,
            vec![line(&[(0.0, 0.0), (1.0, 1.0)]), line(&[(2.0, 2.0), (3.0, 3.0)])],
        );
        let gc = Geometry::from(
            GeometryCollection::new(
                0,
                vec![ml.into(), poly(vec![square(0.0, 0.0, 1.0)]).into()],
            )
            .unwrap(),
        );
        let shapes: Vec<Shape<'_>> = gc.shapes().collect();
        assert_eq!(shapes.len(), 3);
        assert!(matches!(shapes[0], Shape::LineString(_)));
        assert!(matches!(shapes[2], Shape::Polygon(_)));
    }

    #[test]
    fn points_cover_every_ring() {
        let p = Geometry::from(poly(vec![square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0)]));
        assert_eq!(p.points().count(), 10);
    }

    #[test]
    fn empty_values_have_no_points() {
        assert_eq!(Geometry::from(GeometryCollection::empty(0)).points().count(), 0);
        assert_eq!(Geometry::from(MultiPoint::new(0, vec![])).points().count(), 0);
    }

    #[test]
    fn deep_nesting_walks_without_recursion() {
        let mut g: Geometry = pt(7.0, 8.0).into();
        for _ in 0..super::super::MAX_NESTING_DEPTH {
            g = GeometryCollection::new(0, vec![g]).unwrap().into();
        }
        let p = g.points().next().unwrap();
        assert_eq!((p.x(), p.y()), (7.0, 8.0));
    }
}
