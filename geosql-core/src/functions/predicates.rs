//! Spatial predicate functions.
//!
//! ST_Equals, ST_Intersects, ST_Disjoint, ST_Within, ST_Contains
//!
//! Every predicate first requires matching SRIDs, then yields `None` when
//! either operand is a collection without any concrete member.

use crate::error::{Result, SpatialError};
use crate::geometry::{relate, Geometry};

fn has_no_members(g: &Geometry) -> bool {
    g.as_collection().is_some() && g.concrete_count() == 0
}

/// Shared pre-check; `Ok(false)` means the result is null.
fn comparable(function: &'static str, a: &Geometry, b: &Geometry) -> Result<bool> {
    if a.srid() != b.srid() {
        return Err(SpatialError::DiffSrids {
            function,
            left: a.srid(),
            right: b.srid(),
        });
    }
    Ok(!has_no_members(a) && !has_no_members(b))
}

/// ST_Equals — same point set.
///
/// # Example
///
/// ```
/// use geosql_core::functions::predicates::st_equals;
/// use geosql_core::functions::constructors::point;
///
/// assert_eq!(st_equals(&point(1.0, 2.0), &point(1.0, 2.0)).unwrap(), Some(true));
/// assert_eq!(st_equals(&point(1.0, 2.0), &point(2.0, 1.0)).unwrap(), Some(false));
/// ```
pub fn st_equals(a: &Geometry, b: &Geometry) -> Result<Option<bool>> {
    Ok(comparable("st_equals", a, b)?.then(|| relate::equals(a, b)))
}

/// ST_Intersects — the geometries share at least one point.
///
/// # Example
///
/// ```
/// use geosql_core::functions::predicates::st_intersects;
/// use geosql_core::wkt;
///
/// let square = wkt::decode("POLYGON((0 0,0 2,2 2,2 0,0 0))").unwrap();
/// let inside = wkt::decode("POINT(1 1)").unwrap();
/// assert_eq!(st_intersects(&square, &inside).unwrap(), Some(true));
///
/// let empty = wkt::decode("GEOMETRYCOLLECTION()").unwrap();
/// assert_eq!(st_intersects(&inside, &empty).unwrap(), None);
/// ```
pub fn st_intersects(a: &Geometry, b: &Geometry) -> Result<Option<bool>> {
    Ok(comparable("st_intersects", a, b)?.then(|| relate::intersects(a, b)))
}

/// ST_Disjoint — negation of ST_Intersects.
pub fn st_disjoint(a: &Geometry, b: &Geometry) -> Result<Option<bool>> {
    Ok(comparable("st_disjoint", a, b)?.then(|| !relate::intersects(a, b)))
}

/// ST_Within — `a` lies inside `b` or on its boundary, excluding the
/// endpoints of open lines.
///
/// # Example
///
/// ```
/// use geosql_core::functions::predicates::st_within;
/// use geosql_core::wkt;
///
/// let line = wkt::decode("LINESTRING(0 0,2 2)").unwrap();
/// let mid = wkt::decode("POINT(1 1)").unwrap();
/// let end = wkt::decode("POINT(2 2)").unwrap();
/// assert_eq!(st_within(&mid, &line).unwrap(), Some(true));
/// assert_eq!(st_within(&end, &line).unwrap(), Some(false));
/// ```
pub fn st_within(a: &Geometry, b: &Geometry) -> Result<Option<bool>> {
    if !comparable("st_within", a, b)? {
        return Ok(None);
    }
    relate::within(a, b).map(Some)
}

/// ST_Contains — ST_Within with the operands reversed.
pub fn st_contains(a: &Geometry, b: &Geometry) -> Result<Option<bool>> {
    if !comparable("st_contains", a, b)? {
        return Ok(None);
    }
    match relate::within(b, a) {
        Ok(inside) => Ok(Some(inside)),
        Err(SpatialError::UnsupportedGeometryType { left, right, .. }) => {
            Err(SpatialError::UnsupportedGeometryType {
                function: "st_contains",
                left: right,
                right: left,
            })
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::accessors::st_set_srid;
    use crate::wkt;

    fn text(s: &str) -> Geometry {
        wkt::decode(s).unwrap()
    }

    // ── Pre-check ──────────────────────────────────────────────────

    #[test]
    fn srid_mismatch_is_an_error() {
        let a = text("POINT(1 2)");
        let b = st_set_srid(&a, 4326).unwrap();
        for f in [st_equals, st_intersects, st_disjoint, st_within, st_contains] {
            assert!(matches!(f(&a, &b), Err(SpatialError::DiffSrids { .. })));
        }
        assert_eq!(
            st_equals(&a, &b).unwrap_err().to_string(),
            "Binary geometry function st_equals given two geometries of different srids: \
             0 and 4326, which should have been identical."
        );
    }

    #[test]
    fn memberless_collections_are_null() {
        let p = text("POINT(1 2)");
        let empty = text("GEOMETRYCOLLECTION()");
        let nested = text("GEOMETRYCOLLECTION(GEOMETRYCOLLECTION())");
        for f in [st_equals, st_intersects, st_disjoint, st_within, st_contains] {
            assert_eq!(f(&p, &empty).unwrap(), None);
            assert_eq!(f(&nested, &p).unwrap(), None);
        }
    }

    // ── Results ────────────────────────────────────────────────────

    #[test]
    fn equals_is_reflexive() {
        let p = text("POINT(-0 3.5)");
        assert_eq!(st_equals(&p, &p).unwrap(), Some(true));
        let l = text("LINESTRING(0 0,1 1,0 0)");
        assert_eq!(st_equals(&l, &text("MULTIPOINT(1 1,0 0)")).unwrap(), Some(true));
    }

    #[test]
    fn disjoint_negates_intersects() {
        let square = text("POLYGON((0 0,0 4,4 4,4 0,0 0))");
        let near = text("LINESTRING(1 1,9 9)");
        let far = text("LINESTRING(5 5,9 9)");
        assert_eq!(st_intersects(&square, &near).unwrap(), Some(true));
        assert_eq!(st_disjoint(&square, &near).unwrap(), Some(false));
        assert_eq!(st_disjoint(&square, &far).unwrap(), Some(true));
    }

    #[test]
    fn contains_reverses_within() {
        let square = text("POLYGON((0 0,0 4,4 4,4 0,0 0))");
        let p = text("POINT(2 2)");
        assert_eq!(st_contains(&square, &p).unwrap(), Some(true));
        assert_eq!(st_within(&p, &square).unwrap(), Some(true));

        let err = st_contains(&p, &square).unwrap_err();
        assert_eq!(
            err.to_string(),
            "st_contains(Point, Polygon) has not been implemented."
        );
    }

    #[test]
    fn within_hole_is_outside() {
        let donut = text("POLYGON((0 0,0 10,10 10,10 0,0 0),(4 4,4 6,6 6,6 4,4 4))");
        assert_eq!(st_within(&text("POINT(5 5)"), &donut).unwrap(), Some(false));
        assert_eq!(st_within(&text("POINT(2 2)"), &donut).unwrap(), Some(true));
        assert_eq!(st_within(&text("POINT(0 5)"), &donut).unwrap(), Some(false));
    }
}
