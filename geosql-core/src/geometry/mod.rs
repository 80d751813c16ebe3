//! Geometry value model.
//!
//! A closed set of variants, each stamped with an SRID at every nesting
//! level. Values are immutable: SRID changes and axis swaps build new values.

mod flatten;
mod process;
pub mod measure;
pub mod relate;

use std::fmt;

use crate::error::{Result, SpatialError};

pub use flatten::{Shape, ShapePoints, Shapes, Walk};
pub(crate) use process::GeometryBuilder;

/// Deepest GeometryCollection nesting a value may carry.
pub const MAX_NESTING_DEPTH: usize = 64;

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 7] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
        GeometryKind::MultiPoint,
        GeometryKind::MultiLineString,
        GeometryKind::MultiPolygon,
        GeometryKind::GeometryCollection,
    ];

    /// WKB type code (1..=7).
    pub fn wkb_code(self) -> u32 {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
            GeometryKind::MultiPoint => 4,
            GeometryKind::MultiLineString => 5,
            GeometryKind::MultiPolygon => 6,
            GeometryKind::GeometryCollection => 7,
        }
    }

    pub fn from_wkb_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wkb_code() == code)
    }

    pub fn wkt_keyword(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Case-insensitive keyword match.
    pub fn from_wkt_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.wkt_keyword().eq_ignore_ascii_case(keyword))
    }

    /// RFC 7946 `type` member.
    pub fn geojson_name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }

    pub fn from_geojson_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.geojson_name() == name)
    }

    /// Topological dimension; collections have none of their own.
    pub fn dimension(self) -> Option<u8> {
        match self {
            GeometryKind::Point | GeometryKind::MultiPoint => Some(0),
            GeometryKind::LineString | GeometryKind::MultiLineString => Some(1),
            GeometryKind::Polygon | GeometryKind::MultiPolygon => Some(2),
            GeometryKind::GeometryCollection => None,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.geojson_name())
    }
}

// ── Point ─────────────────────────────────────────────────────────────────────

/// A coordinate pair with its SRID.
///
/// Equality compares `x` and `y` with IEEE-754 `==`; the SRID is ignored.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    srid: u32,
    x: f64,
    y: f64,
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Point {
    /// A point on the Cartesian plane (SRID 0).
    pub fn new(x: f64, y: f64) -> Self {
        Self { srid: 0, x, y }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self { srid, ..self }
    }

    #[must_use]
    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    #[must_use]
    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    #[must_use]
    pub fn swap_xy(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
            ..self
        }
    }
}

// ── LineString / Polygon ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    srid: u32,
    points: Vec<Point>,
}

impl LineString {
    /// Build a line, stamping `srid` onto every point.
    pub fn new(srid: u32, points: Vec<Point>) -> Self {
        let points = points.into_iter().map(|p| p.with_srid(srid)).collect();
        Self { srid, points }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start_point(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn end_point(&self) -> Option<&Point> {
        self.points.last()
    }

    /// First point equals last point. An empty line is not closed.
    pub fn is_closed(&self) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Zero points, or at least four points with first == last.
    pub fn is_linear_ring(&self) -> bool {
        self.points.is_empty() || (self.points.len() >= 4 && self.is_closed())
    }

    /// Consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&Point, &Point)> + '_ {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self::new(srid, self.points)
    }

    #[must_use]
    pub fn swap_xy(&self) -> Self {
        Self {
            srid: self.srid,
            points: self.points.iter().map(|p| p.swap_xy()).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LineString {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Exterior ring followed by holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    srid: u32,
    rings: Vec<LineString>,
}

impl Polygon {
    /// Build a polygon. Fails unless there is at least one ring and every
    /// ring is a linear ring.
    ///
    /// # Example
    ///
    /// ```
    /// use geosql_core::geometry::{LineString, Point, Polygon};
    ///
    /// let square = LineString::new(0, vec![
    ///     Point::new(0.0, 0.0), Point::new(0.0, 1.0),
    ///     Point::new(1.0, 1.0), Point::new(1.0, 0.0), Point::new(0.0, 0.0),
    /// ]);
    /// assert!(Polygon::new(0, vec![square]).is_ok());
    ///
    /// let open = LineString::new(0, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    /// assert!(Polygon::new(0, vec![open]).is_err());
    /// ```
    pub fn new(srid: u32, rings: Vec<LineString>) -> Result<Self> {
        if rings.is_empty() || !rings.iter().all(LineString::is_linear_ring) {
            return Err(SpatialError::InvalidGisData {
                function: "polygon",
            });
        }
        Ok(Self::from_valid_rings(srid, rings))
    }

    fn from_valid_rings(srid: u32, rings: Vec<LineString>) -> Self {
        let rings = rings.into_iter().map(|r| r.with_srid(srid)).collect();
        Self { srid, rings }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn rings(&self) -> &[LineString] {
        &self.rings
    }

    pub fn exterior(&self) -> &LineString {
        // `new` guarantees at least one ring
        &self.rings[0]
    }

    pub fn interiors(&self) -> &[LineString] {
        &self.rings[1..]
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self::from_valid_rings(srid, self.rings)
    }

    #[must_use]
    pub fn swap_xy(&self) -> Self {
        Self {
            srid: self.srid,
            rings: self.rings.iter().map(LineString::swap_xy).collect(),
        }
    }
}

// ── Multi* ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint {
    srid: u32,
    points: Vec<Point>,
}

impl MultiPoint {
    pub fn new(srid: u32, points: Vec<Point>) -> Self {
        let points = points.into_iter().map(|p| p.with_srid(srid)).collect();
        Self { srid, points }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self::new(srid, self.points)
    }

    #[must_use]
    pub fn swap_xy(&self) -> Self {
        Self {
            srid: self.srid,
            points: self.points.iter().map(|p| p.swap_xy()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiLineString {
    srid: u32,
    lines: Vec<LineString>,
}

impl MultiLineString {
    pub fn new(srid: u32, lines: Vec<LineString>) -> Self {
        let lines = lines.into_iter().map(|l| l.with_srid(srid)).collect();
        Self { srid, lines }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn lines(&self) -> &[LineString] {
        &self.lines
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self::new(srid, self.lines)
    }

    #[must_use]
    pub fn swap_xy(&self) -> Self {
        Self {
            srid: self.srid,
            lines: self.lines.iter().map(LineString::swap_xy).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon {
    srid: u32,
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn new(srid: u32, polygons: Vec<Polygon>) -> Self {
        let polygons = polygons.into_iter().map(|p| p.with_srid(srid)).collect();
        Self { srid, polygons }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self::new(srid, self.polygons)
    }

    #[must_use]
    pub fn swap_xy(&self) -> Self {
        Self {
            srid: self.srid,
            polygons: self.polygons.iter().map(Polygon::swap_xy).collect(),
        }
    }
}

// ── GeometryCollection ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection {
    srid: u32,
    geometries: Vec<Geometry>,
}

impl GeometryCollection {
    /// Build a collection. Fails with `NestingTooDeep` when the result would
    /// nest more than [`MAX_NESTING_DEPTH`] collections.
    pub fn new(srid: u32, geometries: Vec<Geometry>) -> Result<Self> {
        let depth = 1 + geometries
            .iter()
            .map(Geometry::nesting_depth)
            .max()
            .unwrap_or(0);
        if depth > MAX_NESTING_DEPTH {
            return Err(SpatialError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        let geometries = geometries.into_iter().map(|g| g.with_srid(srid)).collect();
        Ok(Self { srid, geometries })
    }

    pub fn empty(srid: u32) -> Self {
        Self {
            srid,
            geometries: Vec::new(),
        }
    }

    pub fn srid(&self) -> u32 {
        self.srid
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        Self {
            srid,
            geometries: self
                .geometries
                .into_iter()
                .map(|g| g.with_srid(srid))
                .collect(),
        }
    }

    #[must_use]
    pub fn swap_xy(&self) -> Self {
        Self {
            srid: self.srid,
            geometries: self.geometries.iter().map(Geometry::swap_xy).collect(),
        }
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Any geometry value.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    pub fn srid(&self) -> u32 {
        match self {
            Geometry::Point(g) => g.srid(),
            Geometry::LineString(g) => g.srid(),
            Geometry::Polygon(g) => g.srid(),
            Geometry::MultiPoint(g) => g.srid(),
            Geometry::MultiLineString(g) => g.srid(),
            Geometry::MultiPolygon(g) => g.srid(),
            Geometry::GeometryCollection(g) => g.srid(),
        }
    }

    /// Replace the SRID at every nesting level.
    ///
    /// # Example
    ///
    /// ```
    /// use geosql_core::geometry::{Geometry, LineString, Point};
    ///
    /// let line = Geometry::from(LineString::new(0, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]));
    /// let line = line.with_srid(4326);
    /// assert!(line.points().all(|p| p.srid() == 4326));
    /// ```
    #[must_use]
    pub fn with_srid(self, srid: u32) -> Self {
        match self {
            Geometry::Point(g) => Geometry::Point(g.with_srid(srid)),
            Geometry::LineString(g) => Geometry::LineString(g.with_srid(srid)),
            Geometry::Polygon(g) => Geometry::Polygon(g.with_srid(srid)),
            Geometry::MultiPoint(g) => Geometry::MultiPoint(g.with_srid(srid)),
            Geometry::MultiLineString(g) => Geometry::MultiLineString(g.with_srid(srid)),
            Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.with_srid(srid)),
            Geometry::GeometryCollection(g) => Geometry::GeometryCollection(g.with_srid(srid)),
        }
    }

    /// Swap X and Y of every point.
    #[must_use]
    pub fn swap_xy(&self) -> Self {
        match self {
            Geometry::Point(g) => Geometry::Point(g.swap_xy()),
            Geometry::LineString(g) => Geometry::LineString(g.swap_xy()),
            Geometry::Polygon(g) => Geometry::Polygon(g.swap_xy()),
            Geometry::MultiPoint(g) => Geometry::MultiPoint(g.swap_xy()),
            Geometry::MultiLineString(g) => Geometry::MultiLineString(g.swap_xy()),
            Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.swap_xy()),
            Geometry::GeometryCollection(g) => Geometry::GeometryCollection(g.swap_xy()),
        }
    }

    pub fn as_collection(&self) -> Option<&GeometryCollection> {
        match self {
            Geometry::GeometryCollection(gc) => Some(gc),
            _ => None,
        }
    }

    /// Number of non-collection values reachable from here. A Multi* counts once.
    pub fn concrete_count(&self) -> usize {
        self.walk()
            .filter(|(g, _)| g.kind() != GeometryKind::GeometryCollection)
            .count()
    }

    /// Number of collection levels; zero for anything but a collection.
    pub fn nesting_depth(&self) -> usize {
        self.walk()
            .filter(|(g, _)| g.kind() == GeometryKind::GeometryCollection)
            .map(|(_, level)| level + 1)
            .max()
            .unwrap_or(0)
    }

    /// Largest member dimension, or `None` if any collection at any depth
    /// (including this one) is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use geosql_core::geometry::{Geometry, GeometryCollection, Point};
    ///
    /// let gc = GeometryCollection::new(0, vec![
    ///     Point::new(1.0, 2.0).into(),
    ///     GeometryCollection::empty(0).into(),
    /// ]).unwrap();
    /// assert_eq!(Geometry::from(gc).dimension(), None);
    /// assert_eq!(Geometry::from(Point::new(1.0, 2.0)).dimension(), Some(0));
    /// ```
    pub fn dimension(&self) -> Option<u8> {
        let mut max = None;
        for (g, _) in self.walk() {
            match g {
                Geometry::GeometryCollection(gc) if gc.is_empty() => return None,
                Geometry::GeometryCollection(_) => {}
                other => max = max.max(other.kind().dimension()),
            }
        }
        max
    }
}

impl From<Point> for Geometry {
    fn from(g: Point) -> Self {
        Geometry::Point(g)
    }
}

impl From<LineString> for Geometry {
    fn from(g: LineString) -> Self {
        Geometry::LineString(g)
    }
}

impl From<Polygon> for Geometry {
    fn from(g: Polygon) -> Self {
        Geometry::Polygon(g)
    }
}

impl From<MultiPoint> for Geometry {
    fn from(g: MultiPoint) -> Self {
        Geometry::MultiPoint(g)
    }
}

impl From<MultiLineString> for Geometry {
    fn from(g: MultiLineString) -> Self {
        Geometry::MultiLineString(g)
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(g: MultiPolygon) -> Self {
        Geometry::MultiPolygon(g)
    }
}

impl From<GeometryCollection> for Geometry {
    fn from(g: GeometryCollection) -> Self {
        Geometry::GeometryCollection(g)
    }
}
