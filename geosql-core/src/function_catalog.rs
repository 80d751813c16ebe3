//! Canonical spatial function catalog: names, aliases and arity.

use crate::error::{Result, SpatialError};

/// Upper bound for functions taking any number of arguments.
pub const VARIADIC: usize = usize::MAX;

/// Spatial function declaration metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
}

impl FunctionSpec {
    const fn new(name: &'static str, min_args: usize, max_args: usize) -> Self {
        Self {
            name,
            min_args,
            max_args,
        }
    }

    pub fn accepts(&self, n_args: usize) -> bool {
        (self.min_args..=self.max_args).contains(&n_args)
    }
}

pub const SPATIAL_FUNCTIONS: &[FunctionSpec] = &[
    // I/O: text
    FunctionSpec::new("ST_GeomFromText", 1, 3),
    FunctionSpec::new("ST_GeometryFromText", 1, 3),
    FunctionSpec::new("ST_PointFromText", 1, 3),
    FunctionSpec::new("ST_LineFromText", 1, 3),
    FunctionSpec::new("ST_LineStringFromText", 1, 3),
    FunctionSpec::new("ST_PolyFromText", 1, 3),
    FunctionSpec::new("ST_PolygonFromText", 1, 3),
    FunctionSpec::new("ST_MPointFromText", 1, 3),
    FunctionSpec::new("ST_MultiPointFromText", 1, 3),
    FunctionSpec::new("ST_MLineFromText", 1, 3),
    FunctionSpec::new("ST_MultiLineStringFromText", 1, 3),
    FunctionSpec::new("ST_MPolyFromText", 1, 3),
    FunctionSpec::new("ST_MultiPolygonFromText", 1, 3),
    FunctionSpec::new("ST_GeomCollFromText", 1, 3),
    FunctionSpec::new("ST_GeometryCollectionFromText", 1, 3),
    FunctionSpec::new("ST_GeomCollFromTxt", 1, 3),
    // I/O: binary
    FunctionSpec::new("ST_GeomFromWKB", 1, 3),
    FunctionSpec::new("ST_GeometryFromWKB", 1, 3),
    FunctionSpec::new("ST_PointFromWKB", 1, 3),
    FunctionSpec::new("ST_LineFromWKB", 1, 3),
    FunctionSpec::new("ST_LineStringFromWKB", 1, 3),
    FunctionSpec::new("ST_PolyFromWKB", 1, 3),
    FunctionSpec::new("ST_PolygonFromWKB", 1, 3),
    FunctionSpec::new("ST_MPointFromWKB", 1, 3),
    FunctionSpec::new("ST_MultiPointFromWKB", 1, 3),
    FunctionSpec::new("ST_MLineFromWKB", 1, 3),
    FunctionSpec::new("ST_MultiLineStringFromWKB", 1, 3),
    FunctionSpec::new("ST_MPolyFromWKB", 1, 3),
    FunctionSpec::new("ST_MultiPolygonFromWKB", 1, 3),
    FunctionSpec::new("ST_GeomCollFromWKB", 1, 3),
    FunctionSpec::new("ST_GeometryCollectionFromWKB", 1, 3),
    // I/O: GeoJSON
    FunctionSpec::new("ST_GeomFromGeoJSON", 1, 3),
    // I/O: output
    FunctionSpec::new("ST_AsWKT", 1, 2),
    FunctionSpec::new("ST_AsText", 1, 2),
    FunctionSpec::new("ST_AsWKB", 1, 2),
    FunctionSpec::new("ST_AsBinary", 1, 2),
    FunctionSpec::new("ST_AsGeoJSON", 1, 3),
    // Constructors
    FunctionSpec::new("Point", 2, 2),
    FunctionSpec::new("LineString", 2, VARIADIC),
    FunctionSpec::new("Polygon", 1, VARIADIC),
    FunctionSpec::new("MultiPoint", 1, VARIADIC),
    FunctionSpec::new("MultiLineString", 1, VARIADIC),
    FunctionSpec::new("MultiPolygon", 1, VARIADIC),
    FunctionSpec::new("GeometryCollection", 0, VARIADIC),
    FunctionSpec::new("GeomCollection", 0, VARIADIC),
    // Accessors
    FunctionSpec::new("ST_X", 1, 2),
    FunctionSpec::new("ST_Y", 1, 2),
    FunctionSpec::new("ST_Longitude", 1, 2),
    FunctionSpec::new("ST_Latitude", 1, 2),
    FunctionSpec::new("ST_SRID", 1, 2),
    FunctionSpec::new("ST_SwapXY", 1, 1),
    FunctionSpec::new("ST_StartPoint", 1, 1),
    FunctionSpec::new("ST_EndPoint", 1, 1),
    FunctionSpec::new("ST_IsClosed", 1, 1),
    FunctionSpec::new("ST_Dimension", 1, 1),
    // Measurement
    FunctionSpec::new("ST_Area", 1, 1),
    FunctionSpec::new("ST_Perimeter", 1, 1),
    FunctionSpec::new("ST_Length", 1, 2),
    FunctionSpec::new("ST_Distance", 2, 3),
    // Predicates
    FunctionSpec::new("ST_Equals", 2, 2),
    FunctionSpec::new("ST_Intersects", 2, 2),
    FunctionSpec::new("ST_Within", 2, 2),
    FunctionSpec::new("ST_Contains", 2, 2),
    FunctionSpec::new("ST_Disjoint", 2, 2),
];

/// Case-insensitive lookup by SQL name.
///
/// # Example
///
/// ```
/// use geosql_core::function_catalog::lookup;
///
/// let spec = lookup("st_astext").unwrap();
/// assert_eq!(spec.name, "ST_AsText");
/// assert!(lookup("ST_Buffer").is_none());
/// ```
pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    SPATIAL_FUNCTIONS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// Resolve `name` and validate the argument count against its declaration.
pub fn check_arity(name: &str, n_args: usize) -> Result<&'static FunctionSpec> {
    let spec = lookup(name).ok_or_else(|| {
        SpatialError::invalid_argument("function lookup", format!("unknown spatial function '{name}'"))
    })?;
    if !spec.accepts(n_args) {
        return Err(SpatialError::InvalidArgumentCount {
            function: spec.name,
            given: n_args,
        });
    }
    Ok(spec)
}
