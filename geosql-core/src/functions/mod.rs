//! SQL-facing spatial functions.
//!
//! Each submodule exposes typed Rust functions; [`call`] adapts them to
//! already-evaluated SQL arguments with MySQL null semantics: a `NULL`
//! argument yields `NULL`, a non-geometry where a geometry is expected is
//! `InvalidGisData`.

pub mod accessors;
pub mod constructors;
pub mod io;
pub mod measurement;
pub mod predicates;

use crate::error::Result;
use crate::function_catalog;
use crate::geometry::{Geometry, GeometryKind};
use crate::value::Value;

/// Borrow every argument as a geometry; `None` if any of them is null.
fn geometries<'a>(function: &'static str, args: &'a [Value]) -> Result<Option<Vec<&'a Geometry>>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg.as_geometry(function)? {
            Some(g) => out.push(g),
            None => return Ok(None),
        }
    }
    Ok(Some(out))
}

static NULL: Value = Value::Null;

/// An optional trailing argument; absent reads as `NULL`.
fn optional(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

macro_rules! some_or_null {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => return Ok(Value::Null),
        }
    };
}

fn from_text(args: &[Value], function: &'static str, kind: Option<GeometryKind>) -> Result<Value> {
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let text = some_or_null!(args[0].as_str(function)?);
    let srid = optional(args, 1).as_i64(function)?;
    let axis = optional(args, 2).as_str(function)?;
    Ok(match kind {
        Some(kind) => io::geom_from_text_as(function, kind, text, srid, axis)?,
        None => io::geom_from_text(text, srid, axis)?,
    }
    .into())
}

fn from_wkb(args: &[Value], function: &'static str, kind: Option<GeometryKind>) -> Result<Value> {
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let blob = some_or_null!(args[0].as_bytes(function)?);
    let srid = optional(args, 1).as_i64(function)?;
    let axis = optional(args, 2).as_str(function)?;
    Ok(match kind {
        Some(kind) => io::geom_from_wkb_as(function, kind, blob, srid, axis)?,
        None => io::geom_from_wkb(blob, srid, axis)?,
    }
    .into())
}

fn from_geojson(args: &[Value]) -> Result<Value> {
    const FUNCTION: &str = "st_geomfromgeojson";
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let doc = match &args[0] {
        Value::Json(json) => json.to_string(),
        other => some_or_null!(other.as_str(FUNCTION)?).to_owned(),
    };
    let options = optional(args, 1).as_i64(FUNCTION)?;
    let srid = optional(args, 2).as_i64(FUNCTION)?;
    Ok(io::geom_from_geojson(&doc, options, srid)?.into())
}

/// Single-geometry getter with optional setter form, e.g. `ST_X(p[, x])`.
fn coordinate(
    args: &[Value],
    function: &'static str,
    get: fn(&Geometry) -> Result<f64>,
    set: fn(&Geometry, f64) -> Result<Geometry>,
) -> Result<Value> {
    let g = some_or_null!(args[0].as_geometry(function)?);
    match args.get(1) {
        None => Ok(get(g)?.into()),
        Some(value) => {
            let v = some_or_null!(value.as_f64(function)?);
            Ok(set(g, v)?.into())
        }
    }
}

fn binary(
    args: &[Value],
    function: &'static str,
    predicate: fn(&Geometry, &Geometry) -> Result<Option<bool>>,
) -> Result<Value> {
    let gs = some_or_null!(geometries(function, args)?);
    Ok(predicate(gs[0], gs[1])?.into())
}

fn unary<T: Into<Value>>(
    args: &[Value],
    function: &'static str,
    f: fn(&Geometry) -> T,
) -> Result<Value> {
    let g = some_or_null!(args[0].as_geometry(function)?);
    Ok(f(g).into())
}

fn construct(
    args: &[Value],
    function: &'static str,
    build: fn(&[&Geometry]) -> Result<Geometry>,
) -> Result<Value> {
    let gs = some_or_null!(geometries(function, args)?);
    Ok(build(&gs)?.into())
}

/// Evaluate the spatial SQL function `name` over `args`.
///
/// Names are matched case-insensitively against the function catalog and
/// the argument count is checked before any argument is read.
///
/// # Example
///
/// ```
/// use geosql_core::functions::call;
/// use geosql_core::value::Value;
///
/// let p = call("ST_GeomFromText", &[Value::from("POINT(1 2)"), Value::Int(4326)]).unwrap();
/// assert_eq!(call("st_srid", &[p.clone()]).unwrap(), Value::Int(4326));
/// assert_eq!(call("ST_AsText", &[p]).unwrap(), Value::from("POINT(1 2)"));
/// assert_eq!(call("ST_X", &[Value::Null]).unwrap(), Value::Null);
/// ```
pub fn call(name: &str, args: &[Value]) -> Result<Value> {
    use GeometryKind as K;

    let spec = function_catalog::check_arity(name, args.len())?;
    tracing::trace!(function = spec.name, n_args = args.len(), "evaluating spatial function");

    match spec.name {
        // I/O: text
        "ST_GeomFromText" | "ST_GeometryFromText" => from_text(args, "st_geomfromtext", None),
        "ST_PointFromText" => from_text(args, "st_pointfromtext", Some(K::Point)),
        "ST_LineFromText" | "ST_LineStringFromText" => {
            from_text(args, "st_linefromtext", Some(K::LineString))
        }
        "ST_PolyFromText" | "ST_PolygonFromText" => {
            from_text(args, "st_polyfromtext", Some(K::Polygon))
        }
        "ST_MPointFromText" | "ST_MultiPointFromText" => {
            from_text(args, "st_mpointfromtext", Some(K::MultiPoint))
        }
        "ST_MLineFromText" | "ST_MultiLineStringFromText" => {
            from_text(args, "st_mlinefromtext", Some(K::MultiLineString))
        }
        "ST_MPolyFromText" | "ST_MultiPolygonFromText" => {
            from_text(args, "st_mpolyfromtext", Some(K::MultiPolygon))
        }
        "ST_GeomCollFromText" | "ST_GeometryCollectionFromText" | "ST_GeomCollFromTxt" => {
            from_text(args, "st_geomcollfromtext", Some(K::GeometryCollection))
        }

        // I/O: binary
        "ST_GeomFromWKB" | "ST_GeometryFromWKB" => from_wkb(args, "st_geomfromwkb", None),
        "ST_PointFromWKB" => from_wkb(args, "st_pointfromwkb", Some(K::Point)),
        "ST_LineFromWKB" | "ST_LineStringFromWKB" => {
            from_wkb(args, "st_linefromwkb", Some(K::LineString))
        }
        "ST_PolyFromWKB" | "ST_PolygonFromWKB" => {
            from_wkb(args, "st_polyfromwkb", Some(K::Polygon))
        }
        "ST_MPointFromWKB" | "ST_MultiPointFromWKB" => {
            from_wkb(args, "st_mpointfromwkb", Some(K::MultiPoint))
        }
        "ST_MLineFromWKB" | "ST_MultiLineStringFromWKB" => {
            from_wkb(args, "st_mlinefromwkb", Some(K::MultiLineString))
        }
        "ST_MPolyFromWKB" | "ST_MultiPolygonFromWKB" => {
            from_wkb(args, "st_mpolyfromwkb", Some(K::MultiPolygon))
        }
        "ST_GeomCollFromWKB" | "ST_GeometryCollectionFromWKB" => {
            from_wkb(args, "st_geomcollfromwkb", Some(K::GeometryCollection))
        }

        "ST_GeomFromGeoJSON" => from_geojson(args),

        // I/O: output
        "ST_AsWKT" | "ST_AsText" => {
            const FUNCTION: &str = "st_astext";
            let g = some_or_null!(args[0].as_geometry(FUNCTION)?);
            let axis = optional(args, 1).as_str(FUNCTION)?;
            Ok(io::as_wkt(g, axis)?.into())
        }
        "ST_AsWKB" | "ST_AsBinary" => {
            const FUNCTION: &str = "st_asbinary";
            let g = some_or_null!(args[0].as_geometry(FUNCTION)?);
            let axis = optional(args, 1).as_str(FUNCTION)?;
            Ok(io::as_wkb(g, axis)?.into())
        }
        "ST_AsGeoJSON" => {
            const FUNCTION: &str = "st_asgeojson";
            if args.iter().any(Value::is_null) {
                return Ok(Value::Null);
            }
            let g = some_or_null!(args[0].as_geometry(FUNCTION)?);
            let precision = optional(args, 1).as_i64(FUNCTION)?;
            let flags = optional(args, 2).as_i64(FUNCTION)?;
            Ok(Value::Json(io::as_geojson(g, precision, flags)?))
        }

        // Constructors
        "Point" => {
            let x = some_or_null!(args[0].as_f64("point")?);
            let y = some_or_null!(args[1].as_f64("point")?);
            Ok(constructors::point(x, y).into())
        }
        "LineString" => construct(args, "linestring", constructors::line_string),
        "Polygon" => construct(args, "polygon", constructors::polygon),
        "MultiPoint" => construct(args, "multipoint", constructors::multi_point),
        "MultiLineString" => construct(args, "multilinestring", constructors::multi_line_string),
        "MultiPolygon" => construct(args, "multipolygon", constructors::multi_polygon),
        "GeometryCollection" | "GeomCollection" => {
            construct(args, "geometrycollection", constructors::geometry_collection)
        }

        // Accessors
        "ST_X" => coordinate(args, "st_x", accessors::st_x, accessors::st_set_x),
        "ST_Y" => coordinate(args, "st_y", accessors::st_y, accessors::st_set_y),
        "ST_Longitude" => coordinate(
            args,
            "st_longitude",
            accessors::st_longitude,
            accessors::st_set_longitude,
        ),
        "ST_Latitude" => coordinate(
            args,
            "st_latitude",
            accessors::st_latitude,
            accessors::st_set_latitude,
        ),
        "ST_SRID" => {
            const FUNCTION: &str = "st_srid";
            let g = some_or_null!(args[0].as_geometry(FUNCTION)?);
            match args.get(1) {
                None => Ok(Value::Int(i64::from(accessors::st_srid(g)))),
                Some(srid) => {
                    let srid = some_or_null!(srid.as_i64(FUNCTION)?);
                    Ok(accessors::st_set_srid(g, srid)?.into())
                }
            }
        }
        "ST_SwapXY" => unary(args, "st_swapxy", accessors::st_swap_xy),
        "ST_StartPoint" => unary(args, "st_startpoint", accessors::st_start_point),
        "ST_EndPoint" => unary(args, "st_endpoint", accessors::st_end_point),
        "ST_IsClosed" => unary(args, "st_isclosed", accessors::st_is_closed),
        "ST_Dimension" => unary(args, "st_dimension", |g| {
            accessors::st_dimension(g).map(i64::from)
        }),

        // Measurement
        "ST_Area" => unary(args, "st_area", measurement::st_area),
        "ST_Perimeter" => unary(args, "st_perimeter", measurement::st_perimeter),
        "ST_Length" => {
            const FUNCTION: &str = "st_length";
            if args.iter().any(Value::is_null) {
                return Ok(Value::Null);
            }
            let g = some_or_null!(args[0].as_geometry(FUNCTION)?);
            let unit = optional(args, 1).as_str(FUNCTION)?;
            Ok(measurement::st_length(g, unit)?.into())
        }
        "ST_Distance" => {
            const FUNCTION: &str = "st_distance";
            let gs = some_or_null!(geometries(FUNCTION, &args[..2])?);
            let unit = some_or_null!(match args.get(2) {
                None => Some(None),
                Some(unit) => unit.as_str(FUNCTION)?.map(Some),
            });
            Ok(measurement::st_distance(gs[0], gs[1], unit)?.into())
        }

        // Predicates
        "ST_Equals" => binary(args, "st_equals", predicates::st_equals),
        "ST_Intersects" => binary(args, "st_intersects", predicates::st_intersects),
        "ST_Within" => binary(args, "st_within", predicates::st_within),
        "ST_Contains" => binary(args, "st_contains", predicates::st_contains),
        "ST_Disjoint" => binary(args, "st_disjoint", predicates::st_disjoint),

        other => Err(crate::error::SpatialError::invalid_argument(
            "function lookup",
            format!("spatial function '{other}' has no implementation"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpatialError;
    use crate::function_catalog::SPATIAL_FUNCTIONS;

    #[test]
    fn every_catalog_entry_dispatches() {
        for spec in SPATIAL_FUNCTIONS {
            let args = vec![Value::Null; spec.min_args];
            match call(spec.name, &args) {
                Err(SpatialError::InvalidArgument { detail, .. }) => {
                    assert!(!detail.contains("no implementation"), "{}", spec.name)
                }
                _ => {}
            }
        }
    }

    #[test]
    fn null_arguments_propagate() {
        let p = call("Point", &[Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(call("ST_Equals", &[p.clone(), Value::Null]).unwrap(), Value::Null);
        assert_eq!(call("ST_X", &[p.clone(), Value::Null]).unwrap(), Value::Null);
        assert_eq!(call("ST_SRID", &[p, Value::Null]).unwrap(), Value::Null);
        assert_eq!(call("Point", &[Value::Null, Value::Int(2)]).unwrap(), Value::Null);
    }

    #[test]
    fn wrong_argument_kinds() {
        assert!(matches!(
            call("ST_X", &[Value::from("notapoint")]),
            Err(SpatialError::InvalidGisData { function: "st_x" })
        ));
        assert!(matches!(
            call("ST_SRID", &[]),
            Err(SpatialError::InvalidArgumentCount { given: 0, .. })
        ));
        assert!(matches!(
            call("ST_Buffer", &[Value::Null]),
            Err(SpatialError::InvalidArgument { .. })
        ));
    }
}
