//! I/O and serialization functions.
//!
//! ST_GeomFromText and its typed variants, ST_GeomFromWKB and its typed
//! variants, ST_GeomFromGeoJSON, ST_AsWKT / ST_AsText, ST_AsWKB /
//! ST_AsBinary, ST_AsGeoJSON

use crate::config::{
    AxisOrder, DecodeOptions, DimensionPolicy, GeoJsonDecodeOptions, GeoJsonEncodeOptions,
    GeoJsonFlags,
};
use crate::error::{Result, SpatialError};
use crate::geometry::{Geometry, GeometryKind};
use crate::{geojson, srs, wkb, wkt};

// ── Option parsing ────────────────────────────────────────────────────────────

fn decode_options(srid: Option<i64>, axis_order: Option<&str>) -> Result<DecodeOptions> {
    let mut opts = DecodeOptions::new();
    if let Some(srid) = srid {
        opts = opts.with_srid(srs::validate_srid(srid)?);
    }
    if let Some(option) = axis_order {
        opts = opts.with_axis_order(option.parse()?);
    }
    Ok(opts)
}

fn expect_kind(function: &'static str, expected: GeometryKind, g: Geometry) -> Result<Geometry> {
    if g.kind() != expected {
        return Err(SpatialError::InvalidGisData { function });
    }
    Ok(g)
}

/// Swap for output when the caller asked for long-lat on a geographic value.
fn oriented(g: &Geometry, axis_order: Option<&str>) -> Result<Option<Geometry>> {
    let order = match axis_order {
        Some(option) => option.parse::<AxisOrder>()?,
        None => AxisOrder::SridDefined,
    };
    Ok(order.swaps(g.srid()).then(|| g.swap_xy()))
}

// ── Deserialization ───────────────────────────────────────────────────────────

/// ST_GeomFromText — parse WKT with an optional SRID and axis-order option.
///
/// # Example
///
/// ```
/// use geosql_core::functions::io::geom_from_text;
///
/// let g = geom_from_text("POINT(1 2)", Some(4326), Some("axis-order=long-lat")).unwrap();
/// assert_eq!(g.srid(), 4326);
/// assert_eq!(g.to_string(), "POINT(2 1)");
/// assert!(geom_from_text("POINT(1 2)", Some(1234), None).is_err());
/// ```
pub fn geom_from_text(text: &str, srid: Option<i64>, axis_order: Option<&str>) -> Result<Geometry> {
    wkt::decode_with(text, &decode_options(srid, axis_order)?)
}

/// Typed WKT constructors such as ST_PointFromText: decode, then require
/// the `expected` variant.
pub fn geom_from_text_as(
    function: &'static str,
    expected: GeometryKind,
    text: &str,
    srid: Option<i64>,
    axis_order: Option<&str>,
) -> Result<Geometry> {
    expect_kind(function, expected, geom_from_text(text, srid, axis_order)?)
}

/// ST_GeomFromWKB — decode WKB with an optional SRID and axis-order option.
pub fn geom_from_wkb(blob: &[u8], srid: Option<i64>, axis_order: Option<&str>) -> Result<Geometry> {
    wkb::decode_with(blob, &decode_options(srid, axis_order)?)
}

/// Typed WKB constructors such as ST_PolyFromWKB.
///
/// # Example
///
/// ```
/// use geosql_core::functions::io::{as_wkb, geom_from_text, geom_from_wkb_as};
/// use geosql_core::geometry::GeometryKind;
///
/// let blob = as_wkb(&geom_from_text("POINT(1 2)", None, None).unwrap(), None).unwrap();
/// assert!(geom_from_wkb_as("st_pointfromwkb", GeometryKind::Point, &blob, None, None).is_ok());
/// assert!(geom_from_wkb_as("st_polyfromwkb", GeometryKind::Polygon, &blob, None, None).is_err());
/// ```
pub fn geom_from_wkb_as(
    function: &'static str,
    expected: GeometryKind,
    blob: &[u8],
    srid: Option<i64>,
    axis_order: Option<&str>,
) -> Result<Geometry> {
    expect_kind(function, expected, geom_from_wkb(blob, srid, axis_order)?)
}

/// ST_GeomFromGeoJSON — `options` selects the dimension policy (1 to 4),
/// `srid` overrides the default 4326.
///
/// # Example
///
/// ```
/// use geosql_core::functions::io::geom_from_geojson;
///
/// let doc = r#"{"type":"Point","coordinates":[1,2,3]}"#;
/// assert!(geom_from_geojson(doc, None, None).is_err());
/// let g = geom_from_geojson(doc, Some(2), Some(0)).unwrap();
/// assert_eq!(g.to_string(), "POINT(1 2)");
/// assert_eq!(g.srid(), 0);
/// ```
pub fn geom_from_geojson(doc: &str, options: Option<i64>, srid: Option<i64>) -> Result<Geometry> {
    let mut opts = GeoJsonDecodeOptions::new();
    if let Some(option) = options {
        opts = opts.with_dimensions(DimensionPolicy::from_option(option)?);
    }
    if let Some(srid) = srid {
        opts = opts.with_decode(DecodeOptions::new().with_srid(srs::validate_srid(srid)?));
    }
    geojson::decode(doc, &opts)
}

// ── Serialization ─────────────────────────────────────────────────────────────

/// ST_AsWKT / ST_AsText — canonical WKT.
///
/// # Example
///
/// ```
/// use geosql_core::functions::io::{as_wkt, geom_from_text};
///
/// let g = geom_from_text("linestring( 1 2 , 3 4 )", None, None).unwrap();
/// assert_eq!(as_wkt(&g, None).unwrap(), "LINESTRING(1 2,3 4)");
/// ```
pub fn as_wkt(g: &Geometry, axis_order: Option<&str>) -> Result<String> {
    Ok(match oriented(g, axis_order)? {
        Some(swapped) => wkt::encode(&swapped),
        None => wkt::encode(g),
    })
}

/// ST_AsWKB / ST_AsBinary — little-endian WKB without the SRID prefix.
pub fn as_wkb(g: &Geometry, axis_order: Option<&str>) -> Result<Vec<u8>> {
    match oriented(g, axis_order)? {
        Some(swapped) => wkb::encode(&swapped),
        None => wkb::encode(g),
    }
}

/// ST_AsGeoJSON — `precision` in decimal digits, `flags` as the MySQL
/// bitmask (1 bbox, 2 short CRS, 4 long CRS).
///
/// # Example
///
/// ```
/// use geosql_core::functions::io::{as_geojson, geom_from_text};
///
/// let g = geom_from_text("POINT(1.23456 2)", Some(4326), None).unwrap();
/// let doc = as_geojson(&g, Some(2), Some(2)).unwrap();
/// assert_eq!(
///     doc.to_string(),
///     r#"{"type":"Point","coordinates":[1.23,2.0],"crs":{"type":"name","properties":{"name":"EPSG:4326"}}}"#
/// );
/// ```
pub fn as_geojson(
    g: &Geometry,
    precision: Option<i64>,
    flags: Option<i64>,
) -> Result<serde_json::Value> {
    let mut opts = GeoJsonEncodeOptions::new();
    if let Some(precision) = precision {
        opts = opts.with_precision(precision)?;
    }
    if let Some(flags) = flags {
        opts = opts.with_flags(GeoJsonFlags::from_bits(flags)?);
    }
    Ok(geojson::encode(g, &opts))
}
