//! GeoJSON (RFC 7946) reader and writer.
//!
//! The reader accepts a bare geometry, a `Feature` (unwrapped to its
//! geometry) or a `FeatureCollection` (flattened to a GeometryCollection).
//! Decoded values default to SRID 4326; coordinates are read in document
//! order, `[x, y]`.

use serde_json::{json, Map, Value};

use crate::config::{DimensionPolicy, GeoJsonDecodeOptions, GeoJsonEncodeOptions, GeoJsonFlags};
use crate::error::{Result, SpatialError};
use crate::geometry::measure::BoundingBox;
use crate::geometry::{
    Geometry, GeometryCollection, GeometryKind, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use crate::srs::WGS84_SRID;

// ── Writer ────────────────────────────────────────────────────────────────────

struct Writer {
    scale: Option<f64>,
}

impl Writer {
    /// Rounds to the requested precision. Values whose scaled form leaves
    /// the finite range are written unrounded.
    fn number(&self, v: f64) -> Value {
        let rounded = self
            .scale
            .map(|scale| (v * scale).round() / scale)
            .filter(|r| r.is_finite());
        Value::from(rounded.unwrap_or(v))
    }

    fn position(&self, p: &Point) -> Value {
        Value::Array(vec![self.number(p.x()), self.number(p.y())])
    }

    fn positions(&self, points: &[Point]) -> Value {
        points.iter().map(|p| self.position(p)).collect()
    }

    fn rings(&self, poly: &Polygon) -> Value {
        poly.rings()
            .iter()
            .map(|ring| self.positions(ring.points()))
            .collect()
    }

    /// `coordinates` for simple types, `geometries` for collections.
    fn body(&self, geom: &Geometry) -> Value {
        match geom {
            Geometry::Point(p) => self.position(p),
            Geometry::LineString(ls) => self.positions(ls.points()),
            Geometry::Polygon(poly) => self.rings(poly),
            Geometry::MultiPoint(mp) => self.positions(mp.points()),
            Geometry::MultiLineString(ml) => ml
                .lines()
                .iter()
                .map(|ls| self.positions(ls.points()))
                .collect(),
            Geometry::MultiPolygon(mp) => mp.polygons().iter().map(|p| self.rings(p)).collect(),
            Geometry::GeometryCollection(gc) => gc
                .geometries()
                .iter()
                .map(|g| Value::Object(self.object(g)))
                .collect(),
        }
    }

    fn object(&self, geom: &Geometry) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert("type".into(), geom.kind().geojson_name().into());
        let key = match geom {
            Geometry::GeometryCollection(_) => "geometries",
            _ => "coordinates",
        };
        obj.insert(key.into(), self.body(geom));
        obj
    }
}

/// Encode a geometry as a GeoJSON object.
///
/// Bounding box and CRS members are only added at the top level.
///
/// # Example
///
/// ```
/// use geosql_core::config::{GeoJsonEncodeOptions, GeoJsonFlags};
/// use geosql_core::geojson::encode;
/// use geosql_core::geometry::{Geometry, Point};
/// use serde_json::json;
///
/// let p = Geometry::from(Point::new(123.45678, 456.789));
/// let opts = GeoJsonEncodeOptions::new()
///     .with_precision(2)
///     .unwrap()
///     .with_flags(GeoJsonFlags::BBOX);
/// assert_eq!(
///     encode(&p, &opts),
///     json!({"type": "Point", "coordinates": [123.46, 456.79], "bbox": [123.46, 456.79, 123.46, 456.79]})
/// );
/// ```
pub fn encode(geom: &Geometry, opts: &GeoJsonEncodeOptions) -> Value {
    let writer = Writer {
        scale: opts.precision.map(|p| 10f64.powi(p as i32)),
    };
    let mut obj = writer.object(geom);

    if opts.flags.contains(GeoJsonFlags::BBOX) {
        if let Some(bbox) = BoundingBox::of(geom) {
            let values = [bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y]
                .into_iter()
                .map(|v| writer.number(v))
                .collect();
            obj.insert("bbox".into(), Value::Array(values));
        }
    }

    let srid = geom.srid();
    if srid != 0 {
        let name = if opts.flags.contains(GeoJsonFlags::LONG_CRS) {
            Some(format!("urn:ogc:def:crs:EPSG::{srid}"))
        } else if opts.flags.contains(GeoJsonFlags::SHORT_CRS) {
            Some(format!("EPSG:{srid}"))
        } else {
            None
        };
        if let Some(name) = name {
            obj.insert(
                "crs".into(),
                json!({"type": "name", "properties": {"name": name}}),
            );
        }
    }

    Value::Object(obj)
}

// ── Reader ────────────────────────────────────────────────────────────────────

fn invalid(detail: impl Into<String>) -> SpatialError {
    SpatialError::InvalidGeoJson(detail.into())
}

fn member<'v>(obj: &'v Map<String, Value>, name: &str) -> Result<&'v Value> {
    obj.get(name)
        .ok_or_else(|| invalid(format!("missing required member '{name}'")))
}

fn wrong(name: &str) -> SpatialError {
    invalid(format!("member '{name}' is wrong"))
}

fn as_array<'v>(value: &'v Value, name: &str) -> Result<&'v [Value]> {
    value.as_array().map(Vec::as_slice).ok_or_else(|| wrong(name))
}

struct Reader {
    srid: u32,
    dimensions: DimensionPolicy,
    max_depth: usize,
}

impl Reader {
    fn position(&self, value: &Value) -> Result<Point> {
        let coords = as_array(value, "coordinates")?;
        if coords.len() < 2 {
            return Err(wrong("coordinates"));
        }
        if coords.len() > 2 && self.dimensions == DimensionPolicy::Reject {
            return Err(invalid(
                "unsupported number of coordinate dimensions in a position",
            ));
        }
        let mut numbers = coords.iter().map(|c| c.as_f64().ok_or_else(|| wrong("coordinates")));
        let x = numbers.next().ok_or_else(|| wrong("coordinates"))??;
        let y = numbers.next().ok_or_else(|| wrong("coordinates"))??;
        // extra dimensions must still be numbers even when dropped
        numbers.try_for_each(|n| n.map(drop))?;
        Ok(Point::new(x, y).with_srid(self.srid))
    }

    fn positions(&self, value: &Value) -> Result<Vec<Point>> {
        as_array(value, "coordinates")?
            .iter()
            .map(|v| self.position(v))
            .collect()
    }

    fn line(&self, value: &Value) -> Result<LineString> {
        Ok(LineString::new(self.srid, self.positions(value)?))
    }

    fn polygon(&self, value: &Value) -> Result<Polygon> {
        let rings = as_array(value, "coordinates")?
            .iter()
            .map(|v| self.line(v))
            .collect::<Result<Vec<_>>>()?;
        if rings.is_empty() || !rings.iter().all(LineString::is_linear_ring) {
            return Err(invalid("polygon rings must be closed linear rings"));
        }
        Polygon::new(self.srid, rings).map_err(|_| wrong("coordinates"))
    }

    fn each<T>(&self, value: &Value, f: impl Fn(&Value) -> Result<T>) -> Result<Vec<T>> {
        as_array(value, "coordinates")?.iter().map(f).collect()
    }

    fn collection(&self, members: &[Value], level: usize, features: bool) -> Result<Geometry> {
        if level >= self.max_depth {
            return Err(SpatialError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        let geometries = members
            .iter()
            .map(|m| {
                let obj = m.as_object().ok_or_else(|| wrong("geometries"))?;
                if features && obj.get("type").and_then(Value::as_str) != Some("Feature") {
                    return Err(wrong("type"));
                }
                self.object(obj, level + 1)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GeometryCollection::new(self.srid, geometries)?.into())
    }

    fn object(&self, obj: &Map<String, Value>, level: usize) -> Result<Geometry> {
        let type_name = member(obj, "type")?.as_str().ok_or_else(|| wrong("type"))?;
        match type_name {
            "Feature" => {
                member(obj, "properties")?;
                let geometry = member(obj, "geometry")?
                    .as_object()
                    .ok_or_else(|| wrong("geometry"))?;
                self.object(geometry, level)
            }
            "FeatureCollection" => {
                let features = as_array(member(obj, "features")?, "features")?;
                self.collection(features, level, true)
            }
            _ => {
                let kind = GeometryKind::from_geojson_name(type_name).ok_or_else(|| wrong("type"))?;
                if kind == GeometryKind::GeometryCollection {
                    let members = as_array(member(obj, "geometries")?, "geometries")?;
                    return self.collection(members, level, false);
                }
                let coords = member(obj, "coordinates")?;
                let srid = self.srid;
                Ok(match kind {
                    GeometryKind::Point => self.position(coords)?.into(),
                    GeometryKind::LineString => self.line(coords)?.into(),
                    GeometryKind::Polygon => self.polygon(coords)?.into(),
                    GeometryKind::MultiPoint => MultiPoint::new(srid, self.positions(coords)?).into(),
                    GeometryKind::MultiLineString => {
                        MultiLineString::new(srid, self.each(coords, |v| self.line(v))?).into()
                    }
                    GeometryKind::MultiPolygon => {
                        MultiPolygon::new(srid, self.each(coords, |v| self.polygon(v))?).into()
                    }
                    GeometryKind::GeometryCollection => return Err(wrong("type")),
                })
            }
        }
    }
}

/// Decode a parsed JSON document.
pub fn decode_value(doc: &Value, opts: &GeoJsonDecodeOptions) -> Result<Geometry> {
    let srid = opts.decode.resolve_srid(WGS84_SRID)?;
    let reader = Reader {
        srid,
        dimensions: opts.dimensions,
        max_depth: opts.decode.depth_limit(),
    };
    let obj = doc
        .as_object()
        .ok_or_else(|| invalid("document is not a JSON object"))?;
    let geom = reader.object(obj, 0)?;
    if opts.decode.axis_order.swaps(srid) {
        tracing::trace!(codec = "geojson", srid, "swapping axes on decode");
        return Ok(geom.swap_xy());
    }
    Ok(geom)
}

/// Parse and decode a GeoJSON string.
///
/// # Example
///
/// ```
/// use geosql_core::config::GeoJsonDecodeOptions;
/// use geosql_core::geojson::decode;
///
/// let doc = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}}"#;
/// let g = decode(doc, &GeoJsonDecodeOptions::default()).unwrap();
/// assert_eq!(g.srid(), 4326);
/// assert_eq!(g.to_string(), "POINT(1 2)");
/// ```
pub fn decode(doc: &str, opts: &GeoJsonDecodeOptions) -> Result<Geometry> {
    serde_json::from_str::<Value>(doc)
        .map_err(SpatialError::from)
        .and_then(|value| decode_value(&value, opts))
        .inspect_err(|e| {
            tracing::debug!(codec = "geojson", len = doc.len(), error = %e, "rejected GeoJSON payload");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisOrder, DecodeOptions};
    use crate::wkt;

    fn text(s: &str) -> Geometry {
        wkt::decode(s).unwrap()
    }

    fn plain(g: &Geometry) -> Value {
        encode(g, &GeoJsonEncodeOptions::default())
    }

    fn read(doc: &str) -> Result<Geometry> {
        decode(doc, &GeoJsonDecodeOptions::default())
    }

    // ── Writer ─────────────────────────────────────────────────────

    #[test]
    fn simple_types() {
        assert_eq!(
            plain(&text("POINT(1 2)")),
            json!({"type": "Point", "coordinates": [1.0, 2.0]})
        );
        assert_eq!(
            plain(&text("LINESTRING(1 2,3 4)")),
            json!({"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]})
        );
        assert_eq!(
            plain(&text("POLYGON((0 0,1 0,1 1,0 0))")),
            json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]})
        );
        assert_eq!(
            plain(&text("MULTIPOLYGON(((0 0,1 1,1 0,0 0)))")),
            json!({"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]]]})
        );
    }

    #[test]
    fn empty_collection_has_empty_geometries() {
        let opts = GeoJsonEncodeOptions::new()
            .with_precision(2)
            .unwrap()
            .with_flags(GeoJsonFlags::BBOX);
        let out = encode(&text("GEOMETRYCOLLECTION()"), &opts);
        assert_eq!(out, json!({"type": "GeometryCollection", "geometries": []}));
        assert_eq!(
            out.to_string(),
            r#"{"type":"GeometryCollection","geometries":[]}"#
        );
    }

    #[test]
    fn precision_rounds_half_away_from_zero() {
        let p = text("POINT(0.123456789 0.987654321)");
        let low = GeoJsonEncodeOptions::new().with_precision(3).unwrap();
        assert_eq!(
            encode(&p, &low),
            json!({"type": "Point", "coordinates": [0.123, 0.988]})
        );
        let high = GeoJsonEncodeOptions::new().with_precision(20).unwrap();
        assert_eq!(
            encode(&p, &high),
            json!({"type": "Point", "coordinates": [0.123456789, 0.987654321]})
        );
    }

    #[test]
    fn precision_never_drops_large_coordinates() {
        let p = Geometry::from(Point::new(1e300, 0.1));
        let opts = GeoJsonEncodeOptions::new().with_precision(17).unwrap();
        let out = encode(&p, &opts);
        assert_eq!(out["coordinates"], json!([1e300, 0.1]));
        assert!(out["coordinates"][0].is_number());

        let bbox = encode(&p, &opts.with_flags(GeoJsonFlags::BBOX));
        assert_eq!(bbox["bbox"], json!([1e300, 0.1, 1e300, 0.1]));
    }

    #[test]
    fn collection_bbox_spans_members() {
        let g = text(
            "GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(1 2,3 4),POLYGON((0 0,1 1,1 0,0 0)),\
             GEOMETRYCOLLECTION())",
        );
        let opts = GeoJsonEncodeOptions::new().with_flags(GeoJsonFlags::BBOX);
        let out = encode(&g, &opts);
        assert_eq!(out["bbox"], json!([0.0, 0.0, 3.0, 4.0]));
        assert_eq!(out["geometries"][3], json!({"type": "GeometryCollection", "geometries": []}));
        assert!(out["geometries"][0].get("bbox").is_none());
    }

    #[test]
    fn crs_member_needs_srid() {
        let short = GeoJsonEncodeOptions::new().with_flags(GeoJsonFlags::SHORT_CRS);
        let long = GeoJsonEncodeOptions::new().with_flags(GeoJsonFlags::LONG_CRS);
        let both = GeoJsonEncodeOptions::new()
            .with_flags(GeoJsonFlags::SHORT_CRS | GeoJsonFlags::LONG_CRS);

        assert!(encode(&text("POINT(1 2)"), &short).get("crs").is_none());

        let p = text("POINT(1 2)").with_srid(4326);
        assert_eq!(
            encode(&p, &short)["crs"],
            json!({"type": "name", "properties": {"name": "EPSG:4326"}})
        );
        assert_eq!(
            encode(&p, &long)["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4326"
        );
        assert_eq!(
            encode(&p, &both)["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4326"
        );
    }

    // ── Reader ─────────────────────────────────────────────────────

    #[test]
    fn geometry_documents() {
        let p = read(r#"{"type":"Point", "coordinates":[1,2]}"#).unwrap();
        assert_eq!(p, text("POINT(1 2)"));
        assert_eq!(p.srid(), 4326);

        let l = read(r#"{"type":"LineString", "coordinates":[[1,2],[3,4]]}"#).unwrap();
        assert_eq!(l.to_string(), "LINESTRING(1 2,3 4)");
        assert!(l.points().all(|pt| pt.srid() == 4326));

        let gc = read(r#"{"type":"GeometryCollection","geometries":[]}"#).unwrap();
        assert_eq!(gc.to_string(), "GEOMETRYCOLLECTION()");
    }

    #[test]
    fn features_unwrap() {
        let g = read(
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point", "coordinates":[1,2]},"properties":{}}],"properties":{}}"#,
        )
        .unwrap();
        assert_eq!(g.to_string(), "GEOMETRYCOLLECTION(POINT(1 2))");
        assert_eq!(g.srid(), 4326);

        let no_props = read(r#"{"type":"Feature","geometry":{"type":"Point", "coordinates":[1,2]}}"#);
        assert_eq!(
            no_props.unwrap_err().to_string(),
            "invalid GeoJSON: missing required member 'properties'"
        );
        let no_geometry = read(r#"{"type":"Feature","properties":{}}"#);
        assert_eq!(
            no_geometry.unwrap_err().to_string(),
            "invalid GeoJSON: missing required member 'geometry'"
        );
    }

    #[test]
    fn required_members() {
        assert_eq!(
            read(r#"{"coordinates":[1,2]}"#).unwrap_err().to_string(),
            "invalid GeoJSON: missing required member 'type'"
        );
        assert_eq!(
            read(r#"{"type":"Point"}"#).unwrap_err().to_string(),
            "invalid GeoJSON: missing required member 'coordinates'"
        );
        assert_eq!(
            read(r#"{"type":"Pointy","coordinates":[1,2]}"#)
                .unwrap_err()
                .to_string(),
            "invalid GeoJSON: member 'type' is wrong"
        );
        assert!(matches!(read("{not json"), Err(SpatialError::Json(_))));
        assert!(read("[1,2]").unwrap_err().is_decode_error());
    }

    #[test]
    fn extra_dimensions() {
        let doc = r#"{"type":"Polygon", "coordinates":[[[0,0],[1,1],[0,1],[0,0,0]]]}"#;
        assert!(read(doc).is_err());
        let strip = GeoJsonDecodeOptions::new().with_dimensions(DimensionPolicy::StripExtra);
        let g = decode(doc, &strip).unwrap();
        assert_eq!(g.to_string(), "POLYGON((0 0,1 1,0 1,0 0))");
        assert!(decode(r#"{"type":"Point","coordinates":[1,2,"z"]}"#, &strip).is_err());
    }

    #[test]
    fn srid_and_axis_options() {
        let zero = GeoJsonDecodeOptions::new().with_decode(DecodeOptions::new().with_srid(0));
        let g = decode(r#"{"type":"Point","coordinates":[1,2]}"#, &zero).unwrap();
        assert_eq!(g.srid(), 0);
        assert_eq!(g.to_string(), "POINT(1 2)");

        let long_lat = GeoJsonDecodeOptions::new()
            .with_decode(DecodeOptions::new().with_axis_order(AxisOrder::LongLat));
        let g = decode(r#"{"type":"Point","coordinates":[1,2]}"#, &long_lat).unwrap();
        assert_eq!(g.to_string(), "POINT(2 1)");

        let bad = GeoJsonDecodeOptions::new().with_decode(DecodeOptions::new().with_srid(1234));
        assert!(matches!(
            decode(r#"{"type":"Point","coordinates":[1,2]}"#, &bad),
            Err(SpatialError::InvalidSrid(1234))
        ));
    }

    #[test]
    fn encode_then_decode_keeps_structure() {
        let g = text(
            "GEOMETRYCOLLECTION(MULTIPOINT(1 2,3 4),MULTILINESTRING((0 0,1 1)),\
             GEOMETRYCOLLECTION(POINT(5 6)))",
        )
        .with_srid(4326);
        let doc = plain(&g).to_string();
        assert_eq!(read(&doc).unwrap(), g);
    }
}
