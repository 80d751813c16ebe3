//! WKB (Well-Known Binary) reader and writer.
//!
//! Wire format, recursively for every member:
//!   [0x01|0x00]   byte order marker (little-endian or big-endian)
//!   [u32]         geometry type (1=Point, 2=LineString, …, 7=GeometryCollection)
//!   …             payload: coordinates as f64 pairs, counts as u32
//!
//! Parsing and writing go through geozero. This module adds the MySQL
//! rules on top: a known outermost type, no trailing bytes, 2D only and a
//! bounded collection depth. The encoder always writes little-endian. The
//! storage layout used for geometry columns prefixes the WKB with the SRID
//! as a little-endian u32.

use geozero::wkb::Wkb;
use geozero::{CoordDimensions, GeozeroGeometry, ToWkb};

use crate::config::DecodeOptions;
use crate::error::{Result, SpatialError};
use crate::geometry::{Geometry, GeometryBuilder, GeometryKind, LineString, Polygon, MAX_NESTING_DEPTH};

// ── Geometry type codes ───────────────────────────────────────────────────────
pub const WKB_POINT: u32 = 1;
pub const WKB_LINESTRING: u32 = 2;
pub const WKB_POLYGON: u32 = 3;
pub const WKB_MULTIPOINT: u32 = 4;
pub const WKB_MULTILINESTRING: u32 = 5;
pub const WKB_MULTIPOLYGON: u32 = 6;
pub const WKB_GEOMETRYCOLLECTION: u32 = 7;

const BIG_ENDIAN: u8 = 0x00;
const LITTLE_ENDIAN: u8 = 0x01;

const HEADER_LEN: usize = 5;
const COUNT_LEN: usize = 4;
const COORD_LEN: usize = 16;
const SRID_LEN: usize = 4;

/// Parsed WKB header of the outermost geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WkbHeader {
    pub kind: GeometryKind,
    /// Whether numeric fields are encoded in little-endian order.
    pub little_endian: bool,
}

/// Peek at the WKB header without parsing the payload.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::{Geometry, GeometryKind, Point};
/// use geosql_core::wkb::{encode, peek_header};
///
/// let blob = encode(&Geometry::from(Point::new(1.0, 2.0))).unwrap();
/// let hdr = peek_header(&blob).unwrap();
/// assert_eq!(hdr.kind, GeometryKind::Point);
/// assert!(hdr.little_endian);
/// ```
pub fn peek_header(blob: &[u8]) -> Result<WkbHeader> {
    let Some((&order, rest)) = blob.split_first() else {
        return Err(SpatialError::InvalidWkb("blob too short".into()));
    };
    let Some(code) = rest.first_chunk::<4>() else {
        return Err(SpatialError::InvalidWkb("blob too short".into()));
    };
    let little_endian = match order {
        LITTLE_ENDIAN => true,
        BIG_ENDIAN => false,
        _ => return Err(SpatialError::InvalidWkb("invalid byte order marker".into())),
    };
    let code = if little_endian {
        u32::from_le_bytes(*code)
    } else {
        u32::from_be_bytes(*code)
    };
    let kind = GeometryKind::from_wkb_code(code)
        .ok_or_else(|| SpatialError::InvalidWkb(format!("unknown geometry type {code}")))?;
    Ok(WkbHeader {
        kind,
        little_endian,
    })
}

fn decode_exact(blob: &[u8], srid: u32, max_depth: usize) -> Result<Geometry> {
    peek_header(blob)?;
    let mut builder = GeometryBuilder::new(srid, max_depth, SpatialError::InvalidWkb);
    let outcome = Wkb(blob).process_geom(&mut builder);
    let geom = builder.finish(outcome)?;
    if encoded_len(&geom) != blob.len() {
        return Err(SpatialError::InvalidWkb(
            "trailing bytes after geometry".into(),
        ));
    }
    Ok(geom)
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode WKB with default options (SRID 0).
///
/// # Example
///
/// ```
/// use geosql_core::geometry::{Geometry, Point};
/// use geosql_core::wkb::decode;
///
/// // big-endian POINT(1 2)
/// let mut blob = vec![0x00];
/// blob.extend_from_slice(&1u32.to_be_bytes());
/// blob.extend_from_slice(&1.0f64.to_be_bytes());
/// blob.extend_from_slice(&2.0f64.to_be_bytes());
/// assert_eq!(decode(&blob).unwrap(), Geometry::from(Point::new(1.0, 2.0)));
/// ```
pub fn decode(blob: &[u8]) -> Result<Geometry> {
    decode_with(blob, &DecodeOptions::default())
}

/// Decode WKB, stamping the requested SRID and applying the axis order.
pub fn decode_with(blob: &[u8], opts: &DecodeOptions) -> Result<Geometry> {
    let srid = opts.resolve_srid(0)?;
    let geom = decode_exact(blob, srid, opts.depth_limit()).inspect_err(|e| {
        tracing::debug!(codec = "wkb", len = blob.len(), error = %e, "rejected WKB payload");
    })?;
    if opts.axis_order.swaps(srid) {
        tracing::trace!(codec = "wkb", srid, "swapping axes on decode");
        return Ok(geom.swap_xy());
    }
    Ok(geom)
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Exact number of bytes [`encode`] produces for `geom`.
pub fn encoded_len(geom: &Geometry) -> usize {
    fn line_len(ls: &LineString) -> usize {
        COUNT_LEN + COORD_LEN * ls.len()
    }
    fn polygon_len(poly: &Polygon) -> usize {
        COUNT_LEN + poly.rings().iter().map(line_len).sum::<usize>()
    }

    HEADER_LEN
        + match geom {
            Geometry::Point(_) => COORD_LEN,
            Geometry::LineString(ls) => line_len(ls),
            Geometry::Polygon(poly) => polygon_len(poly),
            Geometry::MultiPoint(mp) => COUNT_LEN + mp.points().len() * (HEADER_LEN + COORD_LEN),
            Geometry::MultiLineString(ml) => {
                COUNT_LEN + ml.lines().iter().map(|l| HEADER_LEN + line_len(l)).sum::<usize>()
            }
            Geometry::MultiPolygon(mp) => {
                COUNT_LEN
                    + mp.polygons()
                        .iter()
                        .map(|p| HEADER_LEN + polygon_len(p))
                        .sum::<usize>()
            }
            Geometry::GeometryCollection(gc) => {
                COUNT_LEN + gc.geometries().iter().map(encoded_len).sum::<usize>()
            }
        }
}

/// Serialise a geometry to little-endian WKB. The SRID is not written.
///
/// Fails only when a member list is too long for a WKB count field.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::{Geometry, Point};
/// use geosql_core::wkb::{decode, encode};
///
/// let geom = Geometry::from(Point::new(1.0, 2.0));
/// let blob = encode(&geom).unwrap();
/// assert_eq!(blob.len(), 21);
/// assert_eq!(decode(&blob).unwrap(), geom);
/// ```
pub fn encode(geom: &Geometry) -> Result<Vec<u8>> {
    Ok(geom.to_wkb(CoordDimensions::xy())?)
}

// ── Storage format ────────────────────────────────────────────────────────────

/// Column storage layout: `[srid: u32 LE][WKB]`.
///
/// # Example
///
/// ```
/// use geosql_core::geometry::{Geometry, Point};
/// use geosql_core::wkb::{deserialize, serialize};
///
/// let geom = Geometry::from(Point::new(1.0, 2.0).with_srid(4326));
/// let stored = serialize(&geom).unwrap();
/// assert_eq!(&stored[..4], &4326u32.to_le_bytes());
/// assert_eq!(deserialize(&stored).unwrap().srid(), 4326);
/// ```
pub fn serialize(geom: &Geometry) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(SRID_LEN + encoded_len(geom));
    out.extend_from_slice(&geom.srid().to_le_bytes());
    out.extend_from_slice(&encode(geom)?);
    Ok(out)
}

/// Inverse of [`serialize`]. The stored SRID is taken as-is, so values in
/// user-defined reference systems survive a round trip.
pub fn deserialize(stored: &[u8]) -> Result<Geometry> {
    let (srid_bytes, blob) = stored
        .split_first_chunk::<SRID_LEN>()
        .ok_or_else(|| SpatialError::InvalidWkb("missing SRID header".into()))?;
    let srid = u32::from_le_bytes(*srid_bytes);
    decode_exact(blob, srid, MAX_NESTING_DEPTH).inspect_err(|e| {
        tracing::debug!(codec = "storage", len = stored.len(), error = %e, "rejected stored geometry");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisOrder;
    use crate::wkt;

    fn unhex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn text(s: &str) -> Geometry {
        wkt::decode(s).unwrap()
    }

    // ── Encoding ───────────────────────────────────────────────────

    #[test]
    fn encode_matches_mysql_bytes() {
        let cases = [
            ("POINT(1 2)", "0101000000000000000000F03F0000000000000040"),
            (
                "POINT(-123.45 678.9)",
                "0101000000CDCCCCCCCCDC5EC03333333333378540",
            ),
            (
                "LINESTRING(1 2,3 4)",
                "010200000002000000000000000000F03F000000000000004000000000000008400000000000001040",
            ),
            (
                "POLYGON((0 0,1 1,1 0,0 0))",
                "0103000000010000000400000000000000000000000000000000000000000000000000F03F000000000000F03F000000000000F03F000000000000000000000000000000000000000000000000",
            ),
            (
                "MULTIPOINT(1 2,3 4)",
                "0104000000020000000101000000000000000000F03F0000000000000040010100000000000000000008400000000000001040",
            ),
            (
                "MULTILINESTRING((0 0,1 1,2 2))",
                "01050000000100000001020000000300000000000000000000000000000000000000000000000000F03F000000000000F03F00000000000000400000000000000040",
            ),
            ("GEOMETRYCOLLECTION()", "010700000000000000"),
        ];
        for (input, hex) in cases {
            assert_eq!(encode(&text(input)).unwrap(), unhex(hex), "{input}");
        }
    }

    #[test]
    fn encoded_len_is_exact() {
        for input in [
            "POINT(1 2)",
            "LINESTRING(0 0,1 1,2 2)",
            "POLYGON((0 0,0 4,4 4,4 0,0 0),(1 1,1 2,2 2,2 1,1 1))",
            "MULTIPOINT(1 2,3 4)",
            "MULTILINESTRING((0 0,1 1),(2 2,3 3,4 4))",
            "MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)))",
            "GEOMETRYCOLLECTION(POINT(1 2),GEOMETRYCOLLECTION(LINESTRING(0 0,1 1)))",
        ] {
            let g = text(input);
            assert_eq!(encode(&g).unwrap().len(), encoded_len(&g), "{input}");
            assert_eq!(serialize(&g).unwrap().len(), encoded_len(&g) + 4, "{input}");
        }
    }

    // ── Decoding ───────────────────────────────────────────────────

    #[test]
    fn big_endian_matches_little_endian() {
        let le = decode(&unhex("0101000000000000000000F03F0000000000000040")).unwrap();
        let be = decode(&unhex("00000000013FF00000000000004000000000000000")).unwrap();
        assert_eq!(le, be);
        assert_eq!(le, text("POINT(1 2)"));
    }

    #[test]
    fn header_peek() {
        let hdr = peek_header(&unhex("00000000013FF00000000000004000000000000000")).unwrap();
        assert_eq!(hdr.kind, GeometryKind::Point);
        assert!(!hdr.little_endian);
        assert!(peek_header(&[0x01, 0x02]).is_err());
        assert!(peek_header(&[0x02, 0x01, 0x00, 0x00, 0x00]).is_err());
    }

    #[test]
    fn malformed_blobs_are_errors() {
        let truncated = unhex("00000000013FF0000000000000");
        assert!(matches!(decode(&truncated), Err(SpatialError::InvalidWkb(_))));
        assert!(decode(&[]).is_err());

        let mut unknown = vec![0x01];
        unknown.extend_from_slice(&9u32.to_le_bytes());
        assert!(matches!(decode(&unknown), Err(SpatialError::InvalidWkb(_))));

        let mut trailing = encode(&text("POINT(1 2)")).unwrap();
        trailing.push(0);
        assert!(matches!(decode(&trailing), Err(SpatialError::InvalidWkb(_))));
    }

    #[test]
    fn huge_counts_do_not_allocate() {
        let mut blob = vec![0x01];
        blob.extend_from_slice(&WKB_LINESTRING.to_le_bytes());
        blob.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(decode(&blob), Err(SpatialError::InvalidWkb(_))));
    }

    #[test]
    fn open_polygon_rings_are_rejected() {
        let mut blob = vec![0x01];
        blob.extend_from_slice(&WKB_POLYGON.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&2u32.to_le_bytes());
        for v in [0.0f64, 0.0, 1.0, 1.0] {
            blob.extend_from_slice(&v.to_le_bytes());
        }
        assert!(decode(&blob).unwrap_err().is_decode_error());
    }

    #[test]
    fn multi_members_must_match() {
        // MULTIPOINT holding a LINESTRING
        let mut blob = vec![0x01];
        blob.extend_from_slice(&WKB_MULTIPOINT.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&encode(&text("LINESTRING(0 0,1 1)")).unwrap());
        assert!(matches!(decode(&blob), Err(SpatialError::InvalidWkb(_))));
    }

    #[test]
    fn nested_z_members_are_rejected() {
        // GEOMETRYCOLLECTION(POINT Z(1 2 3))
        let mut blob = vec![0x01];
        blob.extend_from_slice(&WKB_GEOMETRYCOLLECTION.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.push(0x01);
        blob.extend_from_slice(&1001u32.to_le_bytes());
        for v in [1.0f64, 2.0, 3.0] {
            blob.extend_from_slice(&v.to_le_bytes());
        }
        assert!(matches!(decode(&blob), Err(SpatialError::InvalidWkb(_))));
    }

    #[test]
    fn decode_applies_srid_and_axis_order() {
        let blob = encode(&text("POINT(1 2)")).unwrap();
        let opts = DecodeOptions::new().with_srid(4326);
        let g = decode_with(&blob, &opts).unwrap();
        assert_eq!(g.srid(), 4326);
        assert_eq!(g, text("POINT(1 2)"));

        let swapped = decode_with(&blob, &opts.with_axis_order(AxisOrder::LongLat)).unwrap();
        assert_eq!(swapped, text("POINT(2 1)"));

        let cartesian = DecodeOptions::new()
            .with_srid(0)
            .with_axis_order(AxisOrder::LongLat);
        assert_eq!(decode_with(&blob, &cartesian).unwrap(), text("POINT(1 2)"));

        let bad = DecodeOptions::new().with_srid(1234);
        assert!(matches!(
            decode_with(&blob, &bad),
            Err(SpatialError::InvalidSrid(1234))
        ));
    }

    #[test]
    fn nested_srid_is_stamped() {
        let g = text("GEOMETRYCOLLECTION(MULTIPOINT(1 2),GEOMETRYCOLLECTION(POINT(3 4)))");
        let decoded = decode_with(&encode(&g).unwrap(), &DecodeOptions::new().with_srid(3857)).unwrap();
        assert!(decoded.walk().all(|(node, _)| node.srid() == 3857));
        assert!(decoded.points().all(|p| p.srid() == 3857));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let g = text("GEOMETRYCOLLECTION(GEOMETRYCOLLECTION(GEOMETRYCOLLECTION()))");
        let blob = encode(&g).unwrap();
        assert!(decode_with(&blob, &DecodeOptions::new().with_max_depth(3)).is_ok());
        assert!(matches!(
            decode_with(&blob, &DecodeOptions::new().with_max_depth(2)),
            Err(SpatialError::NestingTooDeep { .. })
        ));
    }

    // ── Storage ────────────────────────────────────────────────────

    #[test]
    fn storage_keeps_custom_srid() {
        let g = text("LINESTRING(0 0,1 1)").with_srid(1234);
        let stored = serialize(&g).unwrap();
        let back = deserialize(&stored).unwrap();
        assert_eq!(back, g);
        assert_eq!(back.srid(), 1234);
        assert!(deserialize(&stored[..3]).is_err());
    }
}
