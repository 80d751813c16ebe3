//! WKT (Well-Known Text) reader and writer.
//!
//! Output is canonical: upper-case keywords, no whitespace except the single
//! space between X and Y, shortest round-trip numbers, e.g.
//! `POLYGON((0 0,0 1,1 1,0 0))`. Input is whitespace-tolerant and keywords
//! match case-insensitively.
//!
//! Reading is done by geozero after a lexical pass that maps MySQL's `()`
//! empty lists onto `EMPTY`, bounds the nesting depth and rejects anything
//! but keywords, numbers and punctuation.

use std::fmt::{self, Write};

use geozero::error::{GeozeroError, Result as GeozeroResult};
use geozero::wkt::Wkt;
use geozero::{GeomProcessor, GeozeroGeometry};

use crate::config::DecodeOptions;
use crate::error::{Result, SpatialError};
use crate::geometry::{Geometry, GeometryBuilder, GeometryKind};

// ── Writer ────────────────────────────────────────────────────────────────────

/// Streams MySQL-flavoured WKT: bare `x y` members in MULTIPOINT and `()`
/// for empty lists.
struct WktWriter<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> WktWriter<'_, W> {
    fn put(&mut self, s: &str) -> GeozeroResult<()> {
        self.out
            .write_str(s)
            .map_err(|_| GeozeroError::Geometry("formatter error".into()))
    }

    fn open(&mut self, kind: Option<GeometryKind>, idx: usize) -> GeozeroResult<()> {
        if idx > 0 {
            self.put(",")?;
        }
        if let Some(kind) = kind {
            self.put(kind.wkt_keyword())?;
        }
        self.put("(")
    }

    fn close(&mut self) -> GeozeroResult<()> {
        self.put(")")
    }
}

impl<W: Write> GeomProcessor for WktWriter<'_, W> {
    fn xy(&mut self, x: f64, y: f64, idx: usize) -> GeozeroResult<()> {
        if idx > 0 {
            self.put(",")?;
        }
        write!(self.out, "{x} {y}").map_err(|_| GeozeroError::Geometry("formatter error".into()))
    }

    fn point_begin(&mut self, idx: usize) -> GeozeroResult<()> {
        self.open(Some(GeometryKind::Point), idx)
    }

    fn point_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }

    fn multipoint_begin(&mut self, _size: usize, idx: usize) -> GeozeroResult<()> {
        self.open(Some(GeometryKind::MultiPoint), idx)
    }

    fn multipoint_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }

    fn linestring_begin(&mut self, tagged: bool, _size: usize, idx: usize) -> GeozeroResult<()> {
        self.open(tagged.then_some(GeometryKind::LineString), idx)
    }

    fn linestring_end(&mut self, _tagged: bool, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }

    fn multilinestring_begin(&mut self, _size: usize, idx: usize) -> GeozeroResult<()> {
        self.open(Some(GeometryKind::MultiLineString), idx)
    }

    fn multilinestring_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }

    fn polygon_begin(&mut self, tagged: bool, _size: usize, idx: usize) -> GeozeroResult<()> {
        self.open(tagged.then_some(GeometryKind::Polygon), idx)
    }

    fn polygon_end(&mut self, _tagged: bool, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }

    fn multipolygon_begin(&mut self, _size: usize, idx: usize) -> GeozeroResult<()> {
        self.open(Some(GeometryKind::MultiPolygon), idx)
    }

    fn multipolygon_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }

    fn geometrycollection_begin(&mut self, _size: usize, idx: usize) -> GeozeroResult<()> {
        self.open(Some(GeometryKind::GeometryCollection), idx)
    }

    fn geometrycollection_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.close()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.process_geom(&mut WktWriter { out: f })
            .map_err(|_| fmt::Error)
    }
}

/// Render a geometry as canonical WKT. Axes are written as stored.
///
/// # Example
///
/// ```
/// use geosql_core::wkt::{decode, encode};
///
/// let g = decode("  linestring ( 1 2 ,  3.50 4 ) ").unwrap();
/// assert_eq!(encode(&g), "LINESTRING(1 2,3.5 4)");
/// ```
pub fn encode(geom: &Geometry) -> String {
    geom.to_string()
}

// ── Reader ────────────────────────────────────────────────────────────────────

fn invalid(detail: impl Into<String>) -> SpatialError {
    SpatialError::InvalidWkt(detail.into())
}

/// Rewrite MySQL WKT into the dialect geozero reads.
///
/// `()` becomes ` EMPTY`, bare MULTIPOINT members `x y` become `(x y)` and
/// keywords are upper-cased. Parentheses deeper than `max_depth` collections
/// can need are refused before the recursive reader sees them.
fn mysql_dialect(text: &str, max_depth: usize) -> Result<String> {
    // Innermost list of a MULTIPOLYGON sits three levels below its keyword.
    let paren_limit = max_depth.saturating_add(3);
    let mut out = String::with_capacity(text.len() + 8);
    let mut depth = 0usize;
    let mut closed = false;
    let mut after_multipoint = false;
    let mut multipoint_list: Option<usize> = None;
    let mut wrapped = false;
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            out.push(c);
            continue;
        }
        if closed {
            return Err(invalid(format!("unexpected trailing input at offset {i}")));
        }
        match c {
            '(' => {
                let rest = &text[i + 1..];
                let trimmed = rest.trim_start();
                if trimmed.starts_with(')') {
                    let skip = rest.len() - trimmed.len() + 1;
                    for _ in 0..rest[..skip].chars().count() {
                        chars.next();
                    }
                    out.push_str(" EMPTY");
                    after_multipoint = false;
                    closed = depth == 0;
                    continue;
                }
                depth += 1;
                if depth > paren_limit {
                    return Err(SpatialError::NestingTooDeep { limit: max_depth });
                }
                if after_multipoint {
                    multipoint_list = Some(depth);
                    after_multipoint = false;
                }
                out.push(c);
            }
            ')' | ',' => {
                if multipoint_list == Some(depth) && wrapped {
                    out.push(')');
                    wrapped = false;
                }
                if c == ')' {
                    if multipoint_list == Some(depth) {
                        multipoint_list = None;
                    }
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| invalid(format!("unbalanced ')' at offset {i}")))?;
                    closed = depth == 0;
                }
                out.push(c);
            }
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {
                let len = text[i..]
                    .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
                    .unwrap_or(text.len() - i);
                let word = &text[i..i + len];
                for _ in 1..len {
                    chars.next();
                }
                if c.is_ascii_alphabetic() {
                    let kind = GeometryKind::from_wkt_keyword(word);
                    let empty = word.eq_ignore_ascii_case("EMPTY");
                    if kind.is_none() && !empty {
                        return Err(invalid(format!("unexpected word '{word}' at offset {i}")));
                    }
                    after_multipoint = kind == Some(GeometryKind::MultiPoint);
                    closed = depth == 0 && empty;
                    out.push_str(&word.to_ascii_uppercase());
                } else {
                    if multipoint_list == Some(depth) && !wrapped {
                        out.push('(');
                        wrapped = true;
                    }
                    out.push_str(word);
                }
            }
            _ => return Err(invalid(format!("unexpected character '{c}' at offset {i}"))),
        }
    }
    if depth > 0 {
        return Err(invalid("unterminated geometry"));
    }
    Ok(out)
}

fn parse(text: &str, srid: u32, max_depth: usize) -> Result<Geometry> {
    let normalized = mysql_dialect(text, max_depth)?;
    let mut builder = GeometryBuilder::new(srid, max_depth, SpatialError::InvalidWkt);
    let outcome = Wkt(normalized.as_bytes()).process_geom(&mut builder);
    builder.finish(outcome)
}

/// Parse WKT with default options (SRID 0).
///
/// # Example
///
/// ```
/// use geosql_core::wkt::decode;
///
/// let g = decode("POINT(1 2)").unwrap();
/// assert_eq!(g.srid(), 0);
/// assert!(decode("badpoint(1 2)").is_err());
/// assert!(decode("polygon((1 2, 3 4))").is_err());
/// ```
pub fn decode(text: &str) -> Result<Geometry> {
    decode_with(text, &DecodeOptions::default())
}

/// Parse WKT, stamping the requested SRID and applying the axis order.
pub fn decode_with(text: &str, opts: &DecodeOptions) -> Result<Geometry> {
    let srid = opts.resolve_srid(0)?;
    let geom = parse(text, srid, opts.depth_limit()).inspect_err(|e| {
        tracing::debug!(codec = "wkt", len = text.len(), error = %e, "rejected WKT payload");
    })?;
    if opts.axis_order.swaps(srid) {
        tracing::trace!(codec = "wkt", srid, "swapping axes on decode");
        return Ok(geom.swap_xy());
    }
    Ok(geom)
}
