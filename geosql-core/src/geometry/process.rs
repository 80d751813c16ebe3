//! geozero integration for the value model.
//!
//! [`Geometry`] implements [`GeozeroGeometry`], so any geozero processor
//! (the WKB writer, the WKT writer in [`crate::wkt`]) can consume it.
//! [`GeometryBuilder`] goes the other way: it is a [`GeomProcessor`] that
//! collects a reader's event stream back into a [`Geometry`], enforcing the
//! structural rules of the model as it goes.

use geozero::error::{GeozeroError, Result as GeozeroResult};
use geozero::{GeomProcessor, GeozeroGeometry};

use super::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
use crate::error::{Result, SpatialError};

/// Largest element count reserved before the elements are seen.
const MAX_PREALLOC: usize = 1024;

// ── Geometry → events ─────────────────────────────────────────────────────────

/// Member counts travel as WKB `u32` fields.
fn member_count(n: usize) -> GeozeroResult<usize> {
    u32::try_from(n)
        .map(|_| n)
        .map_err(|_| GeozeroError::Geometry(format!("{n} members exceed the u32 count range")))
}

fn process_line<P: GeomProcessor>(
    ls: &LineString,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    processor.linestring_begin(tagged, member_count(ls.len())?, idx)?;
    for (i, p) in ls.points().iter().enumerate() {
        processor.xy(p.x(), p.y(), i)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    poly: &Polygon,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    processor.polygon_begin(tagged, member_count(poly.rings().len())?, idx)?;
    for (i, ring) in poly.rings().iter().enumerate() {
        process_line(ring, false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

fn process_geometry<P: GeomProcessor>(
    geom: &Geometry,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    match geom {
        Geometry::Point(p) => {
            processor.point_begin(idx)?;
            processor.xy(p.x(), p.y(), 0)?;
            processor.point_end(idx)
        }
        Geometry::LineString(ls) => process_line(ls, true, idx, processor),
        Geometry::Polygon(poly) => process_polygon(poly, true, idx, processor),
        Geometry::MultiPoint(mp) => {
            processor.multipoint_begin(member_count(mp.points().len())?, idx)?;
            for (i, p) in mp.points().iter().enumerate() {
                processor.xy(p.x(), p.y(), i)?;
            }
            processor.multipoint_end(idx)
        }
        Geometry::MultiLineString(ml) => {
            processor.multilinestring_begin(member_count(ml.lines().len())?, idx)?;
            for (i, ls) in ml.lines().iter().enumerate() {
                process_line(ls, false, i, processor)?;
            }
            processor.multilinestring_end(idx)
        }
        Geometry::MultiPolygon(mp) => {
            processor.multipolygon_begin(member_count(mp.polygons().len())?, idx)?;
            for (i, poly) in mp.polygons().iter().enumerate() {
                process_polygon(poly, false, i, processor)?;
            }
            processor.multipolygon_end(idx)
        }
        Geometry::GeometryCollection(gc) => {
            processor.geometrycollection_begin(member_count(gc.geometries().len())?, idx)?;
            for (i, member) in gc.geometries().iter().enumerate() {
                process_geometry(member, i, processor)?;
            }
            processor.geometrycollection_end(idx)
        }
    }
}

impl GeozeroGeometry for Geometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> GeozeroResult<()> {
        process_geometry(self, 0, processor)
    }
}

// ── Events → Geometry ─────────────────────────────────────────────────────────

/// A geometry under construction.
enum Frame {
    Point(Option<Point>),
    Line(Vec<Point>),
    Polygon(Vec<LineString>),
    MultiPoint(Vec<Point>),
    MultiLine(Vec<LineString>),
    MultiPolygon(Vec<Polygon>),
    Collection(Vec<Geometry>),
}

/// Collects geozero reader events into a [`Geometry`] stamped with one SRID.
///
/// Only 2D coordinates and the seven MySQL geometry types are accepted.
/// Polygon rings must be linear rings and collections may nest at most
/// `max_depth` levels. Rejections are reported through the codec's own
/// error variant (`invalid`), except for nesting and SRID errors which keep
/// their dedicated variants.
pub(crate) struct GeometryBuilder {
    srid: u32,
    max_depth: usize,
    invalid: fn(String) -> SpatialError,
    stack: Vec<Frame>,
    done: Option<Geometry>,
    error: Option<SpatialError>,
}

impl GeometryBuilder {
    pub(crate) fn new(srid: u32, max_depth: usize, invalid: fn(String) -> SpatialError) -> Self {
        Self {
            srid,
            max_depth,
            invalid,
            stack: Vec::new(),
            done: None,
            error: None,
        }
    }

    /// The decoded geometry, given the reader's own outcome.
    pub(crate) fn finish(mut self, outcome: GeozeroResult<()>) -> Result<Geometry> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        outcome.map_err(|e| (self.invalid)(e.to_string()))?;
        if !self.stack.is_empty() {
            return Err((self.invalid)("unterminated geometry".into()));
        }
        self.done
            .ok_or_else(|| (self.invalid)("no geometry found".into()))
    }

    fn fail<T>(&mut self, error: SpatialError) -> GeozeroResult<T> {
        let message = error.to_string();
        self.error = Some(error);
        Err(GeozeroError::Geometry(message))
    }

    fn reject<T>(&mut self, detail: &str) -> GeozeroResult<T> {
        let error = (self.invalid)(detail.to_string());
        self.fail(error)
    }

    fn open(&mut self, frame: Frame) -> GeozeroResult<()> {
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self) -> GeozeroResult<Frame> {
        match self.stack.pop() {
            Some(frame) => Ok(frame),
            None => self.reject("unbalanced geometry stream"),
        }
    }

    fn coordinate_xy(&mut self, x: f64, y: f64) -> GeozeroResult<()> {
        let p = Point::new(x, y).with_srid(self.srid);
        let accepted = match self.stack.last_mut() {
            Some(Frame::Point(slot @ None)) => {
                *slot = Some(p);
                true
            }
            Some(Frame::Line(points) | Frame::MultiPoint(points)) => {
                points.push(p);
                true
            }
            _ => false,
        };
        if !accepted {
            return self.reject("coordinate outside a point list");
        }
        Ok(())
    }

    /// Hand a finished geometry to the enclosing frame, or keep it as the
    /// result at the top level.
    fn attach(&mut self, geom: Geometry) -> GeozeroResult<()> {
        let rejected = match (self.stack.last_mut(), geom) {
            (None, geom) => self
                .done
                .replace(geom)
                .map(|_| "more than one top-level geometry"),
            (Some(Frame::Polygon(rings)), Geometry::LineString(ring)) if ring.is_linear_ring() => {
                rings.push(ring);
                None
            }
            (Some(Frame::Polygon(_)), Geometry::LineString(_)) => {
                Some("polygon ring is not a closed linear ring")
            }
            (Some(Frame::MultiLine(lines)), Geometry::LineString(line)) => {
                lines.push(line);
                None
            }
            (Some(Frame::MultiPolygon(polygons)), Geometry::Polygon(poly)) => {
                polygons.push(poly);
                None
            }
            (Some(Frame::Collection(members)), geom) => {
                members.push(geom);
                None
            }
            _ => Some("unexpected member type"),
        };
        match rejected {
            Some(detail) => self.reject(detail),
            None => Ok(()),
        }
    }

    fn collection_depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|frame| matches!(frame, Frame::Collection(_)))
            .count()
    }
}

impl GeomProcessor for GeometryBuilder {
    /// Ask readers for full coordinates so Z and M values can be refused.
    fn multi_dim(&self) -> bool {
        true
    }

    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> GeozeroResult<()> {
        self.coordinate_xy(x, y)
    }

    fn coordinate(
        &mut self,
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
        _t: Option<f64>,
        _tm: Option<u64>,
        _idx: usize,
    ) -> GeozeroResult<()> {
        if z.is_some() || m.is_some() {
            return self.reject("only 2D coordinates are supported");
        }
        self.coordinate_xy(x, y)
    }

    fn empty_point(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.reject("POINT EMPTY is not supported")
    }

    fn point_begin(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.open(Frame::Point(None))
    }

    fn point_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::Point(Some(p)) => self.attach(p.into()),
            Frame::Point(None) => self.reject("POINT EMPTY is not supported"),
            _ => self.reject("unbalanced geometry stream"),
        }
    }

    fn multipoint_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.open(Frame::MultiPoint(Vec::with_capacity(size.min(MAX_PREALLOC))))
    }

    fn multipoint_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::MultiPoint(points) => self.attach(MultiPoint::new(self.srid, points).into()),
            _ => self.reject("unbalanced geometry stream"),
        }
    }

    fn linestring_begin(&mut self, _tagged: bool, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.open(Frame::Line(Vec::with_capacity(size.min(MAX_PREALLOC))))
    }

    fn linestring_end(&mut self, _tagged: bool, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::Line(points) => self.attach(LineString::new(self.srid, points).into()),
            _ => self.reject("unbalanced geometry stream"),
        }
    }

    fn multilinestring_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.open(Frame::MultiLine(Vec::with_capacity(size.min(MAX_PREALLOC))))
    }

    fn multilinestring_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::MultiLine(lines) => self.attach(MultiLineString::new(self.srid, lines).into()),
            _ => self.reject("unbalanced geometry stream"),
        }
    }

    fn polygon_begin(&mut self, _tagged: bool, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.open(Frame::Polygon(Vec::with_capacity(size.min(MAX_PREALLOC))))
    }

    fn polygon_end(&mut self, _tagged: bool, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::Polygon(rings) if rings.is_empty() => self.reject("polygon has no rings"),
            Frame::Polygon(rings) => match Polygon::new(self.srid, rings) {
                Ok(poly) => self.attach(poly.into()),
                Err(_) => self.reject("polygon ring is not a closed linear ring"),
            },
            _ => self.reject("unbalanced geometry stream"),
        }
    }

    fn multipolygon_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.open(Frame::MultiPolygon(Vec::with_capacity(size.min(MAX_PREALLOC))))
    }

    fn multipolygon_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::MultiPolygon(polygons) => {
                self.attach(MultiPolygon::new(self.srid, polygons).into())
            }
            _ => self.reject("unbalanced geometry stream"),
        }
    }

    fn geometrycollection_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        if self.collection_depth() >= self.max_depth {
            return self.fail(SpatialError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.open(Frame::Collection(Vec::with_capacity(size.min(MAX_PREALLOC))))
    }

    fn geometrycollection_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        match self.close()? {
            Frame::Collection(members) => match GeometryCollection::new(self.srid, members) {
                Ok(gc) => self.attach(gc.into()),
                Err(e) => self.fail(e),
            },
            _ => self.reject("unbalanced geometry stream"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(events: impl FnOnce(&mut GeometryBuilder) -> GeozeroResult<()>) -> Result<Geometry> {
        let mut builder = GeometryBuilder::new(3857, 2, SpatialError::InvalidWkt);
        let outcome = events(&mut builder);
        builder.finish(outcome)
    }

    #[test]
    fn counts_must_fit_wkb_fields() {
        assert_eq!(member_count(7).unwrap(), 7);
        assert!(member_count(u32::MAX as usize).is_ok());
        assert!(matches!(
            member_count(u32::MAX as usize + 1),
            Err(GeozeroError::Geometry(_))
        ));
    }

    #[test]
    fn replaying_a_geometry_rebuilds_it() {
        let square = LineString::new(
            0,
            [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]
                .into_iter()
                .map(|(x, y)| Point::new(x, y))
                .collect(),
        );
        let gc = GeometryCollection::new(
            0,
            vec![
                Point::new(1.0, 2.0).into(),
                MultiPoint::new(0, vec![Point::new(3.0, 4.0)]).into(),
                Polygon::new(0, vec![square]).unwrap().into(),
            ],
        )
        .unwrap();
        let g = Geometry::from(gc);
        let rebuilt = build(|b| g.process_geom(b)).unwrap();
        assert_eq!(rebuilt, g.clone().with_srid(3857));
        assert!(rebuilt.points().all(|p| p.srid() == 3857));
    }

    #[test]
    fn third_dimension_is_refused() {
        let err = build(|b| {
            b.point_begin(0)?;
            b.coordinate(1.0, 2.0, Some(3.0), None, None, None, 0)?;
            b.point_end(0)
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid WKT: only 2D coordinates are supported");
    }

    #[test]
    fn structural_rules() {
        let open_ring = build(|b| {
            b.polygon_begin(true, 1, 0)?;
            b.linestring_begin(false, 2, 0)?;
            b.xy(0.0, 0.0, 0)?;
            b.xy(1.0, 1.0, 1)?;
            b.linestring_end(false, 0)?;
            b.polygon_end(true, 0)
        });
        assert!(open_ring.unwrap_err().is_decode_error());

        let no_rings = build(|b| {
            b.polygon_begin(true, 0, 0)?;
            b.polygon_end(true, 0)
        });
        assert!(no_rings.unwrap_err().is_decode_error());

        let empty_point = build(|b| {
            b.point_begin(0)?;
            b.point_end(0)
        });
        assert!(empty_point.unwrap_err().is_decode_error());

        assert!(build(|_| Ok(())).unwrap_err().is_decode_error());
    }

    #[test]
    fn collection_depth_is_bounded() {
        let err = build(|b| {
            b.geometrycollection_begin(1, 0)?;
            b.geometrycollection_begin(1, 0)?;
            b.geometrycollection_begin(0, 0)
        })
        .unwrap_err();
        assert!(matches!(err, SpatialError::NestingTooDeep { limit: 2 }));
    }

    #[test]
    fn huge_declared_counts_reserve_little() {
        let g = build(|b| {
            b.linestring_begin(true, usize::MAX, 0)?;
            b.xy(0.0, 0.0, 0)?;
            b.linestring_end(true, 0)
        })
        .unwrap();
        assert_eq!(g.to_string(), "LINESTRING(0 0)");
    }
}
