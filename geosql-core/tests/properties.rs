//! Property-based tests for the codecs and the relate/measure algorithms.

use geosql_core::config::{GeoJsonDecodeOptions, GeoJsonEncodeOptions};
use geosql_core::geometry::{
    measure, relate, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use geosql_core::{geojson, wkb, wkt};
use proptest::collection::vec;
use proptest::prelude::*;

/// Coordinates in a range where shortest round-trip formatting is exact.
fn arb_point() -> impl Strategy<Value = Point> {
    (-1.0e6..1.0e6f64, -1.0e6..1.0e6f64).prop_map(|(x, y)| Point::new(x, y))
}

fn arb_line() -> impl Strategy<Value = LineString> {
    vec(arb_point(), 2..8).prop_map(|points| LineString::new(0, points))
}

fn arb_ring() -> impl Strategy<Value = LineString> {
    vec(arb_point(), 3..7).prop_map(|mut points| {
        points.push(points[0]);
        LineString::new(0, points)
    })
}

fn arb_polygon() -> impl Strategy<Value = Polygon> {
    vec(arb_ring(), 1..3).prop_map(|rings| Polygon::new(0, rings).unwrap())
}

fn arb_leaf() -> impl Strategy<Value = Geometry> {
    prop_oneof![
        arb_point().prop_map(Geometry::from),
        arb_line().prop_map(Geometry::from),
        arb_polygon().prop_map(Geometry::from),
        vec(arb_point(), 0..4).prop_map(|pts| Geometry::from(MultiPoint::new(0, pts))),
        vec(arb_line(), 0..3).prop_map(|lines| Geometry::from(MultiLineString::new(0, lines))),
        vec(arb_polygon(), 0..3).prop_map(|polys| Geometry::from(MultiPolygon::new(0, polys))),
    ]
}

/// Any geometry, including collections nested up to three levels.
fn arb_geometry() -> impl Strategy<Value = Geometry> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        vec(inner, 0..4)
            .prop_map(|members| Geometry::from(GeometryCollection::new(0, members).unwrap()))
    })
}

fn arb_srid() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), Just(3857u32), Just(4326u32)]
}

proptest! {
    // ── Codec round-trips ──────────────────────────────────────────

    #[test]
    fn wkb_round_trip(g in arb_geometry()) {
        let blob = wkb::encode(&g).unwrap();
        prop_assert_eq!(blob.len(), wkb::encoded_len(&g));
        prop_assert_eq!(wkb::decode(&blob).unwrap(), g);
    }

    #[test]
    fn storage_round_trip(g in arb_geometry(), srid in arb_srid()) {
        let g = g.with_srid(srid);
        let stored = wkb::serialize(&g).unwrap();
        prop_assert_eq!(stored.len(), 4 + wkb::encoded_len(&g));
        let back = wkb::deserialize(&stored).unwrap();
        prop_assert_eq!(back.srid(), srid);
        prop_assert_eq!(back, g);
    }

    #[test]
    fn wkt_round_trip(g in arb_geometry()) {
        let text = wkt::encode(&g);
        prop_assert_eq!(wkt::decode(&text).unwrap(), g, "{}", text);
    }

    #[test]
    fn geojson_round_trip(g in arb_geometry()) {
        let g = g.with_srid(4326);
        let doc = geojson::encode(&g, &GeoJsonEncodeOptions::default()).to_string();
        let back = geojson::decode(&doc, &GeoJsonDecodeOptions::default()).unwrap();
        prop_assert_eq!(back, g, "{}", doc);
    }

    #[test]
    fn big_endian_point_matches_little_endian(p in arb_point()) {
        let mut blob = vec![0x00];
        blob.extend_from_slice(&1u32.to_be_bytes());
        blob.extend_from_slice(&p.x().to_be_bytes());
        blob.extend_from_slice(&p.y().to_be_bytes());
        let big = wkb::decode(&blob).unwrap();
        let little = wkb::decode(&wkb::encode(&Geometry::from(p)).unwrap()).unwrap();
        prop_assert_eq!(big, little);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in vec(any::<u8>(), 0..128)) {
        let _ = wkb::decode(&bytes);
        let _ = wkb::deserialize(&bytes);
    }

    #[test]
    fn arbitrary_text_never_panics(text in "[A-Za-z(), .0-9-]{0,64}") {
        let _ = wkt::decode(&text);
    }

    // ── SRID propagation ───────────────────────────────────────────

    #[test]
    fn srid_reaches_every_component(g in arb_geometry(), srid in arb_srid()) {
        let stamped = g.with_srid(srid);
        prop_assert!(stamped.walk().all(|(node, _)| node.srid() == srid));
        prop_assert!(stamped.points().all(|p| p.srid() == srid));
        let swapped = stamped.swap_xy();
        prop_assert_eq!(swapped.srid(), srid);
        prop_assert!(swapped.points().all(|p| p.srid() == srid));
    }

    #[test]
    fn swap_is_an_involution(g in arb_geometry()) {
        prop_assert_eq!(g.swap_xy().swap_xy(), g);
    }

    // ── Relate / measure ───────────────────────────────────────────

    #[test]
    fn equals_is_reflexive(g in arb_geometry()) {
        prop_assert!(relate::equals(&g, &g));
    }

    #[test]
    fn point_equality_is_symmetric(a in arb_point(), b in arb_point()) {
        let (a, b) = (Geometry::from(a), Geometry::from(b));
        prop_assert_eq!(relate::equals(&a, &b), relate::equals(&b, &a));
    }

    #[test]
    fn distance_is_symmetric(a in arb_geometry(), b in arb_geometry()) {
        prop_assert_eq!(measure::distance(&a, &b), measure::distance(&b, &a));
    }

    #[test]
    fn distance_to_self_is_zero(p in arb_point()) {
        let p = Geometry::from(p);
        prop_assert_eq!(measure::distance(&p, &p), Some(0.0));
    }

    #[test]
    fn intersects_is_symmetric(a in arb_geometry(), b in arb_geometry()) {
        prop_assert_eq!(relate::intersects(&a, &b), relate::intersects(&b, &a));
    }
}
