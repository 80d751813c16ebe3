//! Codec configuration types.
//!
//! Options accepted by the WKB, WKT and GeoJSON decoders and the GeoJSON
//! encoder. All of them are plain data with `Default` values matching the
//! MySQL defaults.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::geometry::MAX_NESTING_DEPTH;
use crate::srs;

/// Axis order named by the `axis-order=` option string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisOrder {
    /// Coordinates are stored in the order the reference system defines.
    #[default]
    SridDefined,
    /// Input is longitude first; swapped on decode for geographic systems.
    LongLat,
    /// Input is latitude first.
    LatLong,
}

impl AxisOrder {
    /// Whether a decoder should swap X and Y for a value in `srid`.
    pub fn swaps(self, srid: u32) -> bool {
        self == AxisOrder::LongLat && srs::is_geographic(srid)
    }
}

impl FromStr for AxisOrder {
    type Err = SpatialError;

    /// Parse `axis-order=<value>`, ignoring case and surrounding whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// use geosql_core::config::AxisOrder;
    ///
    /// let order: AxisOrder = "  AXIS-ORDER=long-lat ".parse().unwrap();
    /// assert_eq!(order, AxisOrder::LongLat);
    /// assert!("axis-order=up-down".parse::<AxisOrder>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let option = s.trim().to_ascii_lowercase();
        match option.as_str() {
            "axis-order=long-lat" => Ok(AxisOrder::LongLat),
            "axis-order=lat-long" => Ok(AxisOrder::LatLong),
            "axis-order=srid-defined" => Ok(AxisOrder::SridDefined),
            _ => Err(SpatialError::invalid_argument(
                "axis-order",
                format!("unrecognized option '{}'", s.trim()),
            )),
        }
    }
}

/// Options shared by the WKB and WKT decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// SRID stamped on the decoded value; `None` keeps the codec default.
    pub srid: Option<u32>,
    pub axis_order: AxisOrder,
    /// Deepest GeometryCollection nesting accepted.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            srid: None,
            axis_order: AxisOrder::SridDefined,
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_srid(mut self, srid: u32) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn with_axis_order(mut self, axis_order: AxisOrder) -> Self {
        self.axis_order = axis_order;
        self
    }

    /// Lower the nesting limit. Values above [`MAX_NESTING_DEPTH`] are clamped.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_NESTING_DEPTH);
        self
    }

    /// The SRID a decoder stamps, validated against the reference table.
    pub(crate) fn resolve_srid(&self, default: u32) -> Result<u32> {
        match self.srid {
            Some(srid) => srs::validate_srid(i64::from(srid)),
            None => Ok(default),
        }
    }

    pub(crate) fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_NESTING_DEPTH)
    }
}

// ── GeoJSON ───────────────────────────────────────────────────────────────────

/// Treatment of coordinate arrays longer than two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DimensionPolicy {
    /// Option `1`: fail on extra dimensions.
    #[default]
    Reject,
    /// Options `2`, `3`, `4`: drop everything after Y.
    StripExtra,
}

impl DimensionPolicy {
    /// Map the numeric `options` argument of `ST_GeomFromGeoJSON`.
    pub fn from_option(option: i64) -> Result<Self> {
        match option {
            1 => Ok(DimensionPolicy::Reject),
            2..=4 => Ok(DimensionPolicy::StripExtra),
            _ => Err(SpatialError::invalid_argument(
                "st_geomfromgeojson",
                format!("option {option} is out of range"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoJsonDecodeOptions {
    pub decode: DecodeOptions,
    pub dimensions: DimensionPolicy,
}

impl Default for GeoJsonDecodeOptions {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            dimensions: DimensionPolicy::Reject,
        }
    }
}

impl GeoJsonDecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decode(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_dimensions(mut self, dimensions: DimensionPolicy) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// Bitmask accepted by `ST_AsGeoJSON`'s `options` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeoJsonFlags(u8);

impl GeoJsonFlags {
    pub const NONE: GeoJsonFlags = GeoJsonFlags(0);
    pub const BBOX: GeoJsonFlags = GeoJsonFlags(1);
    pub const SHORT_CRS: GeoJsonFlags = GeoJsonFlags(2);
    pub const LONG_CRS: GeoJsonFlags = GeoJsonFlags(4);

    /// Accepts `0..=7`.
    pub fn from_bits(bits: i64) -> Result<Self> {
        match u8::try_from(bits) {
            Ok(b) if b <= 7 => Ok(GeoJsonFlags(b)),
            _ => Err(SpatialError::invalid_argument(
                "st_asgeojson",
                format!("options value {bits} is out of range"),
            )),
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: GeoJsonFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for GeoJsonFlags {
    type Output = GeoJsonFlags;

    fn bitor(self, rhs: Self) -> Self {
        GeoJsonFlags(self.0 | rhs.0)
    }
}

/// Largest number of decimal digits kept by the encoder.
pub const MAX_GEOJSON_PRECISION: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeoJsonEncodeOptions {
    /// Decimal digits kept; `None` leaves coordinates unrounded.
    pub precision: Option<u32>,
    pub flags: GeoJsonFlags,
}

impl GeoJsonEncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Negative precisions are rejected; large ones are clamped to 17.
    pub fn with_precision(mut self, precision: i64) -> Result<Self> {
        if precision < 0 {
            return Err(SpatialError::invalid_argument(
                "st_asgeojson",
                "incorrect precision value",
            ));
        }
        let clamped = precision.min(i64::from(MAX_GEOJSON_PRECISION));
        self.precision = u32::try_from(clamped).ok();
        Ok(self)
    }

    pub fn with_flags(mut self, flags: GeoJsonFlags) -> Self {
        self.flags = flags;
        self
    }
}
