use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("Incorrect parameter count in the call to native function '{function}'")]
    InvalidArgumentCount { function: &'static str, given: usize },

    #[error("Invalid GIS data provided to function {function}.")]
    InvalidGisData { function: &'static str },

    #[error(
        "Binary geometry function {function} given two geometries of different srids: \
         {left} and {right}, which should have been identical."
    )]
    DiffSrids {
        function: &'static str,
        left: u32,
        right: u32,
    },

    #[error("{function} has not been implemented for geographic spatial reference systems.")]
    UnsupportedSrid { function: &'static str, srid: u32 },

    #[error(
        "The geometry passed to function {function} is in SRID {srid}, which doesn't \
         specify a length unit. Can't convert to '{unit}'."
    )]
    NoUnitsForSrid {
        function: &'static str,
        srid: u32,
        unit: String,
    },

    #[error("{function}({left}, {right}) has not been implemented.")]
    UnsupportedGeometryType {
        function: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("There's no spatial reference system with SRID {0}.")]
    InvalidSrid(i64),

    #[error("invalid WKB: {0}")]
    InvalidWkb(String),

    #[error("invalid WKT: {0}")]
    InvalidWkt(String),

    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("geometry processing failed: {0}")]
    Geozero(#[from] geozero::error::GeozeroError),

    #[error("Incorrect arguments to {function}: {detail}")]
    InvalidArgument {
        function: &'static str,
        detail: String,
    },

    #[error("geometry nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("missing mandatory attribute {0}")]
    MissingSrsAttribute(&'static str),

    #[error("the {0} can't be an empty string or start or end with whitespace")]
    InvalidSrsName(&'static str),

    #[error("There is already a spatial reference system with SRID {0}.")]
    SrsAlreadyExists(u32),

    #[error("SRID {0} is a predefined spatial reference system and cannot be modified.")]
    ReservedSrid(u32),
}

impl SpatialError {
    /// True for the malformed-payload kind: WKB, WKT, GeoJSON and raw JSON failures.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidWkb(_) | Self::InvalidWkt(_) | Self::InvalidGeoJson(_) | Self::Json(_)
        )
    }

    pub(crate) fn invalid_argument(function: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpatialError>;
