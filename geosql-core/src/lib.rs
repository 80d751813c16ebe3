//! Spatial geometry engine for a MySQL-compatible SQL layer.
//!
//! The [`geometry`] module holds the value model together with the relate
//! and measure algorithms. [`wkb`], [`wkt`] and [`geojson`] are the
//! interchange codecs, and [`functions`] exposes the `ST_*` SQL surface over
//! [`value::Value`] arguments.
//!
//! ```
//! use geosql_core::{functions, value::Value};
//!
//! let square = functions::call(
//!     "ST_GeomFromText",
//!     &[Value::from("POLYGON((0 0,0 1,1 1,1 0,0 0))")],
//! )
//! .unwrap();
//! assert_eq!(functions::call("ST_Area", &[square]).unwrap(), Value::Double(1.0));
//! ```

pub mod config;
pub mod error;
pub mod function_catalog;
pub mod functions;
pub mod geojson;
pub mod geometry;
pub mod srs;
pub mod value;
pub mod wkb;
pub mod wkt;

pub use error::{Result, SpatialError};
pub use geometry::{Geometry, GeometryKind};
