//! Already-evaluated SQL scalars handed to the `functions` layer.

use std::fmt;

use crate::error::{Result, SpatialError};
use crate::geometry::Geometry;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Json(serde_json::Value),
    Geometry(Geometry),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Double(_) => "DOUBLE",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
            Value::Json(_) => "JSON",
            Value::Geometry(_) => "GEOMETRY",
        }
    }

    /// A geometry argument. `Null` passes through as `None`.
    pub fn as_geometry(&self, function: &'static str) -> Result<Option<&Geometry>> {
        match self {
            Value::Null => Ok(None),
            Value::Geometry(g) => Ok(Some(g)),
            _ => Err(SpatialError::InvalidGisData { function }),
        }
    }

    /// A numeric argument, also accepting numeric strings.
    pub fn as_f64(&self, function: &'static str) -> Result<Option<f64>> {
        match self {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::Double(d) => Ok(Some(*d)),
            Value::Bool(b) => Ok(Some(f64::from(u8::from(*b)))),
            Value::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                SpatialError::invalid_argument(function, format!("'{s}' is not a number"))
            }),
            Value::Blob(b) => std::str::from_utf8(b)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map(Some)
                .ok_or_else(|| SpatialError::invalid_argument(function, "blob is not a number")),
            other => Err(SpatialError::invalid_argument(
                function,
                format!("expected a number, got {}", other.type_name()),
            )),
        }
    }

    pub fn as_i64(&self, function: &'static str) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            Value::Bool(b) => Ok(Some(i64::from(*b))),
            Value::Double(d) if d.fract() == 0.0 && d.is_finite() => Ok(Some(*d as i64)),
            Value::Text(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                SpatialError::invalid_argument(function, format!("'{s}' is not an integer"))
            }),
            other => Err(SpatialError::invalid_argument(
                function,
                format!("expected an integer, got {}", other.type_name()),
            )),
        }
    }

    pub fn as_str(&self, function: &'static str) -> Result<Option<&str>> {
        match self {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            Value::Blob(b) => std::str::from_utf8(b)
                .map(Some)
                .map_err(|_| SpatialError::invalid_argument(function, "blob is not valid UTF-8")),
            other => Err(SpatialError::invalid_argument(
                function,
                format!("expected a string, got {}", other.type_name()),
            )),
        }
    }

    pub fn as_bytes(&self, function: &'static str) -> Result<Option<&[u8]>> {
        match self {
            Value::Null => Ok(None),
            Value::Blob(b) => Ok(Some(b)),
            Value::Text(s) => Ok(Some(s.as_bytes())),
            _ => Err(SpatialError::InvalidGisData { function }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => {
                f.write_str("0x")?;
                b.iter().try_for_each(|byte| write!(f, "{byte:02X}"))
            }
            Value::Json(j) => write!(f, "{j}"),
            Value::Geometry(g) => write!(f, "{g}"),
        }
    }
}

impl From<Geometry> for Value {
    fn from(g: Geometry) -> Self {
        Value::Geometry(g)
    }
}

impl From<Option<Geometry>> for Value {
    fn from(g: Option<Geometry>) -> Self {
        g.map_or(Value::Null, Value::Geometry)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Option<bool>> for Value {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Value::Null, Value::Bool)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Option<f64>> for Value {
    fn from(d: Option<f64>) -> Self {
        d.map_or(Value::Null, Value::Double)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Option<i64>> for Value {
    fn from(i: Option<i64>) -> Self {
        i.map_or(Value::Null, Value::Int)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Null, Value::Text)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<Option<Vec<u8>>> for Value {
    fn from(b: Option<Vec<u8>>) -> Self {
        b.map_or(Value::Null, Value::Blob)
    }
}

impl From<Option<serde_json::Value>> for Value {
    fn from(j: Option<serde_json::Value>) -> Self {
        j.map_or(Value::Null, Value::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn geometry_arguments() {
        let p = Value::from(Geometry::from(Point::new(1.0, 2.0)));
        assert!(p.as_geometry("st_x").unwrap().is_some());
        assert!(Value::Null.as_geometry("st_x").unwrap().is_none());
        assert!(matches!(
            Value::from("notapoint").as_geometry("st_x"),
            Err(SpatialError::InvalidGisData { function: "st_x" })
        ));
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(Value::from("-123.456").as_f64("st_x").unwrap(), Some(-123.456));
        assert_eq!(
            Value::Blob(b" 7.5".to_vec()).as_f64("st_x").unwrap(),
            Some(7.5)
        );
        assert_eq!(Value::Int(3).as_f64("st_x").unwrap(), Some(3.0));
        assert!(Value::from("abc").as_f64("st_x").is_err());
    }

    #[test]
    fn integers() {
        assert_eq!(Value::Double(4326.0).as_i64("st_srid").unwrap(), Some(4326));
        assert_eq!(Value::Bool(true).as_i64("st_srid").unwrap(), Some(1));
        assert!(Value::Double(1.5).as_i64("st_srid").is_err());
        assert_eq!(Value::from("12").as_i64("st_srid").unwrap(), Some(12));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Blob(vec![0x01, 0xAB]).to_string(), "0x01AB");
        assert_eq!(
            Value::from(Geometry::from(Point::new(1.0, 2.0))).to_string(),
            "POINT(1 2)"
        );
    }
}
