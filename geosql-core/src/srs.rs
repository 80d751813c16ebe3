//! Spatial reference systems.
//!
//! The built-in table holds the systems every geometry function understands:
//! `0` (unspecified Cartesian plane), `3857` (Web Mercator) and `4326`
//! (WGS 84 geographic). [`SpatialReferenceTable`] layers user-defined systems
//! on top of it, mirroring `CREATE SPATIAL REFERENCE SYSTEM`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};

pub const CARTESIAN_SRID: u32 = 0;
pub const WEB_MERCATOR_SRID: u32 = 3857;
pub const WGS84_SRID: u32 = 4326;

/// Metadata row of a spatial reference system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReferenceSystem {
    pub srid: u32,
    pub name: Cow<'static, str>,
    pub organization: Option<Cow<'static, str>>,
    pub organization_id: Option<u32>,
    pub definition: Cow<'static, str>,
    pub description: Option<Cow<'static, str>>,
    pub geographic: bool,
}

const WGS84_DEFINITION: &str = concat!(
    r#"GEOGCS["WGS 84",DATUM["World Geodetic System 1984",SPHEROID["WGS 84",6378137,298.257223563,"#,
    r#"AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.017453292519943278,AUTHORITY["EPSG","9122"]],AXIS["Lat",NORTH],AXIS["Lon",EAST],"#,
    r#"AUTHORITY["EPSG","4326"]]"#
);

const WEB_MERCATOR_DEFINITION: &str = concat!(
    r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["World Geodetic System 1984","#,
    r#"SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],"#,
    r#"PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.017453292519943278,"#,
    r#"AUTHORITY["EPSG","9122"]],AXIS["Lat",NORTH],AXIS["Lon",EAST],AUTHORITY["EPSG","4326"]],"#,
    r#"PROJECTION["Popular Visualisation Pseudo Mercator",AUTHORITY["EPSG","1024"]],"#,
    r#"PARAMETER["Latitude of natural origin",0,AUTHORITY["EPSG","8801"]],"#,
    r#"PARAMETER["Longitude of natural origin",0,AUTHORITY["EPSG","8802"]],"#,
    r#"PARAMETER["False easting",0,AUTHORITY["EPSG","8806"]],"#,
    r#"PARAMETER["False northing",0,AUTHORITY["EPSG","8807"]],"#,
    r#"UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["X",EAST],AXIS["Y",NORTH],"#,
    r#"AUTHORITY["EPSG","3857"]]"#
);

/// Built-in systems, sorted by SRID.
pub static BUILTIN_SYSTEMS: &[SpatialReferenceSystem] = &[
    SpatialReferenceSystem {
        srid: CARTESIAN_SRID,
        name: Cow::Borrowed(""),
        organization: None,
        organization_id: None,
        definition: Cow::Borrowed(""),
        description: Some(Cow::Borrowed("Unspecified Cartesian plane")),
        geographic: false,
    },
    SpatialReferenceSystem {
        srid: WEB_MERCATOR_SRID,
        name: Cow::Borrowed("WGS 84 / Pseudo-Mercator"),
        organization: Some(Cow::Borrowed("EPSG")),
        organization_id: Some(WEB_MERCATOR_SRID),
        definition: Cow::Borrowed(WEB_MERCATOR_DEFINITION),
        description: None,
        geographic: false,
    },
    SpatialReferenceSystem {
        srid: WGS84_SRID,
        name: Cow::Borrowed("WGS 84"),
        organization: Some(Cow::Borrowed("EPSG")),
        organization_id: Some(WGS84_SRID),
        definition: Cow::Borrowed(WGS84_DEFINITION),
        description: None,
        geographic: true,
    },
];

/// Look up a built-in spatial reference system.
///
/// # Example
///
/// ```
/// use geosql_core::srs::lookup;
///
/// assert_eq!(lookup(4326).unwrap().name, "WGS 84");
/// assert!(lookup(1234).is_none());
/// ```
pub fn lookup(srid: u32) -> Option<&'static SpatialReferenceSystem> {
    BUILTIN_SYSTEMS
        .binary_search_by_key(&srid, |srs| srs.srid)
        .ok()
        .map(|idx| &BUILTIN_SYSTEMS[idx])
}

/// True when `srid` names a built-in system.
pub fn is_recognized(srid: u32) -> bool {
    lookup(srid).is_some()
}

/// True for geographic (angular, ellipsoidal) systems.
pub fn is_geographic(srid: u32) -> bool {
    lookup(srid).is_some_and(|srs| srs.geographic)
}

/// Validate a user-supplied SRID against the built-in table.
///
/// Accepts any integer so negative and oversized inputs are reported as
/// `InvalidSrid` rather than wrapping.
pub fn validate_srid(srid: i64) -> Result<u32> {
    match u32::try_from(srid) {
        Ok(s) if is_recognized(s) => Ok(s),
        _ => {
            tracing::trace!(srid, "rejected unknown SRID");
            Err(SpatialError::InvalidSrid(srid))
        }
    }
}

// ── User-defined systems ──────────────────────────────────────────────────────

/// How [`SpatialReferenceTable::define`] treats an SRID that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefineMode {
    /// Fail when the SRID is taken.
    #[default]
    Create,
    /// Replace an existing user-defined system.
    CreateOrReplace,
    /// Keep the existing system and succeed.
    IfNotExists,
}

/// Attributes of a `CREATE SPATIAL REFERENCE SYSTEM` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsDefinition {
    pub srid: u32,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub organization_id: Option<u32>,
    pub definition: Option<String>,
    pub description: Option<String>,
}

fn trimmed_name(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

impl SrsDefinition {
    fn validate(self) -> Result<SpatialReferenceSystem> {
        let name = self.name.ok_or(SpatialError::MissingSrsAttribute("NAME"))?;
        let organization = self
            .organization
            .ok_or(SpatialError::MissingSrsAttribute("ORGANIZATION NAME"))?;
        let organization_id = self
            .organization_id
            .ok_or(SpatialError::MissingSrsAttribute("ORGANIZATION ID"))?;
        let definition = self
            .definition
            .ok_or(SpatialError::MissingSrsAttribute("DEFINITION"))?;

        if !trimmed_name(&name) {
            return Err(SpatialError::InvalidSrsName("spatial reference system name"));
        }
        if !trimmed_name(&organization) {
            return Err(SpatialError::InvalidSrsName("organization name"));
        }

        Ok(SpatialReferenceSystem {
            srid: self.srid,
            geographic: definition.trim_start().starts_with("GEOGCS"),
            name: Cow::Owned(name),
            organization: Some(Cow::Owned(organization)),
            organization_id: Some(organization_id),
            definition: Cow::Owned(definition),
            description: self.description.map(Cow::Owned),
        })
    }
}

/// Built-in systems plus user definitions.
#[derive(Debug, Clone, Default)]
pub struct SpatialReferenceTable {
    custom: BTreeMap<u32, SpatialReferenceSystem>,
}

impl SpatialReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, srid: u32) -> Option<&SpatialReferenceSystem> {
        lookup(srid).or_else(|| self.custom.get(&srid))
    }

    pub fn contains(&self, srid: u32) -> bool {
        self.get(srid).is_some()
    }

    /// Register a system.
    ///
    /// # Example
    ///
    /// ```
    /// use geosql_core::srs::{DefineMode, SpatialReferenceTable, SrsDefinition};
    ///
    /// let mut table = SpatialReferenceTable::new();
    /// table
    ///     .define(
    ///         SrsDefinition {
    ///             srid: 1234,
    ///             name: Some("test_name".into()),
    ///             organization: Some("test_org".into()),
    ///             organization_id: Some(1234),
    ///             definition: Some("test_definition".into()),
    ///             description: None,
    ///         },
    ///         DefineMode::Create,
    ///     )
    ///     .unwrap();
    /// assert_eq!(table.get(1234).unwrap().name, "test_name");
    /// ```
    pub fn define(&mut self, def: SrsDefinition, mode: DefineMode) -> Result<()> {
        let srid = def.srid;
        let srs = def.validate()?;
        if lookup(srid).is_some() {
            return Err(SpatialError::ReservedSrid(srid));
        }
        match (mode, self.custom.contains_key(&srid)) {
            (DefineMode::Create, true) => Err(SpatialError::SrsAlreadyExists(srid)),
            (DefineMode::IfNotExists, true) => Ok(()),
            _ => {
                self.custom.insert(srid, srs);
                Ok(())
            }
        }
    }

    /// All systems, built-ins first, each group ordered by SRID.
    pub fn iter(&self) -> impl Iterator<Item = &SpatialReferenceSystem> {
        BUILTIN_SYSTEMS.iter().chain(self.custom.values())
    }
}
