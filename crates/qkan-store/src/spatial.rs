//! Spatial metadata handling.
//!
//! Geometry columns cannot be created with plain DDL: they have to be
//! registered with the spatial engine, which also owns their spatial index.
//! [`SpatialBackend`] renders those operations as SQL for the engine in use.
//!
//! - [`SpatialBackend::SpatiaLite`] calls the SpatiaLite SQL functions
//!   (`AddGeometryColumn`, `CreateSpatialIndex`, `DiscardGeometryColumn`, ...)
//!   and requires the `mod_spatialite` extension.
//! - [`SpatialBackend::Plain`] keeps geometry as BLOB columns and tracks them
//!   in its own `geometry_columns` table. It runs on any SQLite build.

use std::fmt;
use std::str::FromStr;

/// Name of the geometry registry table for both backends.
pub const GEOMETRY_COLUMNS: &str = "geometry_columns";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialBackend {
    SpatiaLite,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
        }
    }
}

/// One statement plus, for spatial SQL functions, the function whose scalar
/// result has to be `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub expect_success: Option<&'static str>,
}

impl SqlStatement {
    pub fn plain(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            expect_success: None,
        }
    }

    fn checked(sql: impl Into<String>, function: &'static str) -> Self {
        Self {
            sql: sql.into(),
            expect_success: Some(function),
        }
    }
}

impl SpatialBackend {
    /// Statements creating the geometry registry in an empty database.
    pub fn init_metadata(&self) -> Vec<SqlStatement> {
        match self {
            SpatialBackend::SpatiaLite => {
                vec![SqlStatement::checked("SELECT InitSpatialMetadata(1)", "InitSpatialMetadata")]
            }
            SpatialBackend::Plain => vec![SqlStatement::plain(format!(
                "CREATE TABLE IF NOT EXISTS {GEOMETRY_COLUMNS} (
                    f_table_name TEXT NOT NULL,
                    f_geometry_column TEXT NOT NULL,
                    geometry_type TEXT NOT NULL,
                    coord_dimension INTEGER NOT NULL,
                    srid INTEGER NOT NULL,
                    spatial_index_enabled INTEGER NOT NULL DEFAULT 0,
                    PRIMARY KEY (f_table_name, f_geometry_column))"
            ))],
        }
    }

    /// Add and register a two-dimensional geometry column on an existing table.
    pub fn add_geometry_column(
        &self,
        table: &str,
        column: &str,
        kind: GeometryKind,
        srid: i64,
    ) -> Vec<SqlStatement> {
        let kind = kind.as_str();
        match self {
            SpatialBackend::SpatiaLite => vec![SqlStatement::checked(
                format!("SELECT AddGeometryColumn('{table}','{column}',{srid},'{kind}',2)"),
                "AddGeometryColumn",
            )],
            SpatialBackend::Plain => vec![
                SqlStatement::plain(format!("ALTER TABLE \"{table}\" ADD COLUMN \"{column}\" BLOB")),
                SqlStatement::plain(format!(
                    "INSERT OR REPLACE INTO {GEOMETRY_COLUMNS}
                        (f_table_name, f_geometry_column, geometry_type, coord_dimension, srid, spatial_index_enabled)
                     VALUES (lower('{table}'), lower('{column}'), '{kind}', 2, {srid}, 0)"
                )),
            ],
        }
    }

    pub fn create_spatial_index(&self, table: &str, column: &str) -> Vec<SqlStatement> {
        match self {
            SpatialBackend::SpatiaLite => vec![SqlStatement::checked(
                format!("SELECT CreateSpatialIndex('{table}','{column}')"),
                "CreateSpatialIndex",
            )],
            SpatialBackend::Plain => vec![SqlStatement::plain(format!(
                "UPDATE {GEOMETRY_COLUMNS} SET spatial_index_enabled = 1
                 WHERE f_table_name = lower('{table}') AND f_geometry_column = lower('{column}')"
            ))],
        }
    }

    /// Remove a geometry column's registration and spatial index so the table
    /// can be dropped. Succeeds when nothing was registered.
    pub fn discard_geometry_column(&self, table: &str, column: &str) -> Vec<SqlStatement> {
        match self {
            SpatialBackend::SpatiaLite => vec![
                SqlStatement::plain(format!("SELECT DisableSpatialIndex('{table}','{column}')")),
                SqlStatement::plain(format!("DROP TABLE IF EXISTS \"idx_{table}_{column}\"")),
                SqlStatement::plain(format!("SELECT DiscardGeometryColumn('{table}','{column}')")),
            ],
            SpatialBackend::Plain => vec![SqlStatement::plain(format!(
                "DELETE FROM {GEOMETRY_COLUMNS}
                 WHERE f_table_name = lower('{table}') AND f_geometry_column = lower('{column}')"
            ))],
        }
    }

    /// Query returning the SRID of one geometry column.
    pub fn srid_query(&self, table: &str, column: &str) -> String {
        let source = match self {
            SpatialBackend::SpatiaLite => "geom_cols_ref_sys",
            SpatialBackend::Plain => GEOMETRY_COLUMNS,
        };
        format!(
            "SELECT srid FROM {source}
             WHERE lower(f_table_name) = lower('{table}')
             AND lower(f_geometry_column) = lower('{column}')"
        )
    }
}

impl fmt::Display for SpatialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialBackend::SpatiaLite => f.write_str("spatialite"),
            SpatialBackend::Plain => f.write_str("plain"),
        }
    }
}

impl FromStr for SpatialBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spatialite" => Ok(SpatialBackend::SpatiaLite),
            "plain" => Ok(SpatialBackend::Plain),
            other => Err(format!("unknown spatial backend: {other}")),
        }
    }
}
