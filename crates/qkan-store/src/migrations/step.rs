//! Declarative migration steps.
//!
//! A [`MigrationStep`] is plain data: the version it upgrades to and the
//! [`Action`]s that get there. Actions are turned into SQL for the active
//! [`SpatialBackend`] only when they run, because geometry handling differs
//! between backends and the SRID is a property of the opened project.

use qkan_shared::constants::SHADOW_SUFFIX;
use qkan_shared::SchemaVersion;

use crate::spatial::{GeometryKind, SpatialBackend, SqlStatement};

#[derive(Debug)]
pub struct MigrationStep {
    /// Databases older than this version receive the step.
    pub version: SchemaVersion,
    pub description: &'static str,
    /// Set for steps that drop or reshape tables. Running one means the host
    /// has to reload the project.
    pub destructive: bool,
    pub actions: &'static [Action],
}

impl MigrationStep {
    pub fn is_destructive(&self) -> bool {
        self.destructive
    }
}

#[derive(Debug)]
pub enum Action {
    /// Statements executed as one transaction.
    Statements {
        label: &'static str,
        sql: &'static [&'static str],
    },

    /// Create a table unless it already exists.
    CreateTable(TableDef),

    /// Add `columns` (full column definitions) to `table` unless `probe` is
    /// already one of its columns.
    AddColumns {
        table: &'static str,
        probe: &'static str,
        columns: &'static [&'static str],
    },

    /// Reshape a table through a shadow copy.
    Rebuild(Rebuild),

    /// Report a progress percentage.
    Milestone(u8),
}

#[derive(Debug, Clone, Copy)]
pub struct GeometryColumn {
    pub name: &'static str,
    pub kind: GeometryKind,
}

impl GeometryColumn {
    pub const fn new(name: &'static str, kind: GeometryKind) -> Self {
        Self { name, kind }
    }
}

/// Column definitions of a table plus its geometry columns, which are added
/// through the spatial backend after `CREATE TABLE`.
#[derive(Debug, Clone, Copy)]
pub struct TableShape {
    /// Body of the `CREATE TABLE` statement.
    pub columns: &'static str,
    pub geometry: &'static [GeometryColumn],
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub shape: TableShape,
    pub spatial_index: Option<&'static str>,
    /// Statement filling the new table with its initial rows.
    pub seed: Option<&'static str>,
}

impl TableDef {
    pub fn statements(&self, backend: SpatialBackend, srid: i64) -> Vec<SqlStatement> {
        let mut out = create_table(self.name, &self.shape, backend, srid, "CREATE TABLE IF NOT EXISTS");
        if let Some(column) = self.spatial_index {
            out.extend(backend.create_spatial_index(self.name, column));
        }
        if let Some(seed) = self.seed {
            out.push(SqlStatement::plain(seed));
        }
        out
    }
}

/// Shadow-copy rebuild of `table`.
///
/// SpatiaLite cannot alter registered geometry columns in place, so the table
/// is copied into `<table>_t`, dropped, recreated in its new shape and filled
/// back. Both copies name every carried column explicitly; no statement
/// relies on column order.
///
/// `shadow` must hold every geometry column of the old table. Those are the
/// columns whose registration is discarded before the old table is dropped.
#[derive(Debug)]
pub struct Rebuild {
    pub table: &'static str,
    pub shadow: TableShape,
    pub target: TableShape,
    /// Columns copied old → shadow → new. Include the primary key. Columns
    /// the old table does not have are left to their defaults.
    pub carry: &'static [&'static str],
    pub spatial_index: Option<&'static str>,
}

impl Rebuild {
    pub fn shadow_name(&self) -> String {
        format!("{}{SHADOW_SUFFIX}", self.table)
    }

    /// Split `carry` into the columns `present` in the old table and those
    /// it lacks. Matching is case-insensitive.
    pub fn carried(&self, present: &[String]) -> (Vec<&'static str>, Vec<&'static str>) {
        self.carry
            .iter()
            .copied()
            .partition(|c| present.iter().any(|p| p.eq_ignore_ascii_case(c)))
    }

    /// Rebuild statements copying only `columns`.
    ///
    /// Identifiers are bracket-quoted: unlike a double-quoted name, an
    /// unknown `[name]` is an error and never read as a string literal.
    pub fn statements(&self, backend: SpatialBackend, srid: i64, columns: &[&str]) -> Vec<SqlStatement> {
        let table = self.table;
        let shadow = self.shadow_name();
        let columns = columns.iter().map(|c| format!("[{c}]")).collect::<Vec<_>>().join(", ");

        let mut out = create_table(&shadow, &self.shadow, backend, srid, "CREATE TABLE IF NOT EXISTS");
        out.push(SqlStatement::plain(format!("DELETE FROM {shadow}")));
        out.push(copy_rows(table, &shadow, &columns));

        for geometry in self.shadow.geometry {
            out.extend(backend.discard_geometry_column(table, geometry.name));
        }
        out.push(SqlStatement::plain(format!("DROP TABLE {table}")));

        out.extend(create_table(table, &self.target, backend, srid, "CREATE TABLE"));
        if let Some(column) = self.spatial_index {
            out.extend(backend.create_spatial_index(table, column));
        }
        out.push(copy_rows(&shadow, table, &columns));

        for geometry in self.shadow.geometry {
            out.extend(backend.discard_geometry_column(&shadow, geometry.name));
        }
        out.push(SqlStatement::plain(format!("DROP TABLE {shadow}")));
        out
    }
}

fn create_table(
    name: &str,
    shape: &TableShape,
    backend: SpatialBackend,
    srid: i64,
    create: &str,
) -> Vec<SqlStatement> {
    let mut out = vec![SqlStatement::plain(format!("{create} {name} ({})", shape.columns))];
    for geometry in shape.geometry {
        out.extend(backend.add_geometry_column(name, geometry.name, geometry.kind, srid));
    }
    out
}

fn copy_rows(from: &str, to: &str, columns: &str) -> SqlStatement {
    SqlStatement::plain(format!("INSERT INTO {to} ({columns}) SELECT {columns} FROM {from}"))
}
