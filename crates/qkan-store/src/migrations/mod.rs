//! Database migration runner.
//!
//! The schema version of a project lives in `info` under
//! `subject = 'version'`. A run applies every catalog step with
//! `stored < step.version <= target` in ascending order and writes the step's
//! version after each one, so an interrupted run resumes where it stopped.
//!
//! Steps that rebuild tables invalidate the host's open layers. The run still
//! completes, but [`MigrationOutcome::reload_required`] is set and the caller
//! has to reopen the project.

pub(crate) mod shapes;
pub mod step;

mod v2_0_2_einleit;
mod v2_1_2_link_names;
mod v2_2_0_einzugsgebiete;
mod v2_2_16_dynahal;
mod v2_2_1_abflusstyp;
mod v2_2_3_rebuild_links;
mod v2_4_9_check_views;
mod v2_5_2_aussengebiete;
mod v2_5_7_linkfl_runoff;
mod v2_5_8_rebuild_links;
mod v2_5_9_lookup_tables;

use chrono::{DateTime, Utc};
use qkan_shared::constants::{INFO_TABLE, LEGACY_VERSION, VERSION_SUBJECT};
use qkan_shared::SchemaVersion;
use rusqlite::types::Value;
use serde::Serialize;

use crate::connection::SpatialConnection;
use crate::error::{Result, StoreError};
use crate::host::ProgressSink;
use crate::spatial::SqlStatement;

pub use step::{Action, MigrationStep};

/// Every released schema step, oldest first.
pub static CATALOG: &[&MigrationStep] = &[
    &v2_0_2_einleit::STEP,
    &v2_1_2_link_names::STEP,
    &v2_2_0_einzugsgebiete::STEP,
    &v2_2_1_abflusstyp::STEP,
    &v2_2_1_abflusstyp::STEP_REPEAT,
    &v2_2_3_rebuild_links::STEP,
    &v2_2_16_dynahal::STEP,
    &v2_4_9_check_views::STEP,
    &v2_5_2_aussengebiete::STEP,
    &v2_5_7_linkfl_runoff::STEP,
    &v2_5_8_rebuild_links::STEP,
    &v2_5_9_lookup_tables::STEP,
];

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    /// Version the database had when the run started.
    pub from: SchemaVersion,
    /// Version stored when the run finished.
    pub applied_version: SchemaVersion,
    pub applied_steps: Vec<SchemaVersion>,
    /// A destructive step ran; the project has to be reopened.
    pub reload_required: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Migrator<'a> {
    steps: &'a [&'a MigrationStep],
}

impl Default for Migrator<'static> {
    fn default() -> Self {
        Self::new(CATALOG)
    }
}

impl<'a> Migrator<'a> {
    pub fn new(steps: &'a [&'a MigrationStep]) -> Self {
        Self { steps }
    }

    /// Steps a database at `stored` needs to reach `target`, in version order.
    pub fn pending(&self, stored: SchemaVersion, target: SchemaVersion) -> Vec<&'a MigrationStep> {
        let mut pending: Vec<&'a MigrationStep> = self
            .steps
            .iter()
            .copied()
            .filter(|step| stored < step.version && step.version <= target)
            .collect();
        pending.sort_by_key(|step| step.version);
        pending
    }

    /// Bring the database from `stored` to `target`.
    ///
    /// A `stored` version above `target` selects no steps; only `target` is
    /// written. Refusing newer databases is up to the caller, see
    /// [`crate::Database::update`].
    ///
    /// The first failing action aborts the run. Everything committed up to
    /// that point stays, including the version of the last finished step.
    pub fn run(
        &self,
        conn: &mut SpatialConnection,
        stored: SchemaVersion,
        target: SchemaVersion,
        progress: &dyn ProgressSink,
    ) -> Result<MigrationOutcome> {
        let started_at = Utc::now();
        let mut outcome = MigrationOutcome {
            from: stored,
            applied_version: stored,
            applied_steps: Vec::new(),
            reload_required: false,
            started_at,
            finished_at: started_at,
        };
        if stored == target {
            tracing::debug!(version = %stored, "database schema is current");
            return Ok(outcome);
        }

        tracing::info!(from = %stored, to = %target, "migrating database schema");

        for step in self.pending(stored, target) {
            tracing::info!(version = %step.version, description = step.description, "applying migration step");
            for action in step.actions {
                apply_action(conn, step.version, action, progress)?;
            }
            write_version(conn, step.version)?;

            outcome.applied_version = step.version;
            outcome.applied_steps.push(step.version);
            if step.is_destructive() {
                outcome.reload_required = true;
            }
        }

        write_version(conn, target)?;
        outcome.applied_version = target;
        outcome.finished_at = Utc::now();

        tracing::info!(
            version = %target,
            steps = outcome.applied_steps.len(),
            reload_required = outcome.reload_required,
            "database schema migrated"
        );
        Ok(outcome)
    }
}

/// Read the stored version and migrate to `target` with the built-in catalog.
pub fn migrate(
    conn: &mut SpatialConnection,
    target: SchemaVersion,
    progress: &dyn ProgressSink,
) -> Result<MigrationOutcome> {
    let stored = read_version(conn)?;
    Migrator::default().run(conn, stored, target, progress)
}

/// Stored schema version.
///
/// A database without a version row predates versioning; it gets
/// `1.9.9` written and that is returned.
pub fn read_version(conn: &mut SpatialConnection) -> Result<SchemaVersion> {
    conn.execute(
        &format!("SELECT value FROM {INFO_TABLE} WHERE subject = '{VERSION_SUBJECT}'"),
        "read version",
    )?;

    match conn.fetch_one().and_then(|row| row.into_iter().next()) {
        Some(Value::Text(stored)) => {
            let version = SchemaVersion::parse(&stored);
            tracing::debug!(stored = %stored, %version, "stored schema version");
            Ok(version)
        }
        Some(other) => {
            tracing::warn!(value = ?other, "version row holds no text, assuming legacy schema");
            Ok(LEGACY_VERSION)
        }
        None => {
            tracing::debug!(version = %LEGACY_VERSION, "no version row, recording legacy version");
            conn.execute(
                &format!(
                    "INSERT INTO {INFO_TABLE} (subject, value) VALUES ('{VERSION_SUBJECT}', '{LEGACY_VERSION}')"
                ),
                "insert legacy version",
            )
            .map_err(|e| StoreError::VersionRead(e.to_string()))?;
            Ok(LEGACY_VERSION)
        }
    }
}

/// Store `version` as the schema version and commit.
pub fn write_version(conn: &mut SpatialConnection, version: SchemaVersion) -> Result<()> {
    conn.run_group(
        "write version",
        &[
            SqlStatement::plain(format!(
                "INSERT INTO {INFO_TABLE} (subject, value)
                 SELECT '{VERSION_SUBJECT}', '{version}'
                 WHERE NOT EXISTS (SELECT 1 FROM {INFO_TABLE} WHERE subject = '{VERSION_SUBJECT}')"
            )),
            SqlStatement::plain(format!(
                "UPDATE {INFO_TABLE} SET value = '{version}' WHERE subject = '{VERSION_SUBJECT}'"
            )),
        ],
    )
}

/// Run one action of the step for `version`.
pub(crate) fn apply_action(
    conn: &mut SpatialConnection,
    version: SchemaVersion,
    action: &Action,
    progress: &dyn ProgressSink,
) -> Result<()> {
    let backend = conn.backend();
    let srid = conn.srid();

    match action {
        Action::Statements { label, sql } => {
            let statements: Vec<SqlStatement> = sql.iter().map(|s| SqlStatement::plain(*s)).collect();
            conn.run_group(label, &statements)
        }

        Action::CreateTable(def) => {
            if conn.table_exists(def.name)? {
                tracing::debug!(%version, table = def.name, "table exists, skipping");
                return Ok(());
            }
            conn.run_group(&format!("{version} create {}", def.name), &def.statements(backend, srid))
        }

        Action::AddColumns { table, probe, columns } => {
            let present = require_columns(conn, version, table)?;
            if present.iter().any(|c| c.eq_ignore_ascii_case(probe)) {
                tracing::debug!(%version, table, probe, "column present, skipping");
                return Ok(());
            }
            let statements: Vec<SqlStatement> = columns
                .iter()
                .map(|c| SqlStatement::plain(format!("ALTER TABLE {table} ADD COLUMN {c}")))
                .collect();
            conn.run_group(&format!("{version} add columns {table}"), &statements)
        }

        Action::Rebuild(rebuild) => {
            let present = require_columns(conn, version, rebuild.table)?;
            let (columns, missing) = rebuild.carried(&present);
            if !missing.is_empty() {
                tracing::warn!(%version, table = rebuild.table, ?missing, "columns absent, not carried over");
            }
            if columns.is_empty() {
                return Err(StoreError::MissingMetadata {
                    version,
                    table: rebuild.table.to_string(),
                });
            }
            conn.run_group(
                &format!("{version} rebuild {}", rebuild.table),
                &rebuild.statements(backend, srid, &columns),
            )
        }

        Action::Milestone(percent) => {
            progress.report(*percent);
            Ok(())
        }
    }
}

/// Column names of `table`; an empty list means the step cannot run.
fn require_columns(conn: &mut SpatialConnection, version: SchemaVersion, table: &str) -> Result<Vec<String>> {
    let columns = conn.attr_list(table)?;
    if columns.is_empty() {
        tracing::error!(%version, table, "no column metadata, aborting migration");
        return Err(StoreError::MissingMetadata {
            version,
            table: table.to_string(),
        });
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use qkan_shared::constants::CURRENT_VERSION;

    use super::step::{GeometryColumn, Rebuild, TableShape};
    use super::*;
    use crate::config::StoreConfig;
    use crate::connection::Row;
    use crate::host::NoProgress;
    use crate::schema::create_baseline;
    use crate::spatial::{GeometryKind, SpatialBackend};

    fn plain() -> StoreConfig {
        StoreConfig::default().with_backend(SpatialBackend::Plain)
    }

    fn v(s: &str) -> SchemaVersion {
        SchemaVersion::parse(s)
    }

    /// Baseline project with a few areas and one area link.
    fn legacy_project(conn: &mut SpatialConnection) {
        create_baseline(conn).unwrap();
        conn.execute(
            "INSERT INTO flaechen (pk, flnam, haltnam, he_typ, speicherzahl, fliesszeit, geom)
             VALUES (1, 'F1', 'H1', 0, 3, 5.0, X'0A01'), (2, 'F2', 'H2', 1, 2, 7.5, X'0A02')",
            "seed flaechen",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO linkfl (pk, flnam, haltnam, glink) VALUES (7, 'F1', 'H1', X'0B07')",
            "seed linkfl",
        )
        .unwrap();
    }

    fn schema(conn: &mut SpatialConnection) -> Vec<Row> {
        conn.execute(
            "SELECT type, name, sql FROM sqlite_master WHERE name NOT LIKE 'sqlite_%' ORDER BY type, name",
            "schema",
        )
        .unwrap();
        conn.fetch_all()
    }

    fn query(conn: &mut SpatialConnection, sql: &str) -> Vec<Row> {
        conn.execute(sql, "test query").unwrap();
        conn.fetch_all()
    }

    #[test]
    fn catalog_is_ascending_and_ends_at_current() {
        for pair in CATALOG.windows(2) {
            assert!(pair[0].version < pair[1].version, "{} before {}", pair[0].version, pair[1].version);
        }
        assert_eq!(CATALOG.last().unwrap().version, CURRENT_VERSION);
    }

    #[test]
    fn destructive_flag_matches_rebuilds() {
        for step in CATALOG {
            let rebuilds = step.actions.iter().any(|a| matches!(a, Action::Rebuild(_)));
            assert_eq!(step.destructive, rebuilds, "step {}", step.version);
        }
        let destructive: Vec<_> = CATALOG.iter().filter(|s| s.is_destructive()).map(|s| s.version).collect();
        assert_eq!(destructive, vec![v("2.2.3"), v("2.5.7"), v("2.5.8")]);
    }

    #[test]
    fn pending_selects_half_open_range() {
        let migrator = Migrator::default();
        let versions: Vec<_> = migrator
            .pending(v("2.2.3"), v("2.5.2"))
            .iter()
            .map(|s| s.version)
            .collect();
        assert_eq!(versions, vec![v("2.2.16"), v("2.4.9"), v("2.5.2")]);
        assert!(migrator.pending(v("2.5.9"), v("2.5.9")).is_empty());
    }

    #[test]
    fn legacy_to_2_2_3() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        legacy_project(&mut conn);

        let stored = read_version(&mut conn).unwrap();
        assert_eq!(stored, LEGACY_VERSION);

        let seen = RefCell::new(Vec::new());
        let sink = |p: u8| seen.borrow_mut().push(p);
        let outcome = Migrator::default().run(&mut conn, stored, v("2.2.3"), &sink).unwrap();

        assert_eq!(
            outcome.applied_steps,
            ["2.0.2", "2.1.2", "2.2.0", "2.2.1", "2.2.2", "2.2.3"].map(v)
        );
        assert_eq!(outcome.from, LEGACY_VERSION);
        assert_eq!(outcome.applied_version, v("2.2.3"));
        assert!(outcome.reload_required);
        assert_eq!(*seen.borrow(), vec![15, 30, 45, 60]);
        assert_eq!(read_version(&mut conn).unwrap(), v("2.2.3"));

        // Rebuilt tables keep their keys and geometry.
        let areas = query(&mut conn, "SELECT pk, flnam, abflusstyp, geom FROM flaechen ORDER BY pk");
        assert_eq!(
            areas,
            vec![
                vec![
                    Value::Integer(1),
                    Value::Text("F1".into()),
                    Value::Text("Direktabfluss".into()),
                    Value::Blob(vec![0x0A, 0x01]),
                ],
                vec![
                    Value::Integer(2),
                    Value::Text("F2".into()),
                    Value::Text("Fließzeiten".into()),
                    Value::Blob(vec![0x0A, 0x02]),
                ],
            ]
        );

        let links = query(&mut conn, "SELECT pk, glink FROM linkfl");
        assert_eq!(links, vec![vec![Value::Integer(7), Value::Blob(vec![0x0B, 0x07])]]);
        let columns = conn.attr_list("linkfl").unwrap();
        assert!(columns.contains(&"tezgnam".to_string()));
        assert!(columns.contains(&"teilgebiet".to_string()));

        assert!(!conn.table_exists("flaechen_t").unwrap());
        assert!(conn.table_exists("einzugsgebiete").unwrap());
    }

    #[test]
    fn legacy_to_current() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        legacy_project(&mut conn);

        let seen = RefCell::new(Vec::new());
        let sink = |p: u8| seen.borrow_mut().push(p);
        let outcome = migrate(&mut conn, CURRENT_VERSION, &sink).unwrap();

        assert_eq!(outcome.applied_steps.len(), CATALOG.len());
        assert!(outcome.reload_required);
        assert_eq!(*seen.borrow(), vec![15, 30, 45, 60, 75, 90, 100]);
        assert_eq!(read_version(&mut conn).unwrap(), CURRENT_VERSION);

        // Runoff parameters now live on the link.
        let link = query(
            &mut conn,
            "SELECT abflusstyp, speicherzahl, fliesszeitflaeche FROM linkfl WHERE pk = 7",
        );
        assert_eq!(
            link,
            vec![vec![Value::Text("Direktabfluss".into()), Value::Integer(3), Value::Real(5.0)]]
        );
        assert!(!conn.attr_list("flaechen").unwrap().contains(&"he_typ".to_string()));

        let codes = query(&mut conn, "SELECT kp_nr FROM entwaesserungsarten WHERE bezeichnung = 'Regenwasser'");
        assert_eq!(codes, vec![vec![Value::Integer(2)]]);

        let lookups = query(&mut conn, "SELECT count(*) FROM knotentypen");
        assert_eq!(lookups, vec![vec![Value::Integer(8)]]);

        // F2 has no link.
        let unlinked = query(&mut conn, "SELECT flaech_nam FROM v_flaechen_ohne_linkfl WHERE pk > 0");
        assert_eq!(unlinked, vec![vec![Value::Text("F2".into())]]);
    }

    #[test]
    fn additive_steps_do_not_require_reload() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        legacy_project(&mut conn);

        let outcome = Migrator::default()
            .run(&mut conn, LEGACY_VERSION, v("2.2.2"), &NoProgress)
            .unwrap();
        assert_eq!(outcome.applied_steps.len(), 5);
        assert!(!outcome.reload_required);
        assert!(conn.attr_list("flaechen").unwrap().contains(&"abflusstyp".to_string()));
    }

    #[test]
    fn equal_versions_touch_nothing() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        create_baseline(&mut conn).unwrap();

        let outcome = Migrator::default()
            .run(&mut conn, LEGACY_VERSION, LEGACY_VERSION, &NoProgress)
            .unwrap();
        assert!(outcome.applied_steps.is_empty());
        assert!(!outcome.reload_required);
        assert_eq!(query(&mut conn, "SELECT count(*) FROM info"), vec![vec![Value::Integer(0)]]);
    }

    #[test]
    fn newer_stored_version_applies_nothing_and_writes_target() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        create_baseline(&mut conn).unwrap();
        let before = schema(&mut conn);

        let outcome = Migrator::default()
            .run(&mut conn, v("2.6.0"), CURRENT_VERSION, &NoProgress)
            .unwrap();
        assert!(outcome.applied_steps.is_empty());
        assert!(!outcome.reload_required);
        assert_eq!(outcome.from, v("2.6.0"));
        assert_eq!(outcome.applied_version, CURRENT_VERSION);
        assert!(conn.is_open());
        assert_eq!(read_version(&mut conn).unwrap(), CURRENT_VERSION);
        assert_eq!(schema(&mut conn), before);
    }

    #[test]
    fn additive_steps_are_idempotent() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        legacy_project(&mut conn);

        Migrator::default()
            .run(&mut conn, LEGACY_VERSION, v("2.2.2"), &NoProgress)
            .unwrap();
        let first = schema(&mut conn);

        // Pretend the version row was lost and run the same range again.
        write_version(&mut conn, LEGACY_VERSION).unwrap();
        Migrator::default()
            .run(&mut conn, LEGACY_VERSION, v("2.2.2"), &NoProgress)
            .unwrap();
        assert_eq!(schema(&mut conn), first);
    }

    #[test]
    fn split_run_matches_single_run() {
        let mut split = SpatialConnection::open_in_memory(&plain()).unwrap();
        create_baseline(&mut split).unwrap();
        migrate(&mut split, v("2.2.0"), &NoProgress).unwrap();
        assert_eq!(read_version(&mut split).unwrap(), v("2.2.0"));
        let outcome = migrate(&mut split, CURRENT_VERSION, &NoProgress).unwrap();
        assert_eq!(outcome.from, v("2.2.0"));

        let mut single = SpatialConnection::open_in_memory(&plain()).unwrap();
        create_baseline(&mut single).unwrap();
        migrate(&mut single, CURRENT_VERSION, &NoProgress).unwrap();

        assert_eq!(schema(&mut split), schema(&mut single));
    }

    static CREATE_A: MigrationStep = MigrationStep {
        version: SchemaVersion::new(1, 0, 1),
        description: "create a",
        destructive: false,
        actions: &[Action::Statements {
            label: "create a",
            sql: &["CREATE TABLE a (x INTEGER)"],
        }],
    };

    static BROKEN: MigrationStep = MigrationStep {
        version: SchemaVersion::new(1, 0, 2),
        description: "broken",
        destructive: false,
        actions: &[Action::Statements {
            label: "broken",
            sql: &["CREATE TABLE b (y INTEGER)", "INSERT INTO nowhere VALUES (1)"],
        }],
    };

    static FIXED: MigrationStep = MigrationStep {
        version: SchemaVersion::new(1, 0, 2),
        description: "fixed",
        destructive: false,
        actions: &[Action::Statements {
            label: "fixed",
            sql: &["CREATE TABLE b (y INTEGER)"],
        }],
    };

    #[test]
    fn interrupted_run_resumes_from_last_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.sqlite");
        {
            let mut conn = SpatialConnection::create_new(&path, &plain()).unwrap();
            conn.execute("CREATE TABLE info (subject TEXT, value TEXT)", "info").unwrap();
            write_version(&mut conn, v("1.0.0")).unwrap();

            let steps = [&CREATE_A, &BROKEN];
            let err = Migrator::new(&steps)
                .run(&mut conn, v("1.0.0"), v("1.0.2"), &NoProgress)
                .unwrap_err();
            assert!(matches!(err, StoreError::Sql { .. }));
            assert!(!conn.is_open());
        }

        let mut conn = SpatialConnection::open_existing(&path, &plain()).unwrap();
        let stored = read_version(&mut conn).unwrap();
        assert_eq!(stored, v("1.0.1"));
        assert!(conn.table_exists("a").unwrap());
        assert!(!conn.table_exists("b").unwrap());

        let steps = [&CREATE_A, &FIXED];
        let outcome = Migrator::new(&steps)
            .run(&mut conn, stored, v("1.0.2"), &NoProgress)
            .unwrap();
        assert_eq!(outcome.applied_steps, vec![v("1.0.2")]);
        assert!(conn.table_exists("b").unwrap());
    }

    const GEOM: &[GeometryColumn] = &[GeometryColumn::new("geom", GeometryKind::Polygon)];

    static RESHAPE: MigrationStep = MigrationStep {
        version: SchemaVersion::new(1, 0, 1),
        description: "drop c, add d",
        destructive: true,
        actions: &[Action::Rebuild(Rebuild {
            table: "probe",
            shadow: TableShape {
                columns: "pk INTEGER PRIMARY KEY, b TEXT",
                geometry: GEOM,
            },
            target: TableShape {
                columns: "pk INTEGER PRIMARY KEY, b TEXT, d TEXT",
                geometry: GEOM,
            },
            carry: &["pk", "b", "geom"],
            spatial_index: None,
        })],
    };

    #[test]
    fn rebuild_keeps_rows_and_keys() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        conn.ensure_spatial_metadata().unwrap();
        conn.execute("CREATE TABLE info (subject TEXT, value TEXT)", "info").unwrap();
        conn.execute("CREATE TABLE probe (pk INTEGER PRIMARY KEY, b TEXT, c TEXT)", "probe").unwrap();
        for s in conn.backend().add_geometry_column("probe", "geom", GeometryKind::Polygon, 25832) {
            conn.execute_statement(&s, "probe geom").unwrap();
        }
        conn.execute(
            "INSERT INTO probe (pk, b, c, geom) VALUES (1, 'A', 'x', X'01'), (2, 'B', 'y', X'02')",
            "probe rows",
        )
        .unwrap();

        let steps = [&RESHAPE];
        let outcome = Migrator::new(&steps)
            .run(&mut conn, v("1.0.0"), v("1.0.1"), &NoProgress)
            .unwrap();
        assert!(outcome.reload_required);

        assert_eq!(conn.attr_list("probe").unwrap(), vec!["pk", "b", "d", "geom"]);
        assert_eq!(
            query(&mut conn, "SELECT pk, b, d, geom FROM probe ORDER BY pk"),
            vec![
                vec![Value::Integer(1), Value::Text("A".into()), Value::Null, Value::Blob(vec![1])],
                vec![Value::Integer(2), Value::Text("B".into()), Value::Null, Value::Blob(vec![2])],
            ]
        );
        assert!(!conn.table_exists("probe_t").unwrap());
        assert_eq!(
            query(&mut conn, "SELECT f_table_name FROM geometry_columns"),
            vec![vec![Value::Text("probe".into())]]
        );
    }

    #[test]
    fn rebuild_leaves_columns_the_old_table_lacked_empty() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        create_baseline(&mut conn).unwrap();
        // linksw as created by releases before 2.0.2: no teilgebiet, no buffers.
        conn.execute("CREATE TABLE linksw (pk INTEGER PRIMARY KEY, haltnam TEXT)", "old linksw")
            .unwrap();
        for s in conn.backend().add_geometry_column("linksw", "geom", GeometryKind::Polygon, 25832) {
            conn.execute_statement(&s, "old linksw geom").unwrap();
        }
        conn.execute("INSERT INTO linksw (pk, haltnam, geom) VALUES (1, 'H1', X'0C01')", "linksw row")
            .unwrap();

        migrate(&mut conn, CURRENT_VERSION, &NoProgress).unwrap();

        assert_eq!(
            query(&mut conn, "SELECT pk, elnam, haltnam, teilgebiet, geom, gbuf FROM linksw"),
            vec![vec![
                Value::Integer(1),
                Value::Null,
                Value::Text("H1".into()),
                Value::Null,
                Value::Blob(vec![0x0C, 0x01]),
                Value::Null,
            ]]
        );
    }

    #[test]
    fn missing_table_fails_precondition() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        conn.execute("CREATE TABLE info (subject TEXT, value TEXT)", "info").unwrap();

        let err = Migrator::default()
            .run(&mut conn, v("2.0.2"), v("2.1.2"), &NoProgress)
            .unwrap_err();
        match err {
            StoreError::MissingMetadata { version, table } => {
                assert_eq!(version, v("2.1.2"));
                assert_eq!(table, "linksw");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(query(&mut conn, "SELECT count(*) FROM info"), vec![vec![Value::Integer(0)]]);
    }

    #[test]
    fn read_version_records_legacy_default() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        conn.execute("CREATE TABLE info (subject TEXT, value TEXT)", "info").unwrap();

        assert_eq!(read_version(&mut conn).unwrap(), LEGACY_VERSION);
        assert_eq!(
            query(&mut conn, "SELECT value FROM info WHERE subject = 'version'"),
            vec![vec![Value::Text("1.9.9".into())]]
        );

        write_version(&mut conn, v("2.2c")).unwrap();
        assert_eq!(read_version(&mut conn).unwrap(), v("2.2.0"));
        assert_eq!(query(&mut conn, "SELECT count(*) FROM info"), vec![vec![Value::Integer(1)]]);
    }

    #[test]
    fn failed_legacy_insert_is_version_read_error() {
        let mut conn = SpatialConnection::open_in_memory(&plain()).unwrap();
        conn.execute("CREATE TABLE info (subject TEXT, value TEXT, owner TEXT NOT NULL)", "info")
            .unwrap();

        let err = read_version(&mut conn).unwrap_err();
        assert!(matches!(err, StoreError::VersionRead(_)));
    }
}
