//! Database handle ownership.
//!
//! [`SpatialConnection`] owns the [`rusqlite::Connection`] for one project
//! file and exposes a single labelled execution primitive. Statements that
//! produce rows have them buffered for [`SpatialConnection::fetch_one`] and
//! [`SpatialConnection::fetch_all`].
//!
//! A failing statement closes the handle on the spot. An open transaction is
//! rolled back by the close, and every later call returns
//! [`StoreError::Closed`]. Dropping the value closes it as well.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use qkan_shared::constants::{SRID_COLUMN, SRID_TABLE};
use qkan_shared::layer::validate_table_name;
use rusqlite::types::Value;
use rusqlite::{Connection, LoadExtensionGuard, OpenFlags};

use crate::config::StoreConfig;
use crate::error::{ConnectionError, Result, StoreError};
use crate::spatial::{SpatialBackend, SqlStatement, GEOMETRY_COLUMNS};
use crate::sql_log::SqlLog;

/// One buffered result row.
pub type Row = Vec<Value>;

/// How [`SpatialConnection::open`] obtained the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Existing,
    /// The file was materialised from the template.
    Created,
}

pub struct SpatialConnection {
    conn: Option<Connection>,
    path: PathBuf,
    backend: SpatialBackend,
    srid: i64,
    rows: VecDeque<Row>,
    log: SqlLog,
}

impl SpatialConnection {
    /// Open the project database at `path`, creating it from the configured
    /// template when the file does not exist.
    pub fn open(path: &Path, config: &StoreConfig) -> Result<(Self, OpenMode)> {
        if path.exists() {
            return Ok((Self::open_existing(path, config)?, OpenMode::Existing));
        }

        tracing::info!(
            path = %path.display(),
            template = %config.template_path.display(),
            "creating database from template"
        );
        std::fs::copy(&config.template_path, path).map_err(|source| ConnectionError::CannotCreate {
            path: path.to_path_buf(),
            template: config.template_path.clone(),
            source,
        })?;

        let mut conn = Self::connect(path, OpenFlags::SQLITE_OPEN_READ_WRITE, config)?;
        conn.ensure_spatial_metadata()?;
        Ok((conn, OpenMode::Created))
    }

    /// Open a database that must already exist.
    pub fn open_existing(path: &Path, config: &StoreConfig) -> Result<Self> {
        if !path.exists() {
            return Err(ConnectionError::Missing(path.to_path_buf()).into());
        }
        tracing::debug!(path = %path.display(), "opening existing database");
        Self::connect(path, OpenFlags::SQLITE_OPEN_READ_WRITE, config)
    }

    /// Create an empty database file at `path`. Spatial metadata is not
    /// initialised; see [`SpatialConnection::ensure_spatial_metadata`].
    pub fn create_new(path: &Path, config: &StoreConfig) -> Result<Self> {
        if path.exists() {
            return Err(ConnectionError::AlreadyExists(path.to_path_buf()).into());
        }
        Self::connect(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            config,
        )
    }

    /// Private in-memory database, mostly useful for tests.
    pub fn open_in_memory(config: &StoreConfig) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| ConnectionError::CannotOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::wrap(conn, PathBuf::from(":memory:"), config)
    }

    fn connect(path: &Path, flags: OpenFlags, config: &StoreConfig) -> Result<Self> {
        let conn = Connection::open_with_flags(path, flags | OpenFlags::SQLITE_OPEN_NO_MUTEX).map_err(
            |source| ConnectionError::CannotOpen {
                path: path.to_path_buf(),
                source,
            },
        )?;
        Self::wrap(conn, path.to_path_buf(), config)
    }

    fn wrap(conn: Connection, path: PathBuf, config: &StoreConfig) -> Result<Self> {
        if config.spatial_backend == SpatialBackend::SpatiaLite {
            load_spatialite(&conn, &config.spatialite_module)?;
        }

        Ok(Self {
            conn: Some(conn),
            path,
            backend: config.spatial_backend,
            srid: config.srid,
            rows: VecDeque::new(),
            log: SqlLog::new(config.sql_log_window),
        })
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Execute one statement. See [`SpatialConnection::execute_opts`].
    pub fn execute(&mut self, sql: &str, label: &str) -> Result<()> {
        self.execute_opts(sql, label, false)
    }

    /// Execute one statement, buffering any rows it yields.
    ///
    /// `label` names the statement in logs and errors. Identical labels are
    /// logged once per window unless `allow_repeat_log` is set.
    ///
    /// On failure the connection is closed before the error is returned.
    pub fn execute_opts(&mut self, sql: &str, label: &str, allow_repeat_log: bool) -> Result<()> {
        let conn = self.conn.as_ref().ok_or(StoreError::Closed)?;

        match run_statement(conn, sql) {
            Ok(rows) => {
                self.rows = rows;
                self.log.record(label, sql, allow_repeat_log);
                Ok(())
            }
            Err(source) => {
                tracing::error!(label, error = %source, sql, "SQL statement failed, closing connection");
                self.close();
                Err(StoreError::Sql {
                    label: label.to_string(),
                    sql: sql.to_string(),
                    source,
                })
            }
        }
    }

    /// Execute a rendered statement, verifying the result of spatial calls.
    pub fn execute_statement(&mut self, statement: &SqlStatement, label: &str) -> Result<()> {
        self.execute(&statement.sql, label)?;

        if let Some(function) = statement.expect_success {
            let succeeded = matches!(
                self.rows.front().and_then(|row| row.first()),
                Some(Value::Integer(1))
            );
            if !succeeded {
                tracing::error!(label, function, "spatial function reported failure, closing connection");
                self.close();
                return Err(StoreError::SpatialCall {
                    label: label.to_string(),
                    function,
                });
            }
        }
        Ok(())
    }

    /// Run `statements` as one transaction.
    ///
    /// Either every statement is committed or, on the first failure, the
    /// connection is closed and nothing of the group persists.
    pub fn run_group(&mut self, label: &str, statements: &[SqlStatement]) -> Result<()> {
        self.execute("BEGIN", label)?;
        for statement in statements {
            self.execute_statement(statement, label)?;
        }
        self.commit()
    }

    /// Next buffered row of the most recent statement.
    pub fn fetch_one(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// All remaining buffered rows of the most recent statement.
    pub fn fetch_all(&mut self) -> Vec<Row> {
        self.rows.drain(..).collect()
    }

    /// Commit the open transaction, if any.
    pub fn commit(&mut self) -> Result<()> {
        let in_transaction = !self.conn.as_ref().ok_or(StoreError::Closed)?.is_autocommit();
        if in_transaction {
            self.execute("COMMIT", "commit")?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Column names of `table`, empty if the table does not exist.
    pub fn attr_list(&mut self, table: &str) -> Result<Vec<String>> {
        validate_table_name(table).map_err(|_| StoreError::InvalidIdentifier(table.to_string()))?;

        self.execute(&format!("PRAGMA table_info(\"{table}\")"), &format!("attr_list {table}"))?;
        Ok(self
            .fetch_all()
            .into_iter()
            .filter_map(|row| match row.into_iter().nth(1) {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    pub fn table_exists(&mut self, table: &str) -> Result<bool> {
        validate_table_name(table).map_err(|_| StoreError::InvalidIdentifier(table.to_string()))?;

        self.execute(
            &format!("SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = '{table}'"),
            "table_exists",
        )?;
        Ok(matches!(
            self.fetch_one().and_then(|row| row.into_iter().next()),
            Some(Value::Integer(n)) if n > 0
        ))
    }

    /// Create the geometry registry if the database has none.
    pub fn ensure_spatial_metadata(&mut self) -> Result<()> {
        if self.table_exists(GEOMETRY_COLUMNS)? {
            return Ok(());
        }
        tracing::info!(backend = %self.backend, "initialising spatial metadata");
        for statement in self.backend.init_metadata() {
            self.execute_statement(&statement, "init spatial metadata")?;
        }
        Ok(())
    }

    /// Read the project SRID from the sewer-reach geometry column.
    ///
    /// The lookup is a probe: when it fails or finds nothing the configured
    /// default is kept and the connection stays open.
    pub fn detect_srid(&mut self) -> Option<i64> {
        let conn = self.conn.as_ref()?;
        let sql = self.backend.srid_query(SRID_TABLE, SRID_COLUMN);

        match conn.query_row(&sql, [], |row| row.get::<_, i64>(0)) {
            Ok(srid) => {
                tracing::debug!(srid, "detected project SRID");
                self.srid = srid;
                Some(srid)
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    fallback = self.srid,
                    "could not determine project SRID"
                );
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors / teardown
    // ------------------------------------------------------------------

    pub fn srid(&self) -> i64 {
        self.srid
    }

    pub fn backend(&self) -> SpatialBackend {
        self.backend
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Close the handle. Closing an already closed connection does nothing.
    pub fn close(&mut self) {
        self.rows.clear();
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => tracing::debug!(path = %self.path.display(), "database closed"),
                Err((_conn, e)) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "error while closing database")
                }
            }
        }
    }
}

impl Drop for SpatialConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn load_spatialite(conn: &Connection, module: &str) -> Result<()> {
    let extension_error = |source: rusqlite::Error| ConnectionError::Extension {
        module: module.to_string(),
        source,
    };

    // SAFETY: extension loading is enabled only for the duration of this
    // call and only the configured SpatiaLite module is loaded.
    unsafe {
        let _guard = LoadExtensionGuard::new(conn).map_err(extension_error)?;
        conn.load_extension(module, None).map_err(extension_error)?;
    }
    tracing::debug!(module, "spatial extension loaded");
    Ok(())
}

fn run_statement(conn: &Connection, sql: &str) -> rusqlite::Result<VecDeque<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    let mut buffered = VecDeque::new();

    if width == 0 {
        stmt.execute([])?;
        return Ok(buffered);
    }

    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Row>>()?;
        buffered.push_back(values);
    }
    Ok(buffered)
}
