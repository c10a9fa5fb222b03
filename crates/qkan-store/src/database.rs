//! Project database handle for the host application.
//!
//! [`Database::connect`] turns a connection request into an open
//! [`SpatialConnection`] and enforces the version policy:
//!
//! - a missing project file is created from the template;
//! - an outdated project is migrated when `auto_update` is set, otherwise it
//!   is refused;
//! - a project written by a newer release is always refused;
//! - a migration that rebuilt tables closes the connection again and asks
//!   the host to reload the project.
//!
//! Layer connections only read and write data of one table and skip the
//! version check.

use std::path::PathBuf;

use qkan_shared::constants::CURRENT_VERSION;
use qkan_shared::{LayerSource, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::connection::SpatialConnection;
use crate::error::{ConnectionError, Result, StoreError};
use crate::host::{HostProgress, HostUi, Severity};
use crate::migrations::{self, MigrationOutcome, Migrator};

/// What to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectRequest {
    /// Project database file.
    Path(PathBuf),
    /// Source string of a map layer stored in a project database.
    Layer(String),
}

/// Connection state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStatus {
    pub connected: bool,
    pub is_current_version: bool,
    pub reload_required: bool,
}

impl Default for DbStatus {
    fn default() -> Self {
        Self {
            connected: true,
            is_current_version: true,
            reload_required: false,
        }
    }
}

pub struct Database {
    conn: SpatialConnection,
    status: DbStatus,
    stored_version: Option<SchemaVersion>,
    table_name: Option<String>,
}

impl Database {
    /// Open the requested database.
    ///
    /// Errors are shown to the host as critical messages before they are
    /// returned. A refused or reload-pending project is not an error: it
    /// comes back with `connected == false` in [`Database::status`].
    pub fn connect(request: ConnectRequest, config: &StoreConfig, host: &dyn HostUi) -> Result<Self> {
        let result = match request {
            ConnectRequest::Path(path) => Self::connect_path(path, config, host),
            ConnectRequest::Layer(source) => Self::connect_layer(&source, config),
        };

        result.map_err(|e| {
            host.message(Severity::Critical, "Database error", &e.to_string());
            e
        })
    }

    fn connect_path(path: PathBuf, config: &StoreConfig, host: &dyn HostUi) -> Result<Self> {
        if !path.exists() {
            host.message(
                Severity::Info,
                "Information",
                "Creating the project database from the template. Please wait...",
            );
            let (mut conn, _) = SpatialConnection::open(&path, config)?;
            conn.detect_srid();

            let mut db = Self::new(conn, None);
            db.check_version()?;
            host.message(Severity::Info, "Information", "Project database created.");
            return Ok(db);
        }

        let mut conn = SpatialConnection::open_existing(&path, config)?;
        conn.detect_srid();
        tracing::debug!(path = %path.display(), srid = conn.srid(), "connected to project database");

        let mut db = Self::new(conn, None);
        if db.check_version()? {
            return Ok(db);
        }
        if let Some(stored) = db.stored_version {
            refuse_newer(stored)?;
        }

        if config.auto_update {
            tracing::debug!("database outdated, updating");
            db.update(host)?;
        } else {
            let stored = db.stored_version.unwrap_or_default();
            host.message(
                Severity::Critical,
                "Project must be updated",
                &format!(
                    "The database version {stored} does not match the current version {CURRENT_VERSION} \
                     and has to be updated."
                ),
            );
            db.close();
        }
        Ok(db)
    }

    fn connect_layer(source: &str, config: &StoreConfig) -> Result<Self> {
        let layer = LayerSource::parse(source).map_err(ConnectionError::InvalidLayer)?;

        let mut conn = SpatialConnection::open_existing(&layer.database, config)?;
        conn.detect_srid();
        tracing::debug!(database = %layer.database.display(), table = %layer.table, "connected to layer table");

        Ok(Self::new(conn, Some(layer.table)))
    }

    fn new(conn: SpatialConnection, table_name: Option<String>) -> Self {
        Self {
            conn,
            status: DbStatus::default(),
            stored_version: None,
            table_name,
        }
    }

    /// Compare the stored version with the current one.
    pub fn check_version(&mut self) -> Result<bool> {
        let stored = migrations::read_version(&mut self.conn)?;
        let current = stored == CURRENT_VERSION;
        tracing::debug!(%stored, current = %CURRENT_VERSION, is_current = current, "checked database version");

        self.stored_version = Some(stored);
        self.status.is_current_version = current;
        Ok(current)
    }

    /// Migrate to the current version, reporting progress to `host`.
    ///
    /// When a step rebuilt tables the host is asked to reload the project
    /// and this handle is closed. A project newer than this release is left
    /// untouched and [`StoreError::SchemaTooNew`] is returned.
    pub fn update(&mut self, host: &dyn HostUi) -> Result<MigrationOutcome> {
        let stored = migrations::read_version(&mut self.conn)?;
        refuse_newer(stored)?;
        let outcome = match Migrator::default().run(&mut self.conn, stored, CURRENT_VERSION, &HostProgress(host)) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.status.connected = self.conn.is_open();
                return Err(e);
            }
        };

        self.stored_version = Some(outcome.applied_version);
        self.status.is_current_version = true;

        if outcome.reload_required {
            host.prompt_reload("Attention! The database was changed. Please save the project and reload it.");
            self.status.reload_required = true;
            self.close();
        }
        Ok(outcome)
    }

    pub fn status(&self) -> DbStatus {
        self.status
    }

    /// Version read by the last [`Database::check_version`] or update.
    pub fn stored_version(&self) -> Option<SchemaVersion> {
        self.stored_version
    }

    /// Table of a layer connection.
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn conn(&self) -> &SpatialConnection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut SpatialConnection {
        &mut self.conn
    }

    pub fn close(&mut self) {
        self.conn.close();
        self.status.connected = false;
    }
}

fn refuse_newer(stored: SchemaVersion) -> Result<()> {
    if CURRENT_VERSION.is_older(&stored) {
        tracing::error!(%stored, current = %CURRENT_VERSION, "database written by a newer release");
        return Err(StoreError::SchemaTooNew {
            stored,
            target: CURRENT_VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use super::*;
    use crate::spatial::SpatialBackend;
    use crate::template::{create_template, create_template_at};

    #[derive(Default)]
    struct RecordingHost {
        messages: RefCell<Vec<(Severity, String)>>,
        progress: RefCell<Vec<u8>>,
        reloads: RefCell<u32>,
    }

    impl HostUi for RecordingHost {
        fn message(&self, severity: Severity, title: &str, _text: &str) {
            self.messages.borrow_mut().push((severity, title.to_string()));
        }

        fn progress(&self, percent: u8) {
            self.progress.borrow_mut().push(percent);
        }

        fn prompt_reload(&self, _text: &str) {
            *self.reloads.borrow_mut() += 1;
        }
    }

    impl RecordingHost {
        fn saw(&self, severity: Severity) -> bool {
            self.messages.borrow().iter().any(|(s, _)| *s == severity)
        }
    }

    fn plain() -> StoreConfig {
        StoreConfig::default().with_backend(SpatialBackend::Plain)
    }

    fn outdated_project(dir: &Path) -> PathBuf {
        let path = dir.join("alt.sqlite");
        create_template_at(&path, &plain(), SchemaVersion::new(2, 2, 0)).unwrap();
        path
    }

    #[test]
    fn missing_project_is_created_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("qkan.sqlite");
        create_template(&template, &plain()).unwrap();

        let host = RecordingHost::default();
        let config = plain().with_template(&template);
        let db = Database::connect(ConnectRequest::Path(dir.path().join("neu.sqlite")), &config, &host).unwrap();

        assert_eq!(db.stored_version(), Some(CURRENT_VERSION));
        assert_eq!(
            db.status(),
            DbStatus {
                connected: true,
                is_current_version: true,
                reload_required: false,
            }
        );
        assert!(host.saw(Severity::Info));
        assert!(host.progress.borrow().is_empty());
    }

    #[test]
    fn missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let host = RecordingHost::default();
        let config = plain().with_template(dir.path().join("nowhere.sqlite"));

        let err = Database::connect(ConnectRequest::Path(dir.path().join("neu.sqlite")), &config, &host)
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Connection(ConnectionError::CannotCreate { .. })));
        assert!(host.saw(Severity::Critical));
    }

    #[test]
    fn outdated_project_is_refused_without_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = outdated_project(dir.path());
        let host = RecordingHost::default();

        let db = Database::connect(ConnectRequest::Path(path), &plain(), &host).unwrap();
        assert_eq!(db.stored_version(), Some(SchemaVersion::new(2, 2, 0)));
        assert!(!db.status().connected);
        assert!(!db.status().is_current_version);
        assert!(!db.conn().is_open());
        assert!(host.saw(Severity::Critical));
    }

    #[test]
    fn outdated_project_is_updated_and_reload_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = outdated_project(dir.path());
        let host = RecordingHost::default();
        let mut config = plain();
        config.auto_update = true;

        let db = Database::connect(ConnectRequest::Path(path.clone()), &config, &host).unwrap();
        assert_eq!(
            db.status(),
            DbStatus {
                connected: false,
                is_current_version: true,
                reload_required: true,
            }
        );
        assert_eq!(*host.reloads.borrow(), 1);
        assert_eq!(*host.progress.borrow(), vec![15, 30, 45, 60, 75, 90, 100]);

        // Reopening finds the current schema.
        let db = Database::connect(ConnectRequest::Path(path), &config, &host).unwrap();
        assert!(db.status().connected);
        assert!(db.status().is_current_version);
        assert_eq!(*host.reloads.borrow(), 1);
    }

    #[test]
    fn newer_project_is_refused_even_with_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuer.sqlite");
        create_template(&path, &plain()).unwrap();
        {
            let mut conn = SpatialConnection::open_existing(&path, &plain()).unwrap();
            migrations::write_version(&mut conn, SchemaVersion::new(2, 6, 0)).unwrap();
        }

        let host = RecordingHost::default();
        let mut config = plain();
        config.auto_update = true;
        let err = Database::connect(ConnectRequest::Path(path.clone()), &config, &host)
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::SchemaTooNew { .. }));
        assert!(host.saw(Severity::Critical));
        assert!(host.progress.borrow().is_empty());

        let mut conn = SpatialConnection::open_existing(&path, &plain()).unwrap();
        assert_eq!(migrations::read_version(&mut conn).unwrap(), SchemaVersion::new(2, 6, 0));
    }

    #[test]
    fn layer_connection_names_its_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = outdated_project(dir.path());
        let host = RecordingHost::default();

        let source = format!("dbname='{}' table=\"flaechen\" (geom) sql=", path.display());
        let db = Database::connect(ConnectRequest::Layer(source), &plain(), &host).unwrap();

        assert_eq!(db.table_name(), Some("flaechen"));
        assert!(db.status().connected);
        assert_eq!(db.stored_version(), None);
        assert!(host.messages.borrow().is_empty());
    }

    #[test]
    fn unsafe_layer_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = outdated_project(dir.path());
        let host = RecordingHost::default();

        let source = format!("dbname='{}' table=\"flaechen; DROP TABLE info\" (geom) sql=", path.display());
        let err = Database::connect(ConnectRequest::Layer(source), &plain(), &host).err().unwrap();

        assert!(matches!(err, StoreError::Connection(ConnectionError::InvalidLayer(_))));
        assert!(host.saw(Severity::Critical));
    }

    #[test]
    fn status_serializes_for_the_host() {
        let status = DbStatus {
            connected: false,
            is_current_version: true,
            reload_required: true,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"connected":false,"is_current_version":true,"reload_required":true}"#);
    }
}
