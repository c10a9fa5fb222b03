use std::path::PathBuf;

use qkan_shared::{LayerError, SchemaVersion};
use thiserror::Error;

/// Failures while producing a usable database handle.
///
/// The connection is never opened when one of these is returned.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The file to open does not exist and no template fallback applies.
    #[error("Database file does not exist: {}", .0.display())]
    Missing(PathBuf),

    /// A fresh database was requested at a path that is already taken.
    #[error("Database file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Copying the template to the new project path failed.
    #[error("Could not copy template {} to {}: {source}", .template.display(), .path.display())]
    CannotCreate {
        path: PathBuf,
        template: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// SQLite refused to open the file.
    #[error("Could not open database {}: {source}", .path.display())]
    CannotOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The spatial extension could not be loaded.
    #[error("Could not load spatial extension {module}: {source}")]
    Extension {
        module: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The layer source string was malformed or named an unsafe table.
    #[error("Invalid layer source: {0}")]
    InvalidLayer(#[from] LayerError),
}

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A statement failed. The connection has been closed.
    #[error("SQL error in {label}: {source}")]
    Sql {
        label: String,
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A spatial SQL function ran but reported failure. The connection has
    /// been closed.
    #[error("Spatial function {function} failed in {label}")]
    SpatialCall {
        label: String,
        function: &'static str,
    },

    /// The version row was missing and could not be created.
    #[error("Could not read schema version: {0}")]
    VersionRead(String),

    /// A migration precondition query returned no data.
    #[error("Migration {version}: no column metadata for table {table}")]
    MissingMetadata {
        version: SchemaVersion,
        table: String,
    },

    /// The database was written by a newer release.
    #[error("Database schema {stored} is newer than supported schema {target}")]
    SchemaTooNew {
        stored: SchemaVersion,
        target: SchemaVersion,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The connection was closed, either explicitly or after a failure.
    #[error("Database connection is closed")]
    Closed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
