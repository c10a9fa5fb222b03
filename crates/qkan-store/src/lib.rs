//! # qkan-store
//!
//! Spatial SQLite storage for QKan drainage projects.
//!
//! A project is one SQLite file with spatial metadata. Its schema version is
//! recorded in the `info` table, and [`migrations`] upgrades older projects
//! step by step to the version this build expects. Everything is synchronous
//! and a [`SpatialConnection`] is owned by exactly one caller.
//!
//! Hosts normally go through [`Database::connect`], which opens or creates
//! the project, checks its version and reports to a [`HostUi`].

pub mod config;
pub mod connection;
pub mod database;
pub mod host;
pub mod logging;
pub mod migrations;
pub mod schema;
pub mod spatial;
pub mod sql_log;
pub mod template;

mod error;

pub use config::StoreConfig;
pub use connection::{OpenMode, Row, SpatialConnection};
pub use database::{ConnectRequest, Database, DbStatus};
pub use error::{ConnectionError, Result, StoreError};
pub use host::{HostUi, LogHost, NoProgress, ProgressSink, Severity};
pub use migrations::{migrate, MigrationOutcome, Migrator};
pub use spatial::SpatialBackend;
