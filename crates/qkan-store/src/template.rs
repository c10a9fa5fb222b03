//! Project template generation.
//!
//! New projects are copies of a template database. The template is the
//! baseline schema run through the migration catalog, so its version row
//! always matches the schema it contains.

use std::path::Path;

use qkan_shared::constants::CURRENT_VERSION;
use qkan_shared::SchemaVersion;

use crate::config::StoreConfig;
use crate::connection::SpatialConnection;
use crate::error::Result;
use crate::host::NoProgress;
use crate::migrations;
use crate::schema::create_baseline;

/// Create a template for the current schema at `path`.
pub fn create_template(path: &Path, config: &StoreConfig) -> Result<SchemaVersion> {
    create_template_at(path, config, CURRENT_VERSION)
}

/// Create a template whose schema stops at `version`.
///
/// `path` must not exist. A template that fails halfway is deleted again.
pub fn create_template_at(path: &Path, config: &StoreConfig, version: SchemaVersion) -> Result<SchemaVersion> {
    let conn = SpatialConnection::create_new(path, config)?;
    tracing::info!(path = %path.display(), %version, "creating project template");

    match build(conn, version) {
        Ok(version) => Ok(version),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "template creation failed, removing file");
            if let Err(rm) = std::fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %rm, "could not remove incomplete template");
            }
            Err(e)
        }
    }
}

fn build(mut conn: SpatialConnection, version: SchemaVersion) -> Result<SchemaVersion> {
    conn.ensure_spatial_metadata()?;
    create_baseline(&mut conn)?;
    let outcome = migrations::migrate(&mut conn, version, &NoProgress)?;
    conn.close();
    Ok(outcome.applied_version)
}
