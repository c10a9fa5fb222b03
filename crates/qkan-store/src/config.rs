//! Store configuration loaded from environment variables.
//!
//! All settings have defaults so a host can open projects with zero
//! configuration as long as the template sits in the platform data directory.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use qkan_shared::constants::{DEFAULT_SRID, SQL_LOG_WINDOW_SECS, TEMPLATE_FILE_NAME};

use crate::spatial::SpatialBackend;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Reference database copied when a project path does not exist yet.
    /// Env: `QKAN_TEMPLATE_PATH`
    /// Default: `<data dir>/templates/qkan.sqlite`, or
    /// `./templates/qkan.sqlite` when no data directory can be determined.
    pub template_path: PathBuf,

    /// EPSG code used when the project does not reveal its own.
    /// Env: `QKAN_EPSG`
    /// Default: `25832`
    pub srid: i64,

    /// Migrate outdated databases on connect instead of refusing them.
    /// Env: `QKAN_DB_UPDATE` (true/false)
    /// Default: `false`
    pub auto_update: bool,

    /// How geometry columns and spatial indexes are managed.
    /// Env: `QKAN_SPATIAL_BACKEND` (`spatialite` / `plain`)
    /// Default: `spatialite`
    pub spatial_backend: SpatialBackend,

    /// Name or path of the SpatiaLite loadable module.
    /// Env: `QKAN_SPATIALITE_MODULE`
    /// Default: `mod_spatialite`
    pub spatialite_module: String,

    /// Identical SQL log labels inside this window collapse into one line.
    /// Env: `QKAN_SQL_LOG_WINDOW_SECS`
    /// Default: `2`
    pub sql_log_window: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            srid: DEFAULT_SRID,
            auto_update: false,
            spatial_backend: SpatialBackend::SpatiaLite,
            spatialite_module: "mod_spatialite".to_string(),
            sql_log_window: Duration::from_secs(SQL_LOG_WINDOW_SECS),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("QKAN_TEMPLATE_PATH") {
            config.template_path = PathBuf::from(path);
        }

        if let Ok(val) = std::env::var("QKAN_EPSG") {
            match val.trim().parse::<i64>() {
                Ok(srid) if srid > 0 => config.srid = srid,
                _ => tracing::warn!(value = %val, "Invalid QKAN_EPSG, using default"),
            }
        }

        if let Ok(val) = std::env::var("QKAN_DB_UPDATE") {
            config.auto_update = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("QKAN_SPATIAL_BACKEND") {
            match val.parse::<SpatialBackend>() {
                Ok(backend) => config.spatial_backend = backend,
                Err(e) => tracing::warn!(error = %e, "Invalid QKAN_SPATIAL_BACKEND, using default"),
            }
        }

        if let Ok(module) = std::env::var("QKAN_SPATIALITE_MODULE") {
            if !module.is_empty() {
                config.spatialite_module = module;
            }
        }

        if let Ok(val) = std::env::var("QKAN_SQL_LOG_WINDOW_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) => config.sql_log_window = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %val, "Invalid QKAN_SQL_LOG_WINDOW_SECS, using default"),
            }
        }

        config
    }

    pub fn with_template(mut self, template_path: impl Into<PathBuf>) -> Self {
        self.template_path = template_path.into();
        self
    }

    pub fn with_backend(mut self, backend: SpatialBackend) -> Self {
        self.spatial_backend = backend;
        self
    }
}

fn default_template_path() -> PathBuf {
    ProjectDirs::from("de", "fh-aachen", "qkan")
        .map(|dirs| dirs.data_dir().join("templates"))
        .unwrap_or_else(|| PathBuf::from("templates"))
        .join(TEMPLATE_FILE_NAME)
}

fn parse_flag(val: &str) -> bool {
    !matches!(val.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off")
}
