use crate::version::SchemaVersion;

/// Schema version this build of the application expects.
pub const CURRENT_VERSION: SchemaVersion = SchemaVersion::new(2, 5, 9);

/// Version assumed for databases whose `info` table carries no version row.
pub const LEGACY_VERSION: SchemaVersion = SchemaVersion::new(1, 9, 9);

/// Metadata table holding `(subject, value)` rows
pub const INFO_TABLE: &str = "info";

/// `info.subject` of the schema version row
pub const VERSION_SUBJECT: &str = "version";

/// EPSG code for new projects (ETRS89 / UTM zone 32N)
pub const DEFAULT_SRID: i64 = 25832;

/// Table and geometry column the project SRID is read from
pub const SRID_TABLE: &str = "haltungen";
pub const SRID_COLUMN: &str = "geom";

/// File name of the project template inside the template directory
pub const TEMPLATE_FILE_NAME: &str = "qkan.sqlite";

/// Window in seconds within which identical SQL log labels are coalesced
pub const SQL_LOG_WINDOW_SECS: u64 = 2;

/// Suffix of the shadow table used by table rebuilds
pub const SHADOW_SUFFIX: &str = "_t";
