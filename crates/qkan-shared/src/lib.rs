//! # qkan-shared
//!
//! Types shared by every QKan crate: the schema version and its ordering,
//! the layer-source parser with its table-name policy, and project-wide
//! constants.

pub mod constants;
pub mod error;
pub mod layer;
pub mod version;

pub use error::LayerError;
pub use layer::LayerSource;
pub use version::{is_older, SchemaVersion};
