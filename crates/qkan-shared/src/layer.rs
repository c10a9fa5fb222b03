//! Layer data-source strings.
//!
//! A map layer backed by the project database describes itself with a source
//! string like
//!
//! ```text
//! dbname='/projects/ost/kanal.sqlite' table="flaechen" (geom) sql=
//! ```
//!
//! [`LayerSource::parse`] extracts the database path, the table and the
//! geometry column. The table name is checked against [`validate_table_name`]
//! before anything is handed to SQL.

use std::path::PathBuf;

use crate::error::LayerError;

/// Database file, table and geometry column referenced by a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    pub database: PathBuf,
    pub table: String,
    pub geometry_column: Option<String>,
}

impl LayerSource {
    pub fn parse(source: &str) -> Result<Self, LayerError> {
        let database = keyed_value(source, "dbname")?.ok_or(LayerError::MissingKey("dbname"))?;
        let table = keyed_value(source, "table")?.ok_or(LayerError::MissingKey("table"))?;
        validate_table_name(&table)?;

        Ok(Self {
            database: PathBuf::from(database),
            table,
            geometry_column: geometry_column(source),
        })
    }
}

/// Accept only ASCII letters, digits and underscores.
///
/// Table names end up inside SQL text (`PRAGMA table_info("…")`), so anything
/// outside this set is refused up front.
pub fn validate_table_name(name: &str) -> Result<(), LayerError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LayerError::InvalidTableName(name.to_string()))
    }
}

/// Value of `key=...` where the value is either quoted with `'`/`"` or runs
/// to the next whitespace.
fn keyed_value(source: &str, key: &str) -> Result<Option<String>, LayerError> {
    let pattern = format!("{key}=");
    let mut search_from = 0;

    while let Some(found) = source[search_from..].find(&pattern) {
        let start = search_from + found;
        search_from = start + pattern.len();

        let at_boundary = source[..start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !at_boundary {
            continue;
        }

        let rest = &source[search_from..];
        let value = match rest.chars().next() {
            Some(quote @ ('\'' | '"')) => {
                let body = &rest[1..];
                let end = body
                    .find(quote)
                    .ok_or_else(|| LayerError::UnterminatedQuote(rest.to_string()))?;
                body[..end].to_string()
            }
            _ => rest.split_whitespace().next().unwrap_or_default().to_string(),
        };
        return Ok(Some(value));
    }

    Ok(None)
}

fn geometry_column(source: &str) -> Option<String> {
    source
        .split_whitespace()
        .find(|token| token.starts_with('(') && token.ends_with(')') && token.len() > 2)
        .map(|token| token[1..token.len() - 1].to_string())
}
