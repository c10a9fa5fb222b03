use thiserror::Error;

/// Errors raised while interpreting a layer data-source string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("Layer source has no {0} entry")]
    MissingKey(&'static str),

    #[error("Unterminated quote in layer source: {0}")]
    UnterminatedQuote(String),

    #[error("Invalid characters in table name: {0}")]
    InvalidTableName(String),
}
