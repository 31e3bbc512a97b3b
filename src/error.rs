use thiserror::Error;

/// Reasons a magnet link degrades to empty data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MagnetError {
    #[error("Could not parse URI: {0}")]
    InvalidUri(#[from] url::ParseError),
    #[error("Expected the 'magnet' scheme, got '{0}'")]
    SchemeMismatch(String),
}
