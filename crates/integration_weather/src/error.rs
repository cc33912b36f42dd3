//! Mapping errors

use domain::DomainError;
use thiserror::Error;

/// Failure turning a vendor payload into domain values
#[derive(Debug, Error)]
pub enum MappingError {
    /// The payload decoded but carried values the domain rejects
    #[error("invalid upstream value: {0}")]
    Domain(#[from] DomainError),

    /// A timestamp could not be interpreted
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The payload lacked data every answer needs
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
