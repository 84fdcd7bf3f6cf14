//! Catalog error types

use thiserror::Error;

/// Catalog engine error
///
/// Nothing here is fatal to the storefront: source failures switch the
/// listing to the fallback dataset, malformed records are skipped.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The remote catalog service failed (network, status, decoding)
    #[error("Catalog source error: {0}")]
    Source(String),

    /// The request was superseded by a newer one before it resolved
    #[error("Request cancelled (generation {0})")]
    Cancelled(u64),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration or dataset file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn source_failure(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Whether the failure came from a superseded request rather than the service
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
