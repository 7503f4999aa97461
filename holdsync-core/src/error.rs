//! Error types for the holdsync ecosystem.

use thiserror::Error;

/// Errors that can occur in holdsync operations.
#[derive(Error, Debug)]
pub enum HoldSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Event '{0}' has no usable time range (needs a dateTime pair or a date pair)")]
    InvalidTimeRange(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for holdsync operations.
pub type HoldSyncResult<T> = Result<T, HoldSyncError>;
