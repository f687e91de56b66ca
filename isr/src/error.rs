//! Error types for configuration.

use thiserror::Error;

/// Error raised while building or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A route rule has an empty or malformed path pattern.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A bypass prefix does not start with `/`.
    #[error("bypass prefix {0:?} must start with '/'")]
    InvalidBypass(String),

    /// The cache-state marker header name is not a valid header name.
    #[error("invalid status header name {0:?}")]
    InvalidHeaderName(String),

    /// The configuration document could not be parsed.
    #[error(transparent)]
    Parse(#[from] serde_saphyr::Error),
}
