use thiserror::Error;

/// Every failure surfaced by sluice.
///
/// Failures originating below this layer keep the driver message inside
/// [`Error::Native`] (with the `anyhow` context chain describing what was being done).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Module not configured.")]
    NotConfigured,

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("{0}")]
    ConnectionUnavailable(String),

    #[error("Expected {expected} parameter(s), got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("{0:#}")]
    Native(anyhow::Error),

    #[error("Transaction failed: {0:#}")]
    TransactionConflict(anyhow::Error),
}

impl Error {
    pub const POOL_NOT_INITIALIZED: &'static str = "Connection pool not initialized.";

    /// Wraps a driver error, recording the operation as context.
    pub fn native<E, C>(error: E, context: C) -> Self
    where
        E: Into<anyhow::Error>,
        C: std::fmt::Display + Send + Sync + 'static,
    {
        Error::Native(error.into().context(context))
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, Error::NotConfigured)
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Native(value)
    }
}

/// Result type alias for sluice operations
pub type Result<T> = std::result::Result<T, Error>;
