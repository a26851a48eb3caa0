use thiserror::Error;

/// Errors surfaced by the report client and builder.
///
/// Nothing is retried internally; every variant propagates straight to the
/// caller of the operation that triggered it.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Malformed caller input (blank metric/dimension name, sample size out
    /// of range).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked out of the required state order.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The credential handle was rejected or could not be loaded.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or HTTP-layer failure, including response decode failures.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned a non-success status.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
