//! Error types for the quote pipeline.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures inside the service, one per pipeline stage.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Upstream could not be reached, or did not answer before the deadline.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered with a body that is not a quote map.
    #[error("upstream response malformed: {0}")]
    UpstreamMalformed(String),

    /// The row insert failed or missed its deadline.
    #[error("persistence failed: {0}")]
    PersistenceFailed(String),
}

impl ServiceError {
    /// Text sent on the wire. Never includes the underlying cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServiceError::UpstreamUnavailable(_) => "error calling exchange rate API",
            ServiceError::UpstreamMalformed(_) => "error decoding external API response",
            ServiceError::PersistenceFailed(_) => "error saving exchange rate to database",
        }
    }
}

/// Failures seen by the one-shot client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("deadline of {0:?} exceeded waiting for the quote service")]
    DeadlineExceeded(Duration),

    #[error("error fetching exchange rate: {0}")]
    Transport(String),

    #[error("error fetching exchange rate: status {status}")]
    ServiceError { status: u16 },

    #[error("error decoding response: {0}")]
    ResponseMalformed(String),

    #[error("error writing {}: {source}", path.display())]
    LocalWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for service stages.
pub type ServiceResult<T> = Result<T, ServiceError>;
