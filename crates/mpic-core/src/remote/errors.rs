use crate::types::CheckErrorKind;
use thiserror::Error;

/// Errors that can occur while calling a remote perspective.
///
/// These never cross the dispatcher boundary: each one is folded into a failed
/// [`CheckResponse`](crate::types::CheckResponse) tagged with [`Self::kind`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RemoteCallError {
    /// Request exceeded the per-call timeout.
    #[error("request timeout")]
    Timeout,

    /// Failed to connect to, or lost the connection with, the perspective.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Perspective answered with a non-2xx status.
    ///
    /// First field is the HTTP status code, second is the (truncated) body.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// Body could not be parsed as a check response, or was for the wrong check type.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request body could not be serialized.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No connection permit became available in time.
    #[error("concurrency limit reached: {0}")]
    ConcurrencyLimit(String),

    /// The shared client has been shut down.
    #[error("http client is shut down")]
    Shutdown,
}

impl RemoteCallError {
    /// Maps the error to the kind reported in the synthesized check response.
    #[must_use]
    pub fn kind(&self) -> CheckErrorKind {
        match self {
            Self::Timeout => CheckErrorKind::Timeout,
            Self::HttpError(..) | Self::InvalidResponse(_) => CheckErrorKind::InvalidResponse,
            Self::ConnectionFailed(_) |
            Self::InvalidRequest(_) |
            Self::ConcurrencyLimit(_) |
            Self::Shutdown => CheckErrorKind::TransportError,
        }
    }
}
