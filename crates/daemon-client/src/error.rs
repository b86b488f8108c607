//! Error types for daemon control calls.

/// Errors from a single daemon round trip.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// The daemon could not be reached at all.
    #[error("daemon unreachable: {0}")]
    ConnectionUnavailable(String),

    /// The daemon answered with a non-success status. `message` is the
    /// response body as supplied by the daemon, possibly empty.
    #[error("daemon rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request exceeded the client's configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The daemon answered 2xx but the body did not parse.
    #[error("invalid daemon response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// The auth token contains bytes that cannot go into a header.
    #[error("invalid auth token")]
    InvalidToken,
}

impl From<reqwest::Error> for DaemonError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DaemonError::Timeout
        } else {
            DaemonError::ConnectionUnavailable(err.to_string())
        }
    }
}
