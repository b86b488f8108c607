//! Failure taxonomy surfaced to the renderer.

use meshbar_daemon_client::DaemonError;

/// What went wrong with a membership operation.
///
/// `Busy` and `NotFound` are local precondition failures resolved inside
/// the controller; the remaining kinds come from the daemon client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("daemon unreachable")]
    ConnectionUnavailable,

    #[error("daemon rejected the request")]
    Rejected,

    #[error("request timed out")]
    Timeout,

    #[error("operation already in progress")]
    Busy,

    #[error("network not in current snapshot")]
    NotFound,
}

impl ErrorKind {
    /// Maps a daemon-client error to its surfaced kind and message,
    /// preferring the daemon-supplied text where there is one.
    pub fn from_daemon(err: &DaemonError) -> (Self, String) {
        match err {
            DaemonError::ConnectionUnavailable(_) => {
                (ErrorKind::ConnectionUnavailable, err.to_string())
            }
            DaemonError::Rejected { message, .. } if !message.is_empty() => {
                (ErrorKind::Rejected, message.clone())
            }
            DaemonError::Rejected { .. } => (ErrorKind::Rejected, err.to_string()),
            DaemonError::Timeout => (ErrorKind::Timeout, err.to_string()),
            // A garbled body or a bad token is a daemon-side problem from
            // the user's point of view.
            DaemonError::InvalidResponse(_) | DaemonError::InvalidToken => {
                (ErrorKind::Rejected, err.to_string())
            }
        }
    }
}
