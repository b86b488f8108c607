//! Public types at the controller's renderer boundary.

use std::fmt;

use meshbar_protocol::NetworkId;

use crate::error::ErrorKind;

/// The user-level operation a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Join,
    Leave,
    /// A toggle whose direction was never determined (the id was not in
    /// the snapshot, so there was no record to read).
    Toggle,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Join => write!(f, "join"),
            Operation::Leave => write!(f, "leave"),
            Operation::Toggle => write!(f, "toggle"),
        }
    }
}

/// Outstanding daemon operation for a network, as shown to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    JoinPending,
    LeavePending,
}

/// A surfaced operation failure, presented by the renderer as a single
/// modal acknowledgment.
#[derive(Debug, Clone)]
pub struct OperationFailure {
    pub operation: Operation,
    pub network: NetworkId,
    pub kind: ErrorKind,
    /// Daemon-supplied text when available, otherwise a local description.
    pub message: String,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failed: {}", self.operation, self.network, self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

/// Events emitted by the membership controller.
///
/// `Refresh` carries no payload: the renderer re-reads snapshots through
/// [`StateStore`](crate::StateStore) accessors and
/// [`ControllerHandle::pending`](crate::ControllerHandle::pending).
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// Observable state changed; re-read and redraw.
    Refresh,
    /// A join/leave (or its local precondition) failed.
    OperationFailed(OperationFailure),
    /// The node identifier, ready for the pasteboard.
    IdentifierReady(String),
}
