use crate::types::{NetworkRecord, NodeStatus};

/// Events emitted by the status monitor toward the membership controller.
///
/// Every event carries a complete snapshot, never a diff, so at-least-once
/// delivery is safe: applying the same event twice replaces state with the
/// same value.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// Fresh wholesale snapshot of the joined-network list.
    NetworkListChanged(Vec<NetworkRecord>),
    /// Fresh node identity/status snapshot.
    NodeStatusChanged(NodeStatus),
}
