//! Value types shared across the meshbar workspace.
//!
//! Passive data only: network identifiers, membership records, node
//! status, join options, and the monitor event enum. No I/O and no
//! knowledge of the daemon's wire format — that belongs to
//! `meshbar-daemon-client`.

pub mod events;
pub mod types;

pub use events::MonitorEvent;
pub use types::{JoinOptions, NetworkId, NetworkRecord, NodeStatus, ParseNetworkIdError};
