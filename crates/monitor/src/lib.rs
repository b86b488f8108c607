//! Status monitor for the meshbar client.
//!
//! One task polls the daemon on a fixed interval and forwards each
//! answer as a wholesale-snapshot [`MonitorEvent`](meshbar_protocol::MonitorEvent).
//! Because a single task feeds a single channel, events of each kind
//! arrive in FIFO order; the controller needs nothing stronger.

pub mod poll;
pub mod source;

pub use poll::{MonitorConfig, StatusMonitor};
pub use source::{SourceFuture, StatusSource};
