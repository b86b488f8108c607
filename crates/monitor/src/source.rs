//! Seam between the monitor and the daemon transport.

use std::future::Future;
use std::pin::Pin;

use meshbar_daemon_client::DaemonError;
use meshbar_protocol::{NetworkRecord, NodeStatus};

/// Boxed future returned by [`StatusSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DaemonError>> + Send + 'a>>;

/// The two queries the monitor repeats every tick.
///
/// The shell implements this over the real `DaemonClient`; tests use a
/// scripted fake.
pub trait StatusSource: Send + Sync {
    fn list_networks(&self) -> SourceFuture<'_, Vec<NetworkRecord>>;
    fn node_status(&self) -> SourceFuture<'_, NodeStatus>;
}
