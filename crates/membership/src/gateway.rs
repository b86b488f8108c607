//! Seam between the controller and the daemon transport.

use std::future::Future;
use std::pin::Pin;

use meshbar_daemon_client::DaemonError;
use meshbar_protocol::{JoinOptions, NetworkId, NetworkRecord, NodeStatus};

/// Boxed future returned by [`DaemonGateway`] methods.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DaemonError>> + Send + 'a>>;

/// Abstract daemon control surface driven by the controller.
///
/// The shell implements this over the real `DaemonClient`; tests use a
/// scripted mock. Implementations own no cached state and perform no
/// retries — a failed call is reported once and the caller decides.
pub trait DaemonGateway: Send + Sync {
    fn list_networks(&self) -> GatewayFuture<'_, Vec<NetworkRecord>>;
    fn node_status(&self) -> GatewayFuture<'_, NodeStatus>;
    fn join_network(&self, id: NetworkId, options: JoinOptions) -> GatewayFuture<'_, ()>;
    fn leave_network(&self, id: NetworkId) -> GatewayFuture<'_, ()>;
}
