//! Adapters implementing the controller's and monitor's transport seams
//! over the one shared [`DaemonClient`].
//!
//! Each consuming crate defines its own trait, so two thin wrappers
//! delegate to the same client.

use std::sync::Arc;

use meshbar_daemon_client::DaemonClient;
use meshbar_membership::{DaemonGateway, GatewayFuture};
use meshbar_monitor::{SourceFuture, StatusSource};
use meshbar_protocol::{JoinOptions, NetworkId, NetworkRecord, NodeStatus};

/// Implements `meshbar_membership::DaemonGateway` over the real client.
pub struct GatewayAdapter {
    client: Arc<DaemonClient>,
}

impl GatewayAdapter {
    pub fn new(client: Arc<DaemonClient>) -> Self {
        Self { client }
    }
}

impl DaemonGateway for GatewayAdapter {
    fn list_networks(&self) -> GatewayFuture<'_, Vec<NetworkRecord>> {
        let client = self.client.clone();
        Box::pin(async move { client.list_networks().await })
    }

    fn node_status(&self) -> GatewayFuture<'_, NodeStatus> {
        let client = self.client.clone();
        Box::pin(async move { client.node_status().await })
    }

    fn join_network(&self, id: NetworkId, options: JoinOptions) -> GatewayFuture<'_, ()> {
        let client = self.client.clone();
        Box::pin(async move { client.join_network(id, &options).await })
    }

    fn leave_network(&self, id: NetworkId) -> GatewayFuture<'_, ()> {
        let client = self.client.clone();
        Box::pin(async move { client.leave_network(id).await })
    }
}

/// Implements `meshbar_monitor::StatusSource` over the same client.
pub struct SourceAdapter {
    client: Arc<DaemonClient>,
}

impl SourceAdapter {
    pub fn new(client: Arc<DaemonClient>) -> Self {
        Self { client }
    }
}

impl StatusSource for SourceAdapter {
    fn list_networks(&self) -> SourceFuture<'_, Vec<NetworkRecord>> {
        let client = self.client.clone();
        Box::pin(async move { client.list_networks().await })
    }

    fn node_status(&self) -> SourceFuture<'_, NodeStatus> {
        let client = self.client.clone();
        Box::pin(async move { client.node_status().await })
    }
}
