//! Membership controller — the single serialized owner of all state
//! mutation.
//!
//! Monitor events, user commands, and daemon-call completions all enter
//! through one task, so every read-then-decide step (busy check,
//! default-route check, pending resolution) observes a consistent view.
//! Daemon calls themselves run on spawned tasks and re-enter as
//! completion messages, keeping the serialization point free while a
//! request is in flight.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use meshbar_daemon_client::DaemonError;
use meshbar_protocol::{JoinOptions, MonitorEvent, NetworkId, NetworkRecord, NodeStatus};

use crate::error::ErrorKind;
use crate::gateway::DaemonGateway;
use crate::store::StateStore;
use crate::types::{ControllerEvent, Operation, OperationFailure, PendingState};

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 64;
const MONITOR_CHANNEL_CAPACITY: usize = 16;

/// In-flight daemon operation for one network id.
///
/// `seen` records whether the id has appeared in any list snapshot since
/// dispatch. A join for a never-seen id (joining a new network by id)
/// survives stale snapshots that predate the membership; every other
/// pending entry clears when its id vanishes from a snapshot.
#[derive(Debug, Clone, Copy)]
struct PendingOp {
    state: PendingState,
    seen: bool,
}

/// Messages serialized through the controller's inlet.
enum ControllerMsg {
    Toggle(NetworkId),
    Join {
        id: NetworkId,
        options: JoinOptions,
    },
    CopyIdentifier,
    Refresh,
    CommandFinished {
        id: NetworkId,
        operation: Operation,
        result: Result<(), DaemonError>,
    },
    RefreshFinished {
        networks: Result<Vec<NetworkRecord>, DaemonError>,
        status: Result<NodeStatus, DaemonError>,
    },
    Shutdown,
}

/// Cloneable front door to the controller task.
///
/// All request methods enqueue and return immediately; outcomes surface
/// through the [`ControllerEvent`] channel.
#[derive(Clone)]
pub struct ControllerHandle {
    commands_tx: mpsc::Sender<ControllerMsg>,
    monitor_tx: mpsc::Sender<MonitorEvent>,
    pending: Arc<RwLock<HashMap<NetworkId, PendingOp>>>,
}

impl ControllerHandle {
    /// Joins the network if the snapshot shows it disconnected, leaves it
    /// if connected. Rejected with `Busy` while a call is outstanding and
    /// with `NotFound` for ids outside the snapshot.
    pub async fn request_toggle(&self, id: NetworkId) {
        let _ = self.commands_tx.send(ControllerMsg::Toggle(id)).await;
    }

    /// Joins a network by id, tracked or not — the "Join Network…" flow.
    pub async fn request_join(&self, id: NetworkId, options: JoinOptions) {
        let _ = self
            .commands_tx
            .send(ControllerMsg::Join { id, options })
            .await;
    }

    /// Emits [`ControllerEvent::IdentifierReady`] with the node address.
    /// Silent no-op while no node status is known.
    pub async fn request_copy_identifier(&self) {
        let _ = self.commands_tx.send(ControllerMsg::CopyIdentifier).await;
    }

    /// Re-queries the daemon immediately instead of waiting for the next
    /// monitor tick. Query failures are logged, never surfaced.
    pub async fn request_refresh(&self) {
        let _ = self.commands_tx.send(ControllerMsg::Refresh).await;
    }

    /// Stops the controller task after the messages already queued.
    pub async fn shutdown(&self) {
        let _ = self.commands_tx.send(ControllerMsg::Shutdown).await;
    }

    /// Sender for the status monitor to push events into.
    pub fn monitor_sink(&self) -> mpsc::Sender<MonitorEvent> {
        self.monitor_tx.clone()
    }

    /// Pending state for a network, if a daemon call is outstanding.
    pub fn pending(&self, id: NetworkId) -> Option<PendingState> {
        self.pending.read().unwrap().get(&id).map(|op| op.state)
    }
}

/// The controller task. Construct, take the event receiver, grab a
/// [`ControllerHandle`], then consume it with [`run`](Self::run).
pub struct MembershipController {
    store: Arc<StateStore>,
    gateway: Arc<dyn DaemonGateway>,
    pending: Arc<RwLock<HashMap<NetworkId, PendingOp>>>,
    events_tx: mpsc::Sender<ControllerEvent>,
    events_rx: Option<mpsc::Receiver<ControllerEvent>>,
    commands_tx: mpsc::Sender<ControllerMsg>,
    commands_rx: mpsc::Receiver<ControllerMsg>,
    monitor_tx: mpsc::Sender<MonitorEvent>,
    monitor_rx: mpsc::Receiver<MonitorEvent>,
}

impl MembershipController {
    /// Creates a controller over the given store and daemon gateway.
    pub fn new(store: Arc<StateStore>, gateway: Arc<dyn DaemonGateway>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (monitor_tx, monitor_rx) = mpsc::channel(MONITOR_CHANNEL_CAPACITY);

        Self {
            store,
            gateway,
            pending: Arc::new(RwLock::new(HashMap::new())),
            events_tx,
            events_rx: Some(events_rx),
            commands_tx,
            commands_rx,
            monitor_tx,
            monitor_rx,
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<ControllerEvent>> {
        self.events_rx.take()
    }

    /// Returns a handle for user commands and renderer queries.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            commands_tx: self.commands_tx.clone(),
            monitor_tx: self.monitor_tx.clone(),
            pending: self.pending.clone(),
        }
    }

    /// Runs the controller until [`ControllerHandle::shutdown`].
    pub async fn run(mut self) {
        debug!("membership controller started");
        loop {
            tokio::select! {
                Some(msg) = self.commands_rx.recv() => {
                    if !self.handle_msg(msg).await {
                        break;
                    }
                }
                Some(event) = self.monitor_rx.recv() => {
                    self.handle_monitor(event).await;
                }
            }
        }
        debug!("membership controller stopped");
    }

    /// Handles one serialized message; returns `false` on shutdown.
    async fn handle_msg(&self, msg: ControllerMsg) -> bool {
        match msg {
            ControllerMsg::Toggle(id) => self.handle_toggle(id).await,
            ControllerMsg::Join { id, options } => self.handle_join(id, options).await,
            ControllerMsg::CopyIdentifier => self.handle_copy().await,
            ControllerMsg::Refresh => self.start_refresh(),
            ControllerMsg::CommandFinished {
                id,
                operation,
                result,
            } => self.finish_command(id, operation, result).await,
            ControllerMsg::RefreshFinished { networks, status } => {
                self.finish_refresh(networks, status).await
            }
            ControllerMsg::Shutdown => return false,
        }
        true
    }

    async fn handle_monitor(&self, event: MonitorEvent) {
        match event {
            MonitorEvent::NetworkListChanged(list) => self.apply_networks(list).await,
            MonitorEvent::NodeStatusChanged(status) => self.apply_status(status).await,
        }
    }

    async fn handle_toggle(&self, id: NetworkId) {
        if let Some(state) = self.pending_state(id) {
            self.reject_busy(id, state).await;
            return;
        }

        let networks = self.store.networks();
        let Some(record) = networks.iter().find(|n| n.id == id) else {
            debug!(network = %id, "toggle for id outside the snapshot");
            self.surface_failure(
                Operation::Toggle,
                id,
                ErrorKind::NotFound,
                "network is not in the current snapshot".into(),
            )
            .await;
            return;
        };

        if record.connected {
            self.start_leave(id).await;
        } else {
            // The id is in the snapshot, so it counts as seen.
            self.start_join(id, JoinOptions::from_record(record), true)
                .await;
        }
    }

    async fn handle_join(&self, id: NetworkId, options: JoinOptions) {
        if let Some(state) = self.pending_state(id) {
            self.reject_busy(id, state).await;
            return;
        }
        let seen = self.store.networks().iter().any(|n| n.id == id);
        self.start_join(id, options, seen).await;
    }

    async fn handle_copy(&self) {
        match self.store.status() {
            Some(status) if !status.address.is_empty() => {
                let _ = self
                    .events_tx
                    .send(ControllerEvent::IdentifierReady(status.address.clone()))
                    .await;
            }
            _ => debug!("copy requested before node status is known; ignoring"),
        }
    }

    async fn start_join(&self, id: NetworkId, mut options: JoinOptions, seen: bool) {
        // At most one connected network may hold the default route; demote
        // the request rather than send one the daemon side cannot honor.
        if options.allow_default && self.default_route_taken(id) {
            debug!(
                network = %id,
                "another connected network already holds the default route; joining without it"
            );
            options.allow_default = false;
        }

        self.set_pending(id, PendingState::JoinPending, seen).await;
        info!(
            network = %id,
            allow_managed = options.allow_managed,
            allow_global = options.allow_global,
            allow_default = options.allow_default,
            "dispatching join"
        );

        let gateway = self.gateway.clone();
        let commands_tx = self.commands_tx.clone();
        tokio::spawn(async move {
            let result = gateway.join_network(id, options).await;
            let _ = commands_tx
                .send(ControllerMsg::CommandFinished {
                    id,
                    operation: Operation::Join,
                    result,
                })
                .await;
        });
    }

    async fn start_leave(&self, id: NetworkId) {
        self.set_pending(id, PendingState::LeavePending, true).await;
        info!(network = %id, "dispatching leave");

        let gateway = self.gateway.clone();
        let commands_tx = self.commands_tx.clone();
        tokio::spawn(async move {
            let result = gateway.leave_network(id).await;
            let _ = commands_tx
                .send(ControllerMsg::CommandFinished {
                    id,
                    operation: Operation::Leave,
                    result,
                })
                .await;
        });
    }

    /// Re-queries the daemon on a worker task; results re-enter the inlet.
    fn start_refresh(&self) {
        debug!("manual refresh requested");
        let gateway = self.gateway.clone();
        let commands_tx = self.commands_tx.clone();
        tokio::spawn(async move {
            let networks = gateway.list_networks().await;
            let status = gateway.node_status().await;
            let _ = commands_tx
                .send(ControllerMsg::RefreshFinished { networks, status })
                .await;
        });
    }

    async fn finish_command(
        &self,
        id: NetworkId,
        operation: Operation,
        result: Result<(), DaemonError>,
    ) {
        match result {
            Ok(()) => {
                // The ack alone is not confirmation; the pending flag
                // stays until a list snapshot reflects the new state.
                debug!(network = %id, op = %operation, "daemon acknowledged; awaiting snapshot");
            }
            Err(err) => {
                warn!(network = %id, op = %operation, error = %err, "daemon call failed");
                self.clear_pending(id).await;
                let (kind, message) = ErrorKind::from_daemon(&err);
                self.surface_failure(operation, id, kind, message).await;
            }
        }
    }

    async fn finish_refresh(
        &self,
        networks: Result<Vec<NetworkRecord>, DaemonError>,
        status: Result<NodeStatus, DaemonError>,
    ) {
        match networks {
            Ok(list) => self.apply_networks(list).await,
            Err(err) => debug!(error = %err, "refresh: network list query failed"),
        }
        match status {
            Ok(s) => self.apply_status(s).await,
            Err(err) => debug!(error = %err, "refresh: node status query failed"),
        }
    }

    async fn apply_networks(&self, list: Vec<NetworkRecord>) {
        let previous = self.store.replace_networks(list);
        let current = self.store.networks();
        let mut changed = previous[..] != current[..];
        changed |= self.resolve_pending(&current);
        if changed {
            self.emit_refresh().await;
        }
    }

    async fn apply_status(&self, status: NodeStatus) {
        let previous = self.store.replace_status(status);
        let current = self.store.status();
        let changed = match (&previous, &current) {
            (Some(prev), Some(cur)) => prev != cur,
            _ => true,
        };
        if changed {
            self.emit_refresh().await;
        }
    }

    /// Resolves pending operations against a fresh snapshot. Returns
    /// whether any entry was cleared (an observable change).
    fn resolve_pending(&self, current: &[NetworkRecord]) -> bool {
        let mut pending = self.pending.write().unwrap();
        let before = pending.len();
        pending.retain(|id, op| match current.iter().find(|n| n.id == *id) {
            Some(record) => {
                op.seen = true;
                match op.state {
                    // Connected confirms the join; anything else is a
                    // snapshot that does not reflect it yet.
                    PendingState::JoinPending => !record.connected,
                    // Disconnected (or absent, below) confirms the leave.
                    PendingState::LeavePending => record.connected,
                }
            }
            None => match op.state {
                PendingState::LeavePending => false,
                // A join for a membership that vanished is over; a join
                // the daemon has simply not listed yet is not.
                PendingState::JoinPending => !op.seen,
            },
        });
        before != pending.len()
    }

    fn default_route_taken(&self, joining: NetworkId) -> bool {
        self.store
            .networks()
            .iter()
            .any(|n| n.id != joining && n.connected && n.allow_default)
    }

    fn pending_state(&self, id: NetworkId) -> Option<PendingState> {
        self.pending.read().unwrap().get(&id).map(|op| op.state)
    }

    async fn set_pending(&self, id: NetworkId, state: PendingState, seen: bool) {
        self.pending
            .write()
            .unwrap()
            .insert(id, PendingOp { state, seen });
        self.emit_refresh().await;
    }

    async fn clear_pending(&self, id: NetworkId) {
        let removed = self.pending.write().unwrap().remove(&id).is_some();
        if removed {
            self.emit_refresh().await;
        }
    }

    async fn reject_busy(&self, id: NetworkId, state: PendingState) {
        let operation = match state {
            PendingState::JoinPending => Operation::Join,
            PendingState::LeavePending => Operation::Leave,
        };
        debug!(network = %id, op = %operation, "toggle rejected: operation outstanding");
        self.surface_failure(
            operation,
            id,
            ErrorKind::Busy,
            format!("{operation} already in progress"),
        )
        .await;
    }

    async fn surface_failure(
        &self,
        operation: Operation,
        network: NetworkId,
        kind: ErrorKind,
        message: String,
    ) {
        let _ = self
            .events_tx
            .send(ControllerEvent::OperationFailed(OperationFailure {
                operation,
                network,
                kind,
                message,
            }))
            .await;
    }

    async fn emit_refresh(&self) {
        let _ = self.events_tx.send(ControllerEvent::Refresh).await;
    }
}
