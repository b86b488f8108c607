//! Authoritative in-process snapshots of daemon state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use meshbar_protocol::{NetworkId, NetworkRecord, NodeStatus};

/// Owns the current network-list and node-status snapshots.
///
/// The only mutators are wholesale replacement; both swap an `Arc` under
/// a short-lived write lock, so a reader on any thread always sees a
/// complete snapshot, never a half-applied update. Mutation happens only
/// from the controller task; reads may come from anywhere.
#[derive(Debug)]
pub struct StateStore {
    networks: RwLock<Arc<[NetworkRecord]>>,
    status: RwLock<Option<Arc<NodeStatus>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            networks: RwLock::new(Vec::new().into()),
            status: RwLock::new(None),
        }
    }

    /// Replaces the network snapshot, returning the one it displaced.
    ///
    /// Duplicate ids collapse to the last occurrence so the snapshot
    /// invariant holds even against a misbehaving daemon.
    pub fn replace_networks(&self, list: Vec<NetworkRecord>) -> Arc<[NetworkRecord]> {
        let next: Arc<[NetworkRecord]> = dedup_by_id(list).into();
        let mut guard = self.networks.write().unwrap();
        std::mem::replace(&mut *guard, next)
    }

    /// Replaces the node status snapshot, returning the one it displaced.
    pub fn replace_status(&self, status: NodeStatus) -> Option<Arc<NodeStatus>> {
        self.status.write().unwrap().replace(Arc::new(status))
    }

    /// Current network snapshot.
    pub fn networks(&self) -> Arc<[NetworkRecord]> {
        self.networks.read().unwrap().clone()
    }

    /// Current node status, absent before the first status event.
    pub fn status(&self) -> Option<Arc<NodeStatus>> {
        self.status.read().unwrap().clone()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the first position of each id, letting later duplicates win.
fn dedup_by_id(list: Vec<NetworkRecord>) -> Vec<NetworkRecord> {
    let mut out: Vec<NetworkRecord> = Vec::with_capacity(list.len());
    let mut index: HashMap<NetworkId, usize> = HashMap::with_capacity(list.len());
    for record in list {
        match index.get(&record.id) {
            Some(&i) => out[i] = record,
            None => {
                index.insert(record.id, out.len());
                out.push(record);
            }
        }
    }
    out
}
