//! Terminal renderer — a thin, pull-based stand-in for an OS status bar.
//!
//! The controller pushes only payload-free triggers; on each one the
//! renderer rebuilds the menu model from current snapshots and prints
//! it. Item numbers stand in for menu clicks (`click <n>` on stdin).

use std::sync::Arc;

use tokio::sync::mpsc;

use meshbar_membership::{ControllerEvent, ControllerHandle, PendingState, StateStore};
use meshbar_tray::{EntryState, MenuState, NetworkEntry};

/// Rebuilds the menu model from current snapshots.
pub fn menu_state(store: &StateStore, handle: &ControllerHandle) -> MenuState {
    let status = store.status();
    let entries = store
        .networks()
        .iter()
        .map(|record| {
            let state = match handle.pending(record.id) {
                Some(PendingState::JoinPending) => EntryState::JoinPending,
                Some(PendingState::LeavePending) => EntryState::LeavePending,
                None if record.connected => EntryState::Connected,
                None => EntryState::Disconnected,
            };
            NetworkEntry {
                record: record.clone(),
                state,
            }
        })
        .collect();

    MenuState {
        node_address: status
            .as_ref()
            .map(|s| s.address.clone())
            .filter(|a| !a.is_empty()),
        online: status.as_ref().is_some_and(|s| s.online),
        entries,
    }
}

pub struct Renderer {
    store: Arc<StateStore>,
    handle: ControllerHandle,
}

impl Renderer {
    pub fn new(store: Arc<StateStore>, handle: ControllerHandle) -> Self {
        Self { store, handle }
    }

    /// Consumes controller events until the channel closes.
    pub async fn run(self, mut events: mpsc::Receiver<ControllerEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                ControllerEvent::Refresh => self.render(),
                // Stand-in for the modal alert of a real status-bar shell.
                ControllerEvent::OperationFailed(failure) => println!("!! {failure}"),
                ControllerEvent::IdentifierReady(address) => println!("node address: {address}"),
            }
        }
    }

    fn render(&self) {
        let items = menu_state(&self.store, &self.handle).build_menu();
        for (index, item) in items.iter().enumerate() {
            if item.label.is_empty() {
                println!("   ----------");
                continue;
            }
            let check = if item.checked { '*' } else { ' ' };
            if item.enabled {
                println!("{index:>2} {check} {}", item.label);
            } else {
                println!("   {check} {}", item.label);
            }
        }
    }
}
