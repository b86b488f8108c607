//! Dynamic status-bar menu built from state snapshots.

use meshbar_protocol::{NetworkId, NetworkRecord};

/// Actions that can be triggered from the status-bar menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Join or leave the network, depending on its current state.
    ToggleNetwork(NetworkId),
    /// Put the node address on the pasteboard.
    CopyIdentifier,
    /// Re-query the daemon now.
    Refresh,
    /// Quit the application.
    Quit,
}

/// A single menu item.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Display text. Empty means a separator.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// Whether the item carries a checkmark.
    pub checked: bool,
    /// Optional action triggered on click.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn separator() -> Self {
        Self {
            label: String::new(),
            enabled: false,
            checked: false,
            action: None,
        }
    }

    fn header(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
            checked: false,
            action: None,
        }
    }
}

/// How one network shows up in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Connected,
    Disconnected,
    JoinPending,
    LeavePending,
}

/// One network line: the record plus the controller's pending view.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    pub record: NetworkRecord,
    pub state: EntryState,
}

/// Current state used to build the menu.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    /// Node address, absent until the first status event.
    pub node_address: Option<String>,
    pub online: bool,
    pub entries: Vec<NetworkEntry>,
}

impl MenuState {
    /// Builds the menu items from the current state.
    pub fn build_menu(&self) -> Vec<MenuItem> {
        let mut items = Vec::new();

        // Header: node identity + reachability.
        let status = if self.online { "Online" } else { "Offline" };
        let header = match &self.node_address {
            Some(address) => format!("Node {address} — {status}"),
            None => "Node — waiting for daemon".into(),
        };
        items.push(MenuItem::header(header));

        items.push(MenuItem {
            label: "Copy Node Address".into(),
            enabled: self.node_address.is_some(),
            checked: false,
            action: Some(MenuAction::CopyIdentifier),
        });

        items.push(MenuItem::separator());

        // Networks, one toggleable line each. A pending line is disabled:
        // a second toggle would only come back Busy.
        if self.entries.is_empty() {
            items.push(MenuItem::header("No joined networks"));
        } else {
            for entry in &self.entries {
                items.push(entry.to_item());
            }
        }

        items.push(MenuItem::separator());

        items.push(MenuItem {
            label: "Refresh".into(),
            enabled: true,
            checked: false,
            action: Some(MenuAction::Refresh),
        });
        items.push(MenuItem {
            label: "Quit".into(),
            enabled: true,
            checked: false,
            action: Some(MenuAction::Quit),
        });

        items
    }
}

impl NetworkEntry {
    fn to_item(&self) -> MenuItem {
        let record = &self.record;
        let flags = format!(
            "{}{}{}",
            if record.allow_managed { 'm' } else { '-' },
            if record.allow_global { 'g' } else { '-' },
            if record.allow_default { 'd' } else { '-' },
        );

        let mut label = format!("{} [{flags}]", record.id);
        if !record.name.is_empty() {
            label.push_str("  ");
            label.push_str(&record.name);
        }
        match self.state {
            EntryState::JoinPending => label.push_str("  (joining…)"),
            EntryState::LeavePending => label.push_str("  (leaving…)"),
            EntryState::Connected | EntryState::Disconnected => {}
        }

        MenuItem {
            label,
            enabled: matches!(self.state, EntryState::Connected | EntryState::Disconnected),
            checked: matches!(self.state, EntryState::Connected | EntryState::LeavePending),
            action: Some(MenuAction::ToggleNetwork(record.id)),
        }
    }
}
