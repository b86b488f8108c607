//! Status-bar menu model for the meshbar client.
//!
//! A passive description of the menu: the shell rebuilds a [`MenuState`]
//! from current snapshots whenever the menu is shown or a render trigger
//! fires, and feeds the resulting items to whatever surface it drives —
//! an OS status-bar API or the terminal stand-in. Clicking an item maps
//! to a [`MenuAction`] the shell forwards to the controller.
//!
//! No OS integration lives here; this crate only decides what the menu
//! says.

mod menu;

pub use menu::{EntryState, MenuAction, MenuItem, MenuState, NetworkEntry};
