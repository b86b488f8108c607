//! Membership core for the meshbar client.
//!
//! Owns the authoritative in-process snapshots of daemon state
//! ([`StateStore`]) and the serialized controller
//! ([`MembershipController`]) that keeps them consistent while
//! translating user intent into daemon join/leave calls. The renderer is
//! strictly pull-based: it receives payload-free render triggers and
//! re-reads snapshots through the store and the handle.

pub mod controller;
pub mod error;
pub mod gateway;
pub mod store;
pub mod types;

pub use controller::{ControllerHandle, MembershipController};
pub use error::ErrorKind;
pub use gateway::{DaemonGateway, GatewayFuture};
pub use store::StateStore;
pub use types::{ControllerEvent, Operation, OperationFailure, PendingState};
