//! HTTP client for the meshd control daemon.
//!
//! The daemon serves a JSON API over loopback, authenticated with a
//! token from its data directory. The client is stateless: every call is
//! a single round trip, failures map to [`DaemonError`], and retry
//! policy belongs to the caller.

pub mod client;
pub mod error;
pub(crate) mod wire;

pub use client::DaemonClient;
pub use error::DaemonError;
