use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 64-bit network identifier.
///
/// The daemon's canonical form is 16 lowercase hex digits; that is how
/// ids serialize on the wire and how [`Display`](fmt::Display) formats
/// them. In-process APIs always pass the typed value, never a formatted
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub u64);

/// Error parsing a [`NetworkId`] from its hex form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid network id: {0:?}")]
pub struct ParseNetworkIdError(pub String);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = ParseNetworkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 16 {
            return Err(ParseNetworkIdError(s.into()));
        }
        u64::from_str_radix(s, 16)
            .map(NetworkId)
            .map_err(|_| ParseNetworkIdError(s.into()))
    }
}

impl From<u64> for NetworkId {
    fn from(raw: u64) -> Self {
        NetworkId(raw)
    }
}

impl Serialize for NetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One network membership as last reported by the daemon.
///
/// Records are replaced wholesale with every list snapshot and never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub id: NetworkId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Whether the daemon reports this network as joined and up.
    pub connected: bool,
    pub allow_managed: bool,
    pub allow_global: bool,
    /// At most one connected network may carry this flag; the membership
    /// controller enforces it, the daemon does not.
    pub allow_default: bool,
}

/// Local node identity and status, replaced wholesale on each status
/// event. Absent entirely before the first event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// 10-digit hex node identifier, stable for the daemon's lifetime.
    pub address: String,
    pub online: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// Per-network join options sent with a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOptions {
    pub allow_managed: bool,
    pub allow_global: bool,
    pub allow_default: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            allow_managed: true,
            allow_global: false,
            allow_default: false,
        }
    }
}

impl JoinOptions {
    /// Options matching what a record currently shows, used when toggling
    /// an already-tracked network back on.
    pub fn from_record(record: &NetworkRecord) -> Self {
        Self {
            allow_managed: record.allow_managed,
            allow_global: record.allow_global,
            allow_default: record.allow_default,
        }
    }
}
