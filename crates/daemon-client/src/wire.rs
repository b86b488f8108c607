//! Wire DTOs for the meshd control API.
//!
//! The daemon owns this format; these types never leave the crate.

use serde::{Deserialize, Serialize};

use meshbar_protocol::{JoinOptions, NetworkId, NetworkRecord, NodeStatus};

/// Per-network `status` value meaning "joined and up".
const STATUS_OK: &str = "OK";

/// One entry of `GET /network`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireNetwork {
    pub id: NetworkId,
    #[serde(default)]
    pub name: String,
    /// Daemon-side lifecycle: "OK", "REQUESTING_CONFIGURATION",
    /// "ACCESS_DENIED", "NOT_FOUND", ...
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub allow_managed: bool,
    #[serde(default)]
    pub allow_global: bool,
    #[serde(default)]
    pub allow_default: bool,
}

impl WireNetwork {
    pub(crate) fn into_record(self) -> NetworkRecord {
        NetworkRecord {
            id: self.id,
            name: self.name,
            connected: self.status == STATUS_OK,
            allow_managed: self.allow_managed,
            allow_global: self.allow_global,
            allow_default: self.allow_default,
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireStatus {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub version: String,
}

impl WireStatus {
    pub(crate) fn into_status(self) -> NodeStatus {
        NodeStatus {
            address: self.address,
            online: self.online,
            version: self.version,
        }
    }
}

/// Body of `POST /network/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JoinBody {
    pub allow_managed: bool,
    pub allow_global: bool,
    pub allow_default: bool,
}

impl From<&JoinOptions> for JoinBody {
    fn from(opts: &JoinOptions) -> Self {
        Self {
            allow_managed: opts.allow_managed,
            allow_global: opts.allow_global,
            allow_default: opts.allow_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_network_parses_daemon_json() {
        let json = r#"{
            "id": "8056c2e21c000001",
            "name": "earth",
            "status": "OK",
            "mac": "32:87:9a:ab:cd:ef",
            "allowManaged": true,
            "allowGlobal": false,
            "allowDefault": false
        }"#;
        let net: WireNetwork = serde_json::from_str(json).unwrap();
        let record = net.into_record();
        assert_eq!(record.id, NetworkId(0x8056_c2e2_1c00_0001));
        assert_eq!(record.name, "earth");
        assert!(record.connected);
        assert!(record.allow_managed);
    }

    #[test]
    fn wire_network_not_ok_status_means_disconnected() {
        for status in ["REQUESTING_CONFIGURATION", "ACCESS_DENIED", ""] {
            let json = format!(
                r#"{{"id":"0000000000000001","status":"{status}","allowManaged":true,"allowGlobal":false,"allowDefault":false}}"#
            );
            let net: WireNetwork = serde_json::from_str(&json).unwrap();
            assert!(!net.into_record().connected, "status {status:?}");
        }
    }

    #[test]
    fn wire_status_parses_and_tolerates_missing_fields() {
        let json = r#"{"address":"89e92ceee5","online":true,"version":"1.4.2","clock":1700000000000}"#;
        let status: NodeStatus = serde_json::from_str::<WireStatus>(json).unwrap().into_status();
        assert_eq!(status.address, "89e92ceee5");
        assert!(status.online);

        let bare: WireStatus = serde_json::from_str("{}").unwrap();
        let status = bare.into_status();
        assert!(status.address.is_empty());
        assert!(!status.online);
    }

    #[test]
    fn join_body_field_names() {
        let opts = JoinOptions {
            allow_managed: true,
            allow_global: true,
            allow_default: false,
        };
        let json = serde_json::to_string(&JoinBody::from(&opts)).unwrap();
        assert!(json.contains("\"allowManaged\":true"));
        assert!(json.contains("\"allowGlobal\":true"));
        assert!(json.contains("\"allowDefault\":false"));
    }
}
