//! Shell configuration and daemon endpoint discovery.
//!
//! The daemon publishes its control port and auth token in its own data
//! directory, the same files its bundled CLI reads:
//! - `meshd.port` — ASCII decimal port of the loopback control API.
//! - `authtoken.secret` — token expected on every control request.
//!
//! Shell settings live in `~/.config/meshbar/config.json`; a missing or
//! malformed file falls back to defaults with a warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// On-disk shape of `meshbar/config.json`. Zero or empty means "use the
/// default".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ShellConfigFile {
    #[serde(default)]
    poll_interval_ms: u64,
    #[serde(default)]
    request_timeout_ms: u64,
    #[serde(default)]
    daemon_dir: String,
}

/// Resolved shell configuration.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Time between status monitor polls.
    pub poll_interval: Duration,
    /// Per-request timeout for daemon control calls.
    pub request_timeout: Duration,
    /// Daemon data directory holding `meshd.port` and `authtoken.secret`.
    pub daemon_dir: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            daemon_dir: default_daemon_dir(),
        }
    }
}

impl ShellConfig {
    /// Loads settings from the config file, if any. The `MESHD_HOME`
    /// environment variable overrides every other daemon-dir source.
    pub fn load() -> anyhow::Result<Self> {
        let mut file = ShellConfigFile::default();

        let path = shell_config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<ShellConfigFile>(&content) {
                Ok(parsed) => file = parsed,
                Err(err) => tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse shell config, using defaults"
                ),
            }
        }

        Ok(Self::merge(file, std::env::var("MESHD_HOME").ok()))
    }

    fn merge(file: ShellConfigFile, daemon_home: Option<String>) -> Self {
        let mut config = ShellConfig::default();
        if file.poll_interval_ms > 0 {
            config.poll_interval = Duration::from_millis(file.poll_interval_ms);
        }
        if file.request_timeout_ms > 0 {
            config.request_timeout = Duration::from_millis(file.request_timeout_ms);
        }
        if let Some(home) = daemon_home {
            config.daemon_dir = PathBuf::from(home);
        } else if !file.daemon_dir.is_empty() {
            config.daemon_dir = PathBuf::from(file.daemon_dir);
        }
        config
    }
}

/// Where to reach the daemon, read from its data directory.
#[derive(Debug, Clone)]
pub struct DaemonEndpoint {
    pub base_url: String,
    pub auth_token: String,
}

/// Reads `meshd.port` and `authtoken.secret` from the daemon directory.
pub fn discover_daemon(dir: &Path) -> anyhow::Result<DaemonEndpoint> {
    let port_path = dir.join("meshd.port");
    let port: u16 = std::fs::read_to_string(&port_path)
        .with_context(|| format!("reading {}", port_path.display()))?
        .trim()
        .parse()
        .with_context(|| format!("parsing {}", port_path.display()))?;

    let token_path = dir.join("authtoken.secret");
    let auth_token = std::fs::read_to_string(&token_path)
        .with_context(|| format!("reading {}", token_path.display()))?
        .trim()
        .to_string();

    Ok(DaemonEndpoint {
        base_url: format!("http://127.0.0.1:{port}"),
        auth_token,
    })
}

fn shell_config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("meshbar").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home).join(".config"))
    }

    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join("Library")
            .join("Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp"))
    }
}

fn default_daemon_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support/MeshD")
    }

    #[cfg(target_os = "windows")]
    {
        PathBuf::from(r"C:\ProgramData\MeshD")
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from("/var/lib/meshd")
    }
}
