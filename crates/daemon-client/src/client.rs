//! Async client for the meshd control API.
//!
//! Plain HTTP over loopback with the daemon auth token sent as a default
//! header on every request. The request timeout is supplied by the
//! caller, not hardcoded here.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::trace;

use meshbar_protocol::{JoinOptions, NetworkId, NetworkRecord, NodeStatus};

use crate::error::DaemonError;
use crate::wire::{JoinBody, WireNetwork, WireStatus};

/// Header carrying the daemon auth token.
const AUTH_HEADER: &str = "X-Meshd-Auth";

/// Client for the local meshd control API.
#[derive(Debug)]
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    /// Creates a client for the daemon at `base_url` (no trailing slash),
    /// authenticating every request with `auth_token` and failing calls
    /// that exceed `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        auth_token: &str,
        timeout: Duration,
    ) -> Result<Self, DaemonError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTH_HEADER,
            HeaderValue::from_str(auth_token).map_err(|_| DaemonError::InvalidToken)?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Returns the joined-network list as a fresh snapshot.
    pub async fn list_networks(&self) -> Result<Vec<NetworkRecord>, DaemonError> {
        let body = self.call(Method::GET, "/network", None).await?;
        let networks: Vec<WireNetwork> = serde_json::from_slice(&body)?;
        Ok(networks.into_iter().map(WireNetwork::into_record).collect())
    }

    /// Returns the local node's identity and status.
    pub async fn node_status(&self) -> Result<NodeStatus, DaemonError> {
        let body = self.call(Method::GET, "/status", None).await?;
        let status: WireStatus = serde_json::from_slice(&body)?;
        Ok(status.into_status())
    }

    /// Joins (or reconfigures) a network.
    pub async fn join_network(
        &self,
        id: NetworkId,
        options: &JoinOptions,
    ) -> Result<(), DaemonError> {
        let body = serde_json::to_vec(&JoinBody::from(options))?;
        self.call(Method::POST, &format!("/network/{id}"), Some(body))
            .await?;
        Ok(())
    }

    /// Leaves a network.
    pub async fn leave_network(&self, id: NetworkId) -> Result<(), DaemonError> {
        self.call(Method::DELETE, &format!("/network/{id}"), None)
            .await?;
        Ok(())
    }

    /// Performs one authenticated round trip and returns the success body.
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, DaemonError> {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!(%method, %url, "daemon request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let resp = request.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DaemonError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one HTTP/1.1 exchange with a canned response, then
    /// closes. Returns the base URL and a handle yielding the raw request
    /// head (start line + headers).
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if n == 0 || buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.flush().await.unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn client(base_url: &str) -> DaemonClient {
        DaemonClient::new(base_url, "sekrit", Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn list_networks_parses_and_sends_auth_header() {
        let body = r#"[{"id":"00000000000000aa","name":"lan","status":"OK",
            "allowManaged":true,"allowGlobal":false,"allowDefault":false}]"#;
        let (url, request) = serve_once("200 OK", body).await;

        let networks = client(&url).list_networks().await.unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].id, NetworkId(0xaa));
        assert!(networks[0].connected);

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /network HTTP/1.1"));
        assert!(head.to_lowercase().contains("x-meshd-auth: sekrit"));
    }

    #[tokio::test]
    async fn node_status_parses() {
        let (url, _request) =
            serve_once("200 OK", r#"{"address":"89e92ceee5","online":true,"version":"1.4.2"}"#)
                .await;

        let status = client(&url).node_status().await.unwrap();
        assert_eq!(status.address, "89e92ceee5");
        assert!(status.online);
    }

    #[tokio::test]
    async fn join_network_posts_options_to_id_path() {
        let (url, request) = serve_once("200 OK", "{}").await;

        let options = JoinOptions {
            allow_managed: true,
            allow_global: false,
            allow_default: true,
        };
        client(&url)
            .join_network(NetworkId(0xbeef), &options)
            .await
            .unwrap();

        let head = request.await.unwrap();
        assert!(head.starts_with("POST /network/000000000000beef HTTP/1.1"));
    }

    #[tokio::test]
    async fn leave_network_issues_delete() {
        let (url, request) = serve_once("200 OK", "{}").await;

        client(&url).leave_network(NetworkId(0x1)).await.unwrap();

        let head = request.await.unwrap();
        assert!(head.starts_with("DELETE /network/0000000000000001 HTTP/1.1"));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_rejected_with_body() {
        let (url, _request) = serve_once("401 Unauthorized", "authorization required").await;

        let err = client(&url).list_networks().await.unwrap_err();
        match err {
            DaemonError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "authorization required");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_daemon_maps_to_connection_unavailable() {
        // Bind then drop to find a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .node_status()
            .await
            .unwrap_err();
        assert!(matches!(err, DaemonError::ConnectionUnavailable(_)));
    }

    #[tokio::test]
    async fn slow_daemon_maps_to_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // Accept and then never answer.
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = DaemonClient::new(
            format!("http://{addr}"),
            "sekrit",
            Duration::from_millis(100),
        )
        .unwrap();
        let err = client.list_networks().await.unwrap_err();
        assert!(matches!(err, DaemonError::Timeout));

        server.abort();
    }

    #[tokio::test]
    async fn malformed_body_maps_to_invalid_response() {
        let (url, _request) = serve_once("200 OK", "not json").await;

        let err = client(&url).list_networks().await.unwrap_err();
        assert!(matches!(err, DaemonError::InvalidResponse(_)));
    }

    #[test]
    fn token_with_control_bytes_is_rejected() {
        let err = DaemonClient::new("http://127.0.0.1:1", "bad\ntoken", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, DaemonError::InvalidToken));
    }
}
