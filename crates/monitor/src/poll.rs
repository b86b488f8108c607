//! The polling task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use meshbar_protocol::MonitorEvent;

use crate::source::StatusSource;

/// Monitor settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between daemon polls.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Handle to the spawned polling task.
pub struct StatusMonitor {
    handle: tokio::task::JoinHandle<()>,
    cancel: CancellationToken,
}

impl StatusMonitor {
    /// Spawns the polling loop. The first poll fires immediately so the
    /// controller is primed at startup without waiting a full interval.
    pub fn spawn(
        source: Arc<dyn StatusSource>,
        events_tx: mpsc::Sender<MonitorEvent>,
        config: MonitorConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(source, events_tx, config, cancel.clone()));
        Self { handle, cancel }
    }

    /// Stops the polling loop and waits for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    events_tx: mpsc::Sender<MonitorEvent>,
    config: MonitorConfig,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.poll_interval);
    debug!(interval = ?config.poll_interval, "status monitor started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("status monitor stopped");
                return;
            }
            _ = ticker.tick() => {
                if !poll_once(source.as_ref(), &events_tx).await {
                    // Controller gone; no reason to keep polling.
                    return;
                }
            }
        }
    }
}

/// One poll: list then status. Query failures are expected while the
/// daemon restarts, so they are logged quietly and the tick is skipped —
/// the next one retries naturally. Returns `false` when the receiver is
/// gone.
async fn poll_once(source: &dyn StatusSource, events_tx: &mpsc::Sender<MonitorEvent>) -> bool {
    match source.list_networks().await {
        Ok(networks) => {
            if events_tx
                .send(MonitorEvent::NetworkListChanged(networks))
                .await
                .is_err()
            {
                return false;
            }
        }
        Err(err) => debug!(error = %err, "network list poll failed"),
    }

    match source.node_status().await {
        Ok(status) => {
            if events_tx
                .send(MonitorEvent::NodeStatusChanged(status))
                .await
                .is_err()
            {
                return false;
            }
        }
        Err(err) => debug!(error = %err, "node status poll failed"),
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use meshbar_daemon_client::DaemonError;
    use meshbar_protocol::{NetworkId, NetworkRecord, NodeStatus};

    use crate::source::SourceFuture;

    /// Fake source with per-call scripts; an exhausted script answers
    /// with a connection error.
    struct FakeSource {
        list_results: Mutex<Vec<Result<Vec<NetworkRecord>, DaemonError>>>,
        status_results: Mutex<Vec<Result<NodeStatus, DaemonError>>>,
    }

    impl FakeSource {
        fn new(
            list_results: Vec<Result<Vec<NetworkRecord>, DaemonError>>,
            status_results: Vec<Result<NodeStatus, DaemonError>>,
        ) -> Self {
            Self {
                list_results: Mutex::new(list_results),
                status_results: Mutex::new(status_results),
            }
        }
    }

    fn unavailable() -> DaemonError {
        DaemonError::ConnectionUnavailable("connection refused".into())
    }

    impl StatusSource for FakeSource {
        fn list_networks(&self) -> SourceFuture<'_, Vec<NetworkRecord>> {
            let mut queue = self.list_results.lock().unwrap();
            let result = if queue.is_empty() {
                Err(unavailable())
            } else {
                queue.remove(0)
            };
            Box::pin(async move { result })
        }

        fn node_status(&self) -> SourceFuture<'_, NodeStatus> {
            let mut queue = self.status_results.lock().unwrap();
            let result = if queue.is_empty() {
                Err(unavailable())
            } else {
                queue.remove(0)
            };
            Box::pin(async move { result })
        }
    }

    fn net(id: u64) -> NetworkRecord {
        NetworkRecord {
            id: NetworkId(id),
            name: String::new(),
            connected: true,
            allow_managed: true,
            allow_global: false,
            allow_default: false,
        }
    }

    fn status() -> NodeStatus {
        NodeStatus {
            address: "89e92ceee5".into(),
            online: true,
            version: "1.4.2".into(),
        }
    }

    async fn recv(events: &mut mpsc::Receiver<MonitorEvent>) -> MonitorEvent {
        tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for monitor event")
            .expect("monitor channel closed")
    }

    #[tokio::test]
    async fn first_tick_emits_list_then_status() {
        let source = Arc::new(FakeSource::new(
            vec![Ok(vec![net(0x1)])],
            vec![Ok(status())],
        ));
        let (tx, mut rx) = mpsc::channel(16);
        let monitor = StatusMonitor::spawn(source, tx, MonitorConfig::default());

        match recv(&mut rx).await {
            MonitorEvent::NetworkListChanged(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].id, NetworkId(0x1));
            }
            other => panic!("expected list event first, got {other:?}"),
        }
        match recv(&mut rx).await {
            MonitorEvent::NodeStatusChanged(s) => assert_eq!(s.address, "89e92ceee5"),
            other => panic!("expected status event second, got {other:?}"),
        }

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn failed_list_query_is_skipped_status_still_emitted() {
        let source = Arc::new(FakeSource::new(vec![Err(unavailable())], vec![Ok(status())]));
        let (tx, mut rx) = mpsc::channel(16);
        let monitor = StatusMonitor::spawn(source, tx, MonitorConfig::default());

        match recv(&mut rx).await {
            MonitorEvent::NodeStatusChanged(_) => {}
            other => panic!("expected only the status event, got {other:?}"),
        }

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn polls_again_after_the_interval() {
        let source = Arc::new(FakeSource::new(
            vec![Ok(vec![net(0x1)]), Ok(vec![net(0x1), net(0x2)])],
            vec![Err(unavailable()), Err(unavailable())],
        ));
        let (tx, mut rx) = mpsc::channel(16);
        let config = MonitorConfig {
            poll_interval: Duration::from_millis(20),
        };
        let monitor = StatusMonitor::spawn(source, tx, config);

        match recv(&mut rx).await {
            MonitorEvent::NetworkListChanged(list) => assert_eq!(list.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        match recv(&mut rx).await {
            MonitorEvent::NetworkListChanged(list) => assert_eq!(list.len(), 2),
            other => panic!("unexpected {other:?}"),
        }

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_stops_polling() {
        let source = Arc::new(FakeSource::new(Vec::new(), Vec::new()));
        let (tx, rx) = mpsc::channel(16);
        let monitor = StatusMonitor::spawn(
            source,
            tx,
            MonitorConfig {
                poll_interval: Duration::from_millis(10),
            },
        );
        monitor.shutdown().await;
        drop(rx);
    }

    #[tokio::test]
    async fn dropped_receiver_ends_the_task() {
        let source = Arc::new(FakeSource::new(vec![Ok(vec![net(0x1)])], Vec::new()));
        let (tx, rx) = mpsc::channel(16);
        let monitor = StatusMonitor::spawn(
            source,
            tx,
            MonitorConfig {
                poll_interval: Duration::from_millis(10),
            },
        );
        drop(rx);
        // The task notices the closed channel on its next send and exits.
        tokio::time::timeout(Duration::from_secs(2), monitor.handle)
            .await
            .expect("monitor task did not exit")
            .unwrap();
    }
}
