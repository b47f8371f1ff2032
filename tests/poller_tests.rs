use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use swarmgate::client::{EpicApi, SpawnOutcome};
use swarmgate::error::ClientError;
use swarmgate::poll::start_refresh_loop;
use swarmgate::queue::{QueueState, SwarmMode, SwarmSettings};

// ─── Counting mock client ─────────────────────────────────────────────

struct MockClient {
    refreshes: AtomicUsize,
    /// When set, the first refresh fails.
    fail_first: AtomicBool,
}

impl MockClient {
    fn new() -> Self {
        Self {
            refreshes: AtomicUsize::new(0),
            fail_first: AtomicBool::new(false),
        }
    }

    fn failing_first() -> Self {
        let client = Self::new();
        client.fail_first.store(true, Ordering::SeqCst);
        client
    }

    fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl EpicApi for MockClient {
    async fn spawn_next(&self) -> Result<Option<SpawnOutcome>, ClientError> {
        Ok(None)
    }

    async fn refresh_state(&self) -> Result<QueueState, ClientError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst);
        if n == 0 && self.fail_first.load(Ordering::SeqCst) {
            return Err(ClientError::Decode("garbled body".to_string()));
        }
        Ok(QueueState {
            epic_id: "epic-1".to_string(),
            children: vec![],
            settings: SwarmSettings {
                mode: SwarmMode::Sequential,
                max_concurrent: 1,
            },
        })
    }

    async fn stop(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

async fn recv_state(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<QueueState>,
) -> QueueState {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a refresh")
        .expect("poller channel closed unexpectedly")
}

// ============================================================
// Refresh cadence
// ============================================================

#[tokio::test]
async fn poller_delivers_successive_snapshots() {
    let client = Arc::new(MockClient::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = start_refresh_loop(client.clone(), Duration::from_millis(10), tx);

    let first = recv_state(&mut rx).await;
    assert_eq!(first.epic_id, "epic-1");
    let _second = recv_state(&mut rx).await;
    assert!(client.refreshes() >= 2);

    handle.shutdown().await;
}

#[tokio::test]
async fn refresh_error_does_not_kill_loop() {
    let client = Arc::new(MockClient::failing_first());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = start_refresh_loop(client.clone(), Duration::from_millis(10), tx);

    // First attempt fails and is logged; a snapshot still arrives.
    let state = recv_state(&mut rx).await;
    assert_eq!(state.epic_id, "epic-1");
    assert!(client.refreshes() >= 2);

    handle.shutdown().await;
}

// ============================================================
// Stopping
// ============================================================

#[tokio::test]
async fn shutdown_halts_refreshes() {
    let client = Arc::new(MockClient::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = start_refresh_loop(client.clone(), Duration::from_millis(10), tx);

    let _ = recv_state(&mut rx).await;
    handle.shutdown().await;

    let after = client.refreshes();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.refreshes(), after, "poller kept refreshing after shutdown");
}

#[tokio::test]
async fn double_stop_is_a_noop() {
    let client = Arc::new(MockClient::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = start_refresh_loop(client.clone(), Duration::from_millis(10), tx);

    let _ = recv_state(&mut rx).await;
    handle.stop();
    handle.stop();
    handle.shutdown().await;
}

#[tokio::test]
async fn dropped_receiver_ends_the_loop() {
    let client = Arc::new(MockClient::new());
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = start_refresh_loop(client.clone(), Duration::from_millis(10), tx);

    drop(rx);
    // The next tick's send fails and the task exits on its own.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let after = client.refreshes();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.refreshes(), after);

    handle.shutdown().await;
}
