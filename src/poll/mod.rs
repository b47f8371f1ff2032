//! Periodic refresh of an epic's queue state.
//!
//! [`start_refresh_loop`] spawns a tokio task that pulls
//! [`crate::client::EpicApi::refresh_state`] on a fixed interval and sends
//! each snapshot over an unbounded channel. The refresh is awaited inline
//! in the loop, so two refreshes can never be in flight at once; a slow
//! refresh simply delays the next tick.
//!
//! The returned [`PollHandle`] owns a [`CancellationToken`]: `stop` is
//! idempotent (double-stop is a no-op), and `shutdown` additionally joins
//! the task with a bounded timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::EpicApi;
use crate::queue::QueueState;

/// Stop/dispose handle for a running refresh loop.
///
/// The caller is expected to invoke [`stop`](Self::stop) (or
/// [`shutdown`](Self::shutdown)) on teardown; dropping the handle without
/// stopping leaves the task running until its channel receiver is dropped.
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Signal the loop to exit. Safe to call any number of times.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop the loop and wait for the task to finish, bounded at 5 seconds.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
    }
}

/// Spawn the refresh loop for `client`, sending each snapshot on `tx`.
///
/// Refresh errors are logged and retried on the next tick; they never kill
/// the loop. The loop also exits when the receiving side of `tx` is gone.
pub fn start_refresh_loop<C>(
    client: Arc<C>,
    interval: Duration,
    tx: UnboundedSender<QueueState>,
) -> PollHandle
where
    C: EpicApi + Send + Sync + 'static,
{
    let token = CancellationToken::new();
    let loop_token = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // A refresh slower than the interval delays subsequent ticks
        // instead of bursting to catch up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = loop_token.cancelled() => break,
                _ = ticker.tick() => {
                    match client.refresh_state().await {
                        Ok(state) => {
                            if tx.send(state).is_err() {
                                // Receiver dropped; nobody is watching.
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "refresh failed; retrying next tick");
                        }
                    }
                }
            }
        }
    });

    PollHandle { token, task }
}
