//! Bounded admission rounds: bring up to `spawnable_count` ready children
//! into progress, one spawn request at a time.
//!
//! **Concurrency model:** a round holds the controller's gate (a
//! `tokio::sync::Mutex<()>` acquired with `try_lock`) for its entire
//! duration, including stagger sleeps, so two rounds can never overlap on
//! the same controller. Refresh polling is independent and never blocks on
//! the gate. Every await inside the loop is a yield point -- backend state
//! may move underneath the round, which is accepted: the attempt budget is
//! computed once at round start, and the next round recomputes it fresh.
//!
//! **Failure model:** nothing escapes `run_round`. Expected negatives end
//! the round quietly; backend-reported faults and transport errors end it
//! with a recorded failure. No in-round retry -- a failed attempt is
//! assumed to indicate a systemic condition (resource exhaustion, lock
//! contention) that an immediate retry would only aggravate.

use std::time::Duration;

use tokio::sync::Mutex;

use crate::client::{EpicApi, SpawnOutcome};
use crate::queue::{self, QueueState};

/// Why a round was skipped without issuing any requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No ready children, or the policy admits no more workers.
    NothingToSpawn,
    /// Another round already holds the gate.
    RoundInProgress,
}

/// What one admission round did.
#[derive(Clone, Debug, Default)]
pub struct RoundReport {
    /// Spawn requests actually issued.
    pub attempted: usize,
    /// Requests the backend answered with a started session.
    pub spawned: usize,
    /// Failure that ended the round early, if any.
    pub failure: Option<String>,
}

impl RoundReport {
    /// Operator-facing summary, if the round warrants one.
    ///
    /// Partial success reads as success: a round that spawned 2 of 3 says
    /// so and leaves the remainder to the next round. A round that only
    /// hit the expected negative says nothing.
    pub fn notice(&self) -> Option<String> {
        if self.spawned > 0 {
            Some(format!("Spawned {} agent(s)", self.spawned))
        } else if let Some(failure) = &self.failure {
            if failure.is_empty() {
                Some("Failed to spawn agent".to_string())
            } else {
                Some(failure.clone())
            }
        } else {
            None
        }
    }
}

/// Result of invoking [`AdmissionController::run_round`]. Infallible by
/// construction -- errors are absorbed into the report.
#[derive(Clone, Debug)]
pub enum RoundOutcome {
    Skipped(SkipReason),
    Finished(RoundReport),
}

impl RoundOutcome {
    pub fn report(&self) -> Option<&RoundReport> {
        match self {
            RoundOutcome::Finished(report) => Some(report),
            RoundOutcome::Skipped(_) => None,
        }
    }
}

/// Drives admission rounds against one epic's backend.
pub struct AdmissionController<C> {
    client: C,
    /// Delay between consecutive spawn requests in a round, to avoid a
    /// thundering herd of simultaneous remote process launches.
    stagger: Duration,
    /// Round gate. `try_lock` rather than a boolean flag so the check and
    /// the set are one atomic step.
    gate: Mutex<()>,
}

impl<C: EpicApi> AdmissionController<C> {
    pub fn new(client: C, stagger: Duration) -> Self {
        Self {
            client,
            stagger,
            gate: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one admission round against the given queue snapshot.
    ///
    /// Issues at most `spawnable_count(settings, children)` spawn requests
    /// sequentially, pausing `stagger` between them, and stops early on the
    /// first expected negative, reported fault, or transport error. A
    /// re-entrant call while a round is running skips without side effects.
    pub async fn run_round(&self, state: &QueueState) -> RoundOutcome {
        let to_spawn = queue::spawnable_count(&state.settings, &state.children);
        if to_spawn == 0 {
            return RoundOutcome::Skipped(SkipReason::NothingToSpawn);
        }

        // Held until the round ends, across all awaits below.
        let Ok(_guard) = self.gate.try_lock() else {
            tracing::debug!(epic_id = %state.epic_id, "admission round already running");
            return RoundOutcome::Skipped(SkipReason::RoundInProgress);
        };

        tracing::info!(epic_id = %state.epic_id, to_spawn, "starting admission round");

        let mut report = RoundReport::default();
        for attempt in 0..to_spawn {
            report.attempted += 1;
            match self.client.spawn_next().await {
                Ok(Some(SpawnOutcome::Spawned(session))) => {
                    report.spawned += 1;
                    tracing::info!(
                        session_id = %session.id,
                        child_id = session.child_id.as_deref().unwrap_or("?"),
                        "worker spawned"
                    );
                }
                Ok(None) => {
                    // Server-side race: the ready child or the slot we
                    // computed against is gone. Not a failure.
                    tracing::debug!(attempt, "no eligible child server-side; ending round");
                    break;
                }
                Ok(Some(SpawnOutcome::Failed { reason })) => {
                    tracing::warn!(attempt, reason = %reason, "spawn attempt failed; ending round");
                    report.failure = Some(reason);
                    break;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "spawn request errored; ending round");
                    report.failure = Some(e.to_string());
                    break;
                }
            }

            if attempt + 1 < to_spawn && !self.stagger.is_zero() {
                tokio::time::sleep(self.stagger).await;
            }
        }

        tracing::info!(
            epic_id = %state.epic_id,
            attempted = report.attempted,
            spawned = report.spawned,
            failed = report.failure.is_some(),
            "admission round finished"
        );
        RoundOutcome::Finished(report)
    }
}
