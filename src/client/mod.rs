//! Backend contract for epic swarm control.
//!
//! [`EpicApi`] is the capability the admission controller and refresh
//! poller require from the backend: spawn one worker for the next ready
//! child, pull the current queue state, and stop admitting new work. The
//! production implementation is [`http::HttpEpicClient`]; tests script the
//! trait directly.

pub mod http;

pub use http::HttpEpicClient;

use serde::Deserialize;

use crate::error::ClientError;
use crate::queue::QueueState;

/// A worker session the backend started for a child task.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentSession {
    /// Session identifier minted by the backend.
    pub id: String,
    /// The child the session was bound to, when the backend reports it.
    #[serde(default)]
    pub child_id: Option<String>,
}

/// Outcome of one spawn attempt.
///
/// A sum type rather than a `success` flag plus optional error string, so
/// a "success with an error message" cannot exist. The expected negative
/// (no eligible child, or the server's own capacity check declined) is not
/// an outcome at all -- the client returns `Ok(None)` for it.
#[derive(Clone, Debug)]
pub enum SpawnOutcome {
    /// The backend started a worker.
    Spawned(AgentSession),
    /// The backend reported a fault (dependency conflict, resource lock).
    Failed { reason: String },
}

/// Capability required from the backend.
///
/// `spawn_next` is never called concurrently with itself -- the admission
/// controller serializes attempts within a round and rounds are mutually
/// exclusive. `refresh_state` is idempotent and side-effect-free; callers
/// apply results last-write-wins.
pub trait EpicApi {
    /// Ask the backend to spawn one worker for the next ready child.
    ///
    /// `Ok(None)` means no eligible child or a server-side capacity denial
    /// (an expected negative, not a fault).
    fn spawn_next(
        &self,
    ) -> impl Future<Output = Result<Option<SpawnOutcome>, ClientError>> + Send;

    /// Pull the current children/settings snapshot for the epic.
    fn refresh_state(&self) -> impl Future<Output = Result<QueueState, ClientError>> + Send;

    /// Tell the backend to stop admitting new work for this epic.
    /// Running workers are unaffected, as is any round already in flight.
    fn stop(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Wire shape of the spawn-next response: `{ session?: {...}, error?: str }`.
#[derive(Debug, Deserialize)]
pub(crate) struct SpawnNextResponse {
    #[serde(default)]
    session: Option<AgentSession>,
    #[serde(default)]
    error: Option<String>,
}

impl SpawnNextResponse {
    /// Map the wire response to a domain outcome.
    ///
    /// `error` wins when both fields are present: a fault alongside a
    /// half-created session is still a fault. Neither field present is the
    /// expected negative.
    pub(crate) fn into_outcome(self) -> Option<SpawnOutcome> {
        match (self.error, self.session) {
            (Some(reason), _) => Some(SpawnOutcome::Failed { reason }),
            (None, Some(session)) => Some(SpawnOutcome::Spawned(session)),
            (None, None) => None,
        }
    }
}
