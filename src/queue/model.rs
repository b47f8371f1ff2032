//! Queue model for an epic's child tasks.
//!
//! These types form the shared vocabulary between the backend wire format,
//! the [`crate::admission::AdmissionController`], and the CLI output. The
//! derivations at the bottom (`partition`, `available_slots`,
//! `spawnable_count`) are pure and total -- no side effects, no error cases.
//!
//! Child status is ground truth for admission arithmetic: the count of
//! in-progress children is what bounds new spawns, not any externally
//! tracked set of worker handles. The two can diverge briefly when a worker
//! exists but its child's status has not been refreshed yet; we trust the
//! children.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a child task. Closed set -- an unknown status on the
/// wire is a decode error, never silently mapped to a default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildStatus {
    /// Dependencies resolved; eligible for admission.
    Ready,
    /// A remote worker is bound to it.
    InProgress,
    /// Waiting on unresolved dependencies.
    Blocked,
    /// The remote worker finished.
    Completed,
}

impl std::fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChildStatus::Ready => "ready",
            ChildStatus::InProgress => "in_progress",
            ChildStatus::Blocked => "blocked",
            ChildStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// One unit of work under a parent epic.
///
/// The client never flips `status` locally. Transitions happen server-side
/// and are observed through [`crate::client::EpicApi::refresh_state`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpicChild {
    /// Unique identifier minted by the backend.
    pub id: String,
    /// Human-readable label.
    pub title: String,
    pub status: ChildStatus,
    /// Worker session bound to this child; present iff `status` is
    /// `InProgress` (server-owned invariant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

/// Concurrency policy for admitting ready children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmMode {
    /// At most one child in progress at a time.
    Sequential,
    /// At most `max_concurrent` children in progress.
    Parallel,
}

/// Admission policy attached to an epic.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SwarmSettings {
    pub mode: SwarmMode,
    /// Upper bound on concurrent workers. Meaningful only under
    /// [`SwarmMode::Parallel`]; the wire may omit it for sequential epics.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    1
}

/// Snapshot of an epic's queue as reported by the backend.
///
/// Refreshed wholesale (last-write-wins); never mutated optimistically.
/// The "is a round running" flag from the original design is not stored
/// here -- it lives in the admission controller's round gate.
#[derive(Clone, Debug, Deserialize)]
pub struct QueueState {
    pub epic_id: String,
    pub children: Vec<EpicChild>,
    pub settings: SwarmSettings,
}

/// Children partitioned by status, borrowing from the input slice.
/// Relative order within each bucket matches the input.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub ready: Vec<&'a EpicChild>,
    pub in_progress: Vec<&'a EpicChild>,
    pub blocked: Vec<&'a EpicChild>,
    pub completed: Vec<&'a EpicChild>,
}

/// Stable partition of children by status.
pub fn partition(children: &[EpicChild]) -> Partition<'_> {
    let mut p = Partition::default();
    for child in children {
        match child.status {
            ChildStatus::Ready => p.ready.push(child),
            ChildStatus::InProgress => p.in_progress.push(child),
            ChildStatus::Blocked => p.blocked.push(child),
            ChildStatus::Completed => p.completed.push(child),
        }
    }
    p
}

/// Number of children currently being worked.
pub fn active_worker_count(children: &[EpicChild]) -> usize {
    children
        .iter()
        .filter(|c| c.status == ChildStatus::InProgress)
        .count()
}

/// How many more workers the policy admits given the active count.
/// Never negative: an over-subscribed parallel epic yields 0.
pub fn available_slots(settings: &SwarmSettings, active: usize) -> usize {
    match settings.mode {
        SwarmMode::Sequential => usize::from(active == 0),
        SwarmMode::Parallel => settings.max_concurrent.saturating_sub(active),
    }
}

/// How many spawn attempts a round may issue: bounded by both the policy
/// and the number of ready children.
pub fn spawnable_count(settings: &SwarmSettings, children: &[EpicChild]) -> usize {
    let ready = partition(children).ready.len();
    available_slots(settings, active_worker_count(children)).min(ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(id: &str, status: ChildStatus) -> EpicChild {
        EpicChild {
            id: id.to_string(),
            title: format!("task {id}"),
            status,
            assignee: matches!(status, ChildStatus::InProgress)
                .then(|| format!("agent-{id}")),
        }
    }

    fn sequential() -> SwarmSettings {
        SwarmSettings {
            mode: SwarmMode::Sequential,
            max_concurrent: 1,
        }
    }

    fn parallel(max: usize) -> SwarmSettings {
        SwarmSettings {
            mode: SwarmMode::Parallel,
            max_concurrent: max,
        }
    }

    #[test]
    fn partition_preserves_input_order() {
        let children = vec![
            child("a", ChildStatus::Ready),
            child("b", ChildStatus::Blocked),
            child("c", ChildStatus::Ready),
            child("d", ChildStatus::InProgress),
            child("e", ChildStatus::Ready),
        ];
        let p = partition(&children);
        let ready_ids: Vec<&str> = p.ready.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ready_ids, vec!["a", "c", "e"]);
        assert_eq!(p.in_progress.len(), 1);
        assert_eq!(p.blocked.len(), 1);
        assert!(p.completed.is_empty());
    }

    #[test]
    fn active_worker_count_counts_in_progress_only() {
        let children = vec![
            child("a", ChildStatus::InProgress),
            child("b", ChildStatus::Completed),
            child("c", ChildStatus::InProgress),
        ];
        assert_eq!(active_worker_count(&children), 2);
        assert_eq!(active_worker_count(&[]), 0);
    }

    #[test]
    fn sequential_slots_one_iff_idle() {
        assert_eq!(available_slots(&sequential(), 0), 1);
        assert_eq!(available_slots(&sequential(), 1), 0);
        assert_eq!(available_slots(&sequential(), 5), 0);
    }

    #[test]
    fn parallel_slots_saturate_at_zero() {
        assert_eq!(available_slots(&parallel(3), 0), 3);
        assert_eq!(available_slots(&parallel(3), 2), 1);
        assert_eq!(available_slots(&parallel(3), 3), 0);
        // Over-subscribed (settings lowered mid-flight): still 0, not negative.
        assert_eq!(available_slots(&parallel(3), 7), 0);
    }

    #[test]
    fn spawnable_bounded_by_ready_count() {
        let children = vec![
            child("a", ChildStatus::Ready),
            child("b", ChildStatus::Blocked),
        ];
        assert_eq!(spawnable_count(&parallel(5), &children), 1);
    }

    #[test]
    fn spawnable_bounded_by_slots() {
        // parallel m=2, one in progress, three ready => min(2-1, 3) = 1
        let children = vec![
            child("a", ChildStatus::InProgress),
            child("b", ChildStatus::Ready),
            child("c", ChildStatus::Ready),
            child("d", ChildStatus::Ready),
        ];
        assert_eq!(spawnable_count(&parallel(2), &children), 1);
    }

    #[test]
    fn spawnable_sequential_caps_at_one() {
        let children: Vec<EpicChild> = (0..5)
            .map(|i| child(&i.to_string(), ChildStatus::Ready))
            .collect();
        assert_eq!(spawnable_count(&sequential(), &children), 1);
    }

    #[test]
    fn spawnable_zero_when_sequential_busy() {
        let children = vec![
            child("a", ChildStatus::InProgress),
            child("b", ChildStatus::Ready),
        ];
        assert_eq!(spawnable_count(&sequential(), &children), 0);
    }

    #[test]
    fn child_status_wire_names() {
        let json = r#"{"id":"t1","title":"x","status":"in_progress","assignee":"a9"}"#;
        let c: EpicChild = serde_json::from_str(json).unwrap();
        assert_eq!(c.status, ChildStatus::InProgress);
        assert_eq!(c.assignee.as_deref(), Some("a9"));
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let json = r#"{"id":"t1","title":"x","status":"paused"}"#;
        assert!(serde_json::from_str::<EpicChild>(json).is_err());
    }

    #[test]
    fn settings_default_max_concurrent() {
        let s: SwarmSettings = serde_json::from_str(r#"{"mode":"sequential"}"#).unwrap();
        assert_eq!(s.max_concurrent, 1);
        assert_eq!(s.mode, SwarmMode::Sequential);
    }
}
