//! Transient operator notices.
//!
//! Round summaries ("Spawned 2 agent(s)", a failure reason) are shown for a
//! few seconds and then clear on their own, regardless of further activity.
//! [`NoticeBoard`] holds at most one notice and clears it lazily on read.

use std::time::{Duration, Instant};

/// One message with a posting time and time-to-live.
#[derive(Clone, Debug)]
pub struct Notice {
    pub text: String,
    posted_at: Instant,
    ttl: Duration,
}

impl Notice {
    pub fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            posted_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.posted_at.elapsed() >= self.ttl
    }
}

/// Single-slot notice holder with a fixed TTL.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Post a notice, replacing any previous one and resetting the clock.
    pub fn post(&mut self, text: impl Into<String>) {
        self.current = Some(Notice::new(text, self.ttl));
    }

    /// The current notice text, or `None` once it has expired.
    pub fn current(&mut self) -> Option<&str> {
        if self.current.as_ref().is_some_and(Notice::is_expired) {
            self.current = None;
        }
        self.current.as_ref().map(|n| n.text.as_str())
    }
}
