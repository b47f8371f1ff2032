use super::schema::{AppConfig, PartialConfig};

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            base_url: self.base_url.or(fallback.base_url),
            request_timeout_secs: self.request_timeout_secs.or(fallback.request_timeout_secs),
            spawn_stagger_ms: self.spawn_stagger_ms.or(fallback.spawn_stagger_ms),
            poll_interval_secs: self.poll_interval_secs.or(fallback.poll_interval_secs),
            notice_ttl_secs: self.notice_ttl_secs.or(fallback.notice_ttl_secs),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    pub fn finalize(self) -> AppConfig {
        AppConfig {
            base_url: self
                .base_url
                .unwrap_or_else(|| "http://127.0.0.1:3000".to_string()),
            request_timeout_secs: self.request_timeout_secs.unwrap_or(30),
            spawn_stagger_ms: self.spawn_stagger_ms.unwrap_or(400),
            poll_interval_secs: self.poll_interval_secs.unwrap_or(10),
            notice_ttl_secs: self.notice_ttl_secs.unwrap_or(3),
        }
    }
}
