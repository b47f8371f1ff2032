use serde::Deserialize;

/// The TOML file structure for swarmgate.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub swarm: Option<SwarmConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SwarmConfig {
    /// Delay between consecutive spawn requests within a round.
    pub spawn_stagger_ms: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub notice_ttl_secs: Option<u64>,
}

/// Fully-resolved runtime configuration. All fields have values.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub spawn_stagger_ms: u64,
    pub poll_interval_secs: u64,
    pub notice_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        PartialConfig::default().finalize()
    }
}

/// Partial config used during merge. All fields are Option so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub spawn_stagger_ms: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub notice_ttl_secs: Option<u64>,
}

impl ConfigFile {
    pub fn to_partial(self) -> PartialConfig {
        let api = self.api;
        let swarm = self.swarm;
        PartialConfig {
            base_url: api.as_ref().and_then(|a| a.base_url.clone()),
            request_timeout_secs: api.as_ref().and_then(|a| a.request_timeout_secs),
            spawn_stagger_ms: swarm.as_ref().and_then(|s| s.spawn_stagger_ms),
            poll_interval_secs: swarm.as_ref().and_then(|s| s.poll_interval_secs),
            notice_ttl_secs: swarm.as_ref().and_then(|s| s.notice_ttl_secs),
        }
    }
}
