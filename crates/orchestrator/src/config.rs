use feedchat_cache::CacheConfig;
use serde::Deserialize;
use std::time::Duration;

/// Orchestrator settings, TOML-deserializable with per-field defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Global item budget for the analysis preview.
    pub summary_max_items: usize,
    /// Shared deadline for one multi-path dispatch.
    pub route_timeout_ms: u64,
    /// Templated reply for chitchat queries.
    pub chitchat_reply: String,
    pub cache: CacheConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            summary_max_items: 40,
            route_timeout_ms: 10_000,
            chitchat_reply: "Hi! Ask me about your feeds, for example: \"latest rust news\"."
                .to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).map_err(Into::into)
    }

    #[must_use]
    pub const fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms)
    }
}
