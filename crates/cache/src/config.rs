use serde::Deserialize;

/// TTL and capacity settings per namespace. TTLs are configuration, not
/// hardcoded: route data ages out after 10 minutes by default, the two
/// result-caching namespaces after an hour.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub route_data_ttl_ms: u64,
    pub retrieval_ttl_ms: u64,
    pub summary_ttl_ms: u64,
    /// Maximum live entries per namespace before oldest-expiring entries
    /// are dropped.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            route_data_ttl_ms: 10 * 60 * 1000,
            retrieval_ttl_ms: 60 * 60 * 1000,
            summary_ttl_ms: 60 * 60 * 1000,
            capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_namespace_policy() {
        let config = CacheConfig::default();
        assert_eq!(config.route_data_ttl_ms, 600_000);
        assert_eq!(config.retrieval_ttl_ms, 3_600_000);
        assert_eq!(config.summary_ttl_ms, 3_600_000);
        assert_eq!(config.capacity, 1024);
    }

    #[test]
    fn deserializes_from_toml_with_partial_overrides() {
        let config: CacheConfig = toml::from_str(
            r#"
            route_data_ttl_ms = 1000
            capacity = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.route_data_ttl_ms, 1000);
        assert_eq!(config.capacity, 8);
        assert_eq!(config.retrieval_ttl_ms, 3_600_000);
    }
}
