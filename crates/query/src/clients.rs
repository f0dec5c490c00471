use async_trait::async_trait;
use feedchat_protocol::{FetchStatus, Origin, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What one feed-gateway fetch returned. The gateway may retry and fail
/// over between a primary and a degraded endpoint internally; only the
/// `origin` flag of that failover is visible here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub origin: Origin,
    pub records: Vec<Record>,
    pub error: Option<String>,
}

impl FetchOutcome {
    #[must_use]
    pub fn success(origin: Origin, records: Vec<Record>) -> Self {
        Self {
            status: FetchStatus::Success,
            origin,
            records,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(origin: Origin, detail: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Error,
            origin,
            records: Vec::new(),
            error: Some(detail.into()),
        }
    }
}

/// What the retrieval engine resolved a query to: one or more routed paths
/// plus confidence/reasoning metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalOutcome {
    pub paths: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
}

/// Client performing the actual network fetch against a routed path.
/// A shared, reusable connection whose lifecycle is owned by the
/// surrounding application.
#[async_trait]
pub trait FeedGateway: Send + Sync {
    async fn fetch(&self, path: &str) -> anyhow::Result<FetchOutcome>;
}

/// Engine mapping free text (plus filters) to structured routed paths.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    async fn resolve(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
    ) -> anyhow::Result<RetrievalOutcome>;
}
