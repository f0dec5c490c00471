use crate::panel::{Block, DatasetMap};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a fetch or a merged query produced usable data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Success,
    Error,
}

/// Which upstream endpoint actually answered a fetch. Failover between the
/// two is opaque to this core beyond this flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Primary,
    Degraded,
}

/// Result of fetching one routed path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteResult {
    pub path: String,
    pub status: FetchStatus,
    pub origin: Origin,
    pub records: Vec<Record>,
    pub error: Option<String>,
}

impl RouteResult {
    #[must_use]
    pub fn success(path: impl Into<String>, origin: Origin, records: Vec<Record>) -> Self {
        Self {
            path: path.into(),
            status: FetchStatus::Success,
            origin,
            records,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(path: impl Into<String>, origin: Origin, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FetchStatus::Error,
            origin,
            records: Vec::new(),
            error: Some(detail.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}

/// Cache-hit flags reported separately per layer: a query may hit the
/// retrieval layer and miss the route-data layer, or the other way around.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheHitFlags {
    pub retrieval: bool,
    pub route_data: bool,
}

/// Unified result of resolving one query across every routed path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub status: FetchStatus,
    /// Records merged in path order, then path-internal order.
    pub records: Vec<Record>,
    pub cache: CacheHitFlags,
    pub origin: Origin,
    pub paths: Vec<String>,
    /// Ordered per-route results, kept so callers can build per-source
    /// panels without refetching.
    pub routes: Vec<RouteResult>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
    /// Per-path error details for routes that contributed nothing.
    #[serde(default)]
    pub route_errors: BTreeMap<String, String>,
}

/// What kind of query the classifier decided this is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    DataQuery,
    Chitchat,
}

/// Classifier output. Confidence is always within `[0.5, 0.99]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IntentDecision {
    pub intent: IntentKind,
    pub confidence: f64,
}

/// Fixed metadata record attached to every chat response.
///
/// Every key is always present by name; absent information serializes as an
/// explicit `null`, never an omitted key. Renderers rely on this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseMetadata {
    pub intent_type: Option<IntentKind>,
    pub intent_confidence: Option<f64>,
    pub cache_hit: Option<CacheHitFlags>,
    pub source: Option<Origin>,
    pub generated_path: Option<String>,
    pub reasoning: Option<String>,
}

/// The orchestrator's response envelope: the sole output of `chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub success: bool,
    pub intent: IntentKind,
    pub message: String,
    pub records: Option<Vec<Record>>,
    pub metadata: ResponseMetadata,
    /// Renderer-facing result tree; empty when there is nothing to draw.
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Datasets that reference-bearing blocks resolve against. Scoped to
    /// this response.
    #[serde(default)]
    pub datasets: DatasetMap,
}

impl ChatResponse {
    /// A failure envelope that still carries intent metadata. The
    /// orchestrator never throws past its boundary; it answers with this.
    #[must_use]
    pub fn failure(intent: IntentKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            intent,
            message: message.into(),
            records: None,
            metadata: ResponseMetadata {
                intent_type: Some(intent),
                ..ResponseMetadata::default()
            },
            blocks: Vec::new(),
            datasets: DatasetMap::new(),
        }
    }
}
