//! Top-level chat orchestration: intent classification, data-query
//! resolution, and cached narrative summaries. Every entry point answers
//! with a [`ChatResponse`]; errors never cross this boundary as `Err`.

use crate::clients::LanguageModel;
use crate::config::OrchestratorConfig;
use crate::intent;
use crate::panels;
use crate::sampling::{sample_preview, Dataset};
use feedchat_cache::{CacheStore, Namespace};
use feedchat_protocol::{
    ChatResponse, FetchStatus, IntentKind, QueryResult, ResponseMetadata,
};
use feedchat_query::{DataQueryService, FeedGateway, ParallelExecutor, RetrievalEngine};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct ChatService {
    resolver: DataQueryService,
    llm: Arc<dyn LanguageModel>,
    cache: Arc<CacheStore>,
    config: OrchestratorConfig,
}

impl ChatService {
    #[must_use]
    pub fn new(
        resolver: DataQueryService,
        llm: Arc<dyn LanguageModel>,
        cache: Arc<CacheStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            resolver,
            llm,
            cache,
            config,
        }
    }

    /// Wire a full service from its three clients, building the cache and
    /// the resolver from `config`.
    #[must_use]
    pub fn from_clients(
        retrieval: Arc<dyn RetrievalEngine>,
        gateway: Arc<dyn FeedGateway>,
        llm: Arc<dyn LanguageModel>,
        config: OrchestratorConfig,
    ) -> Self {
        let cache = Arc::new(CacheStore::new(config.cache.clone()));
        let resolver = DataQueryService::new(
            retrieval,
            gateway,
            Arc::clone(&cache),
            ParallelExecutor::new(config.route_timeout()),
        );
        Self::new(resolver, llm, cache, config)
    }

    /// The shared cache, exposed for stats inspection and resets.
    #[must_use]
    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Answer a user query. Chitchat short-circuits to the templated reply
    /// without touching the retrieval, gateway, or model clients.
    pub async fn chat(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        use_cache: bool,
    ) -> ChatResponse {
        let decision = intent::classify(query);
        if decision.intent == IntentKind::Chitchat {
            return ChatResponse {
                success: true,
                intent: IntentKind::Chitchat,
                message: self.config.chitchat_reply.clone(),
                records: None,
                metadata: ResponseMetadata {
                    intent_type: Some(IntentKind::Chitchat),
                    intent_confidence: Some(decision.confidence),
                    ..ResponseMetadata::default()
                },
                blocks: Vec::new(),
                datasets: feedchat_protocol::DatasetMap::new(),
            };
        }

        match self.resolver.resolve(query, filters, use_cache).await {
            Ok(result) => self.data_response(decision.confidence, result),
            Err(err) => {
                log::warn!("Query resolution failed for '{query}': {err}");
                let mut response =
                    ChatResponse::failure(IntentKind::DataQuery, format!("Could not answer that: {err}"));
                response.metadata.intent_confidence = Some(decision.confidence);
                response
            }
        }
    }

    fn data_response(&self, intent_confidence: f64, result: QueryResult) -> ChatResponse {
        let (blocks, datasets) = panels::build_route_panels(&result.routes, result.confidence);
        let answered = result.routes.iter().filter(|route| route.is_success()).count();
        let success = result.status == FetchStatus::Success;

        let message = if success {
            let mut message = format!(
                "Found {} items from {} of {} sources.",
                result.records.len(),
                answered,
                result.routes.len()
            );
            if !result.route_errors.is_empty() {
                let failed: Vec<&str> =
                    result.route_errors.keys().map(String::as_str).collect();
                message.push_str(&format!(" Unavailable: {}.", failed.join(", ")));
            }
            message
        } else {
            "Every source failed for this query.".to_string()
        };

        let metadata = ResponseMetadata {
            intent_type: Some(IntentKind::DataQuery),
            intent_confidence: Some(intent_confidence),
            cache_hit: Some(result.cache),
            source: Some(result.origin),
            generated_path: Some(result.paths.join(",")),
            reasoning: result.reasoning.clone(),
        };

        // A failed merge still reports per-route details through metadata
        // and the (empty) record list rather than dropping them.
        ChatResponse {
            success,
            intent: IntentKind::DataQuery,
            message,
            records: Some(result.records),
            metadata,
            blocks,
            datasets,
        }
    }

    /// Summarize `datasets` with the language model, sampling fairly across
    /// them first. Summaries are cached by preview content, so identical
    /// inputs reuse the model's earlier answer.
    pub async fn analyze(&self, datasets: &[Dataset], use_cache: bool) -> ChatResponse {
        let preview = sample_preview(datasets, self.config.summary_max_items);
        if preview.count == 0 {
            return ChatResponse::failure(
                IntentKind::DataQuery,
                "Nothing to analyze: no records were provided.",
            );
        }

        let key = summary_key(&preview.text);
        if use_cache {
            if let Some(value) = self.cache.get(Namespace::Summary, &key) {
                if let Some(summary) = value.as_str() {
                    return self.summary_response(datasets, summary.to_string());
                }
            }
        }

        let prompt = build_prompt(&preview.text, preview.count, datasets.len());
        match self.llm.complete(&prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                let summary = text.trim().to_string();
                if use_cache {
                    self.cache.set(
                        Namespace::Summary,
                        key,
                        serde_json::Value::String(summary.clone()),
                        self.cache.ttl(Namespace::Summary),
                    );
                }
                self.summary_response(datasets, summary)
            }
            Ok(_) => ChatResponse::failure(
                IntentKind::DataQuery,
                "The language model returned no summary.",
            ),
            Err(err) => {
                log::warn!("Summary generation failed: {err}");
                ChatResponse::failure(
                    IntentKind::DataQuery,
                    format!("Summary generation failed: {err}"),
                )
            }
        }
    }

    fn summary_response(&self, datasets: &[Dataset], summary: String) -> ChatResponse {
        let (blocks, map) = panels::build_summary_panels(datasets);
        ChatResponse {
            success: true,
            intent: IntentKind::DataQuery,
            message: summary,
            records: None,
            metadata: ResponseMetadata {
                intent_type: Some(IntentKind::DataQuery),
                ..ResponseMetadata::default()
            },
            blocks,
            datasets: map,
        }
    }
}

fn summary_key(preview: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(preview.as_bytes());
    format!("summary:{:x}", hasher.finalize())
}

fn build_prompt(preview: &str, items: usize, datasets: usize) -> String {
    format!(
        "You are a news analyst. Summarize the key themes across the \
         following {datasets} dataset(s) ({items} items total). Be concise \
         and factual.\n\n{preview}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feedchat_protocol::{CacheHitFlags, Origin, Record};
    use feedchat_query::{FetchOutcome, RetrievalOutcome};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEngine {
        paths: Vec<String>,
        calls: AtomicUsize,
    }

    impl StubEngine {
        fn routing_to(paths: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                paths: paths.iter().map(ToString::to_string).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RetrievalEngine for StubEngine {
        async fn resolve(
            &self,
            _query: &str,
            _filters: &BTreeMap<String, String>,
        ) -> anyhow::Result<RetrievalOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.paths.is_empty() {
                anyhow::bail!("no routes configured");
            }
            Ok(RetrievalOutcome {
                paths: self.paths.clone(),
                confidence: 0.85,
                reasoning: "matched feed topics".to_string(),
            })
        }
    }

    struct StubGateway {
        calls: AtomicUsize,
    }

    impl StubGateway {
        fn healthy() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FeedGateway for StubGateway {
        async fn fetch(&self, path: &str) -> anyhow::Result<FetchOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchOutcome::success(
                Origin::Primary,
                vec![Record::new(path, format!("https://e.com/{path}"), "d")],
            ))
        }
    }

    struct StubModel {
        reply: Option<String>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn silent() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("model endpoint unreachable");
            }
            Ok(self.reply.clone())
        }
    }

    fn service(
        engine: Arc<StubEngine>,
        gateway: Arc<StubGateway>,
        llm: Arc<StubModel>,
    ) -> ChatService {
        ChatService::from_clients(engine, gateway, llm, OrchestratorConfig::default())
    }

    fn sample_datasets() -> Vec<Dataset> {
        vec![
            Dataset::new(
                "tech",
                vec![Record::new("a", "https://e.com/a", "about rust")],
            ),
            Dataset::new(
                "sports",
                vec![Record::new("b", "https://e.com/b", "match recap")],
            ),
        ]
    }

    #[tokio::test]
    async fn chitchat_short_circuits_every_client() {
        let engine = StubEngine::routing_to(&["a"]);
        let gateway = StubGateway::healthy();
        let llm = StubModel::replying("unused");
        let svc = service(Arc::clone(&engine), Arc::clone(&gateway), Arc::clone(&llm));

        let response = svc.chat("hello there", &BTreeMap::new(), true).await;

        assert!(response.success);
        assert_eq!(response.intent, IntentKind::Chitchat);
        assert_eq!(response.message, OrchestratorConfig::default().chitchat_reply);
        assert_eq!(response.metadata.intent_type, Some(IntentKind::Chitchat));
        assert!(response.metadata.intent_confidence.is_some());
        assert_eq!(response.metadata.cache_hit, None);
        assert!(response.records.is_none());
        assert!(response.blocks.is_empty());

        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn data_query_carries_full_metadata_and_blocks() {
        let svc = service(
            StubEngine::routing_to(&["feeds/rust", "feeds/go"]),
            StubGateway::healthy(),
            StubModel::replying("unused"),
        );

        let response = svc.chat("latest rust news", &BTreeMap::new(), true).await;

        assert!(response.success);
        assert_eq!(response.intent, IntentKind::DataQuery);
        assert_eq!(response.message, "Found 2 items from 2 of 2 sources.");
        assert_eq!(response.records.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            response.metadata.cache_hit,
            Some(CacheHitFlags { retrieval: false, route_data: false })
        );
        assert_eq!(response.metadata.source, Some(Origin::Primary));
        assert_eq!(
            response.metadata.generated_path.as_deref(),
            Some("feeds/rust,feeds/go")
        );
        assert_eq!(
            response.metadata.reasoning.as_deref(),
            Some("matched feed topics")
        );
        assert_eq!(response.blocks.len(), 1);
        assert_eq!(response.datasets.len(), 2);
    }

    #[tokio::test]
    async fn repeated_query_reports_cache_hits() {
        let svc = service(
            StubEngine::routing_to(&["feeds/rust"]),
            StubGateway::healthy(),
            StubModel::replying("unused"),
        );

        let _ = svc.chat("latest rust news", &BTreeMap::new(), true).await;
        let second = svc.chat("latest rust news", &BTreeMap::new(), true).await;

        assert_eq!(
            second.metadata.cache_hit,
            Some(CacheHitFlags { retrieval: true, route_data: true })
        );
    }

    #[tokio::test]
    async fn resolution_failure_becomes_a_failure_envelope() {
        let svc = service(
            StubEngine::routing_to(&[]),
            StubGateway::healthy(),
            StubModel::replying("unused"),
        );

        let response = svc.chat("latest rust news", &BTreeMap::new(), true).await;

        assert!(!response.success);
        assert_eq!(response.intent, IntentKind::DataQuery);
        assert!(response.message.starts_with("Could not answer that:"));
        assert_eq!(response.metadata.intent_type, Some(IntentKind::DataQuery));
        assert!(response.metadata.intent_confidence.is_some());
    }

    #[tokio::test]
    async fn analyze_summarizes_and_builds_reference_panels() {
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            StubModel::replying("Two quiet news days."),
        );

        let response = svc.analyze(&sample_datasets(), true).await;

        assert!(response.success);
        assert_eq!(response.message, "Two quiet news days.");
        assert!(response.records.is_none());
        assert_eq!(response.blocks.len(), 1);
        assert_eq!(response.blocks[0].children.len(), 2);
        assert_eq!(response.datasets.len(), 2);
    }

    #[tokio::test]
    async fn analyze_caches_summaries_by_preview_content() {
        let llm = StubModel::replying("Summary.");
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            Arc::clone(&llm),
        );
        let datasets = sample_datasets();

        let first = svc.analyze(&datasets, true).await;
        let second = svc.analyze(&datasets, true).await;

        assert_eq!(first.message, second.message);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn analyze_without_cache_always_calls_the_model() {
        let llm = StubModel::replying("Summary.");
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            Arc::clone(&llm),
        );
        let datasets = sample_datasets();

        let _ = svc.analyze(&datasets, false).await;
        let _ = svc.analyze(&datasets, false).await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_summary_is_a_failure_not_an_empty_success() {
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            StubModel::silent(),
        );

        let response = svc.analyze(&sample_datasets(), true).await;
        assert!(!response.success);
        assert_eq!(response.message, "The language model returned no summary.");
    }

    #[tokio::test]
    async fn blank_summary_is_a_failure_too() {
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            StubModel::replying("   \n"),
        );

        let response = svc.analyze(&sample_datasets(), true).await;
        assert!(!response.success);
    }

    #[tokio::test]
    async fn model_error_is_reported_in_the_message() {
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            StubModel::failing(),
        );

        let response = svc.analyze(&sample_datasets(), true).await;
        assert!(!response.success);
        assert!(response.message.contains("model endpoint unreachable"));
    }

    #[tokio::test]
    async fn empty_datasets_fail_before_reaching_the_model() {
        let llm = StubModel::replying("unused");
        let svc = service(
            StubEngine::routing_to(&["a"]),
            StubGateway::healthy(),
            Arc::clone(&llm),
        );

        let response = svc.analyze(&[], true).await;
        assert!(!response.success);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

        let empty = vec![Dataset::new("a", Vec::new())];
        let response = svc.analyze(&empty, true).await;
        assert!(!response.success);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
