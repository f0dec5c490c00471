use crate::clients::{FeedGateway, RetrievalEngine, RetrievalOutcome};
use crate::error::{QueryError, Result};
use crate::executor::ParallelExecutor;
use feedchat_cache::{canonical_key, CacheStore, Namespace};
use feedchat_protocol::{CacheHitFlags, FetchStatus, Origin, QueryResult, Record, RouteResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Route payload as stored in the `route-data` namespace.
#[derive(Serialize, Deserialize)]
struct CachedRoute {
    origin: Origin,
    records: Vec<Record>,
}

/// Resolves a query to routed paths via the retrieval engine and fetches
/// each path's records via the feed gateway, with an independent cache
/// layer in front of both steps.
pub struct DataQueryService {
    retrieval: Arc<dyn RetrievalEngine>,
    gateway: Arc<dyn FeedGateway>,
    cache: Arc<CacheStore>,
    executor: ParallelExecutor,
}

impl DataQueryService {
    #[must_use]
    pub fn new(
        retrieval: Arc<dyn RetrievalEngine>,
        gateway: Arc<dyn FeedGateway>,
        cache: Arc<CacheStore>,
        executor: ParallelExecutor,
    ) -> Self {
        Self {
            retrieval,
            gateway,
            cache,
            executor,
        }
    }

    /// Resolve `query` into a unified [`QueryResult`].
    ///
    /// The retrieval step and the route-data step are cached independently;
    /// their hit flags are reported separately. With `use_cache` off, no
    /// cache is read or written and the call is side-effect free.
    ///
    /// Only retrieval-layer problems are hard errors. A failing path
    /// contributes no records and its error lands in `route_errors`;
    /// `status` is success as long as at least one path succeeded.
    pub async fn resolve(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        use_cache: bool,
    ) -> Result<QueryResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let (outcome, retrieval_hit) = self.resolve_routes(query, filters, use_cache).await?;

        // Probe the route-data layer path by path; only misses go out to
        // the gateway through the executor.
        let mut slots: Vec<Option<RouteResult>> = Vec::with_capacity(outcome.paths.len());
        let mut misses: Vec<String> = Vec::new();
        for path in &outcome.paths {
            match self.cached_route(path, use_cache) {
                Some(route) => slots.push(Some(route)),
                None => {
                    slots.push(None);
                    misses.push(path.clone());
                }
            }
        }
        let route_data_hit = misses.is_empty();

        let gateway = Arc::clone(&self.gateway);
        let fetched = self
            .executor
            .execute(&misses, move |path: String| {
                let gateway = Arc::clone(&gateway);
                async move { fetch_route(gateway.as_ref(), path).await }
            })
            .await;

        if use_cache {
            for route in fetched.iter().filter(|route| route.is_success()) {
                self.store_route(route);
            }
        }

        let mut by_path: BTreeMap<String, RouteResult> = fetched
            .into_iter()
            .map(|route| (route.path.clone(), route))
            .collect();
        let mut routes = Vec::with_capacity(outcome.paths.len());
        for (slot, path) in slots.into_iter().zip(&outcome.paths) {
            let route = slot.or_else(|| by_path.remove(path)).unwrap_or_else(|| {
                RouteResult::failure(path.clone(), Origin::Primary, "route produced no result")
            });
            routes.push(route);
        }

        Ok(merge_routes(outcome, routes, retrieval_hit, route_data_hit))
    }

    /// Retrieval layer: cache lookup, then the engine on a miss.
    async fn resolve_routes(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
        use_cache: bool,
    ) -> Result<(RetrievalOutcome, bool)> {
        let key = canonical_key(
            "retrieval",
            &[("query", json!(query)), ("filters", json!(filters))],
        );

        if use_cache {
            if let Some(value) = self.cache.get(Namespace::Retrieval, &key) {
                match serde_json::from_value::<RetrievalOutcome>(value) {
                    Ok(outcome) => return Ok((outcome, true)),
                    Err(err) => {
                        log::warn!("Retrieval cache entry corrupted for '{key}': {err}");
                    }
                }
            }
        }

        let outcome = self
            .retrieval
            .resolve(query, filters)
            .await
            .map_err(|err| QueryError::Retrieval(err.to_string()))?;
        if outcome.paths.is_empty() {
            return Err(QueryError::NoRoutes);
        }

        if use_cache {
            if let Ok(value) = serde_json::to_value(&outcome) {
                self.cache
                    .set(Namespace::Retrieval, key, value, self.cache.ttl(Namespace::Retrieval));
            }
        }
        Ok((outcome, false))
    }

    fn cached_route(&self, path: &str, use_cache: bool) -> Option<RouteResult> {
        if !use_cache {
            return None;
        }
        let value = self.cache.get(Namespace::RouteData, path)?;
        match serde_json::from_value::<CachedRoute>(value) {
            Ok(cached) => Some(RouteResult::success(path, cached.origin, cached.records)),
            Err(err) => {
                log::warn!("Route cache entry corrupted for '{path}': {err}");
                None
            }
        }
    }

    fn store_route(&self, route: &RouteResult) {
        let cached = CachedRoute {
            origin: route.origin,
            records: route.records.clone(),
        };
        if let Ok(value) = serde_json::to_value(&cached) {
            self.cache.set(
                Namespace::RouteData,
                route.path.clone(),
                value,
                self.cache.ttl(Namespace::RouteData),
            );
        }
    }
}

async fn fetch_route(gateway: &dyn FeedGateway, path: String) -> RouteResult {
    match gateway.fetch(&path).await {
        Ok(outcome) => match outcome.status {
            FetchStatus::Success => RouteResult::success(path, outcome.origin, outcome.records),
            FetchStatus::Error => RouteResult::failure(
                path,
                outcome.origin,
                outcome
                    .error
                    .unwrap_or_else(|| "gateway reported an error".to_string()),
            ),
        },
        Err(err) => RouteResult::failure(path, Origin::Primary, err.to_string()),
    }
}

/// Merge per-route results preserving path order, then path-internal order.
fn merge_routes(
    outcome: RetrievalOutcome,
    routes: Vec<RouteResult>,
    retrieval_hit: bool,
    route_data_hit: bool,
) -> QueryResult {
    let mut records = Vec::new();
    let mut route_errors = BTreeMap::new();
    let mut any_success = false;
    let mut degraded = false;

    for route in &routes {
        if route.is_success() {
            any_success = true;
            degraded |= route.origin == Origin::Degraded;
            records.extend(route.records.iter().cloned());
        } else {
            route_errors.insert(
                route.path.clone(),
                route
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown route error".to_string()),
            );
        }
    }

    QueryResult {
        status: if any_success {
            FetchStatus::Success
        } else {
            FetchStatus::Error
        },
        records,
        cache: CacheHitFlags {
            retrieval: retrieval_hit,
            route_data: route_data_hit,
        },
        origin: if degraded {
            Origin::Degraded
        } else {
            Origin::Primary
        },
        paths: outcome.paths,
        routes,
        confidence: Some(outcome.confidence),
        reasoning: Some(outcome.reasoning),
        route_errors,
    }
}
