use feedchat_protocol::{Origin, RouteResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatches per-path fetches concurrently and reassembles results in
/// input path order, whatever the completion order was.
///
/// This component has no cache awareness; caching is entirely the query
/// resolver's responsibility per path.
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecutor {
    timeout: Duration,
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_TIMEOUT)
    }
}

impl ParallelExecutor {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `fetch` for every path and return one [`RouteResult`] per path,
    /// in input order.
    ///
    /// Exactly one path is the documented fast path: `fetch` is invoked
    /// directly on the caller's task and no concurrency machinery is
    /// engaged, so the output is identical to a direct call.
    ///
    /// With multiple paths, one task is spawned per path under a single
    /// shared deadline. A slow or failed path never blocks collection of
    /// the others' results beyond that deadline; a path lacking a result at
    /// the deadline is recorded as a timeout error and never retried within
    /// this call.
    pub async fn execute<F, Fut>(&self, paths: &[String], fetch: F) -> Vec<RouteResult>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = RouteResult> + Send + 'static,
    {
        match paths {
            [] => Vec::new(),
            [only] => vec![fetch(only.clone()).await],
            _ => self.execute_concurrent(paths, fetch).await,
        }
    }

    async fn execute_concurrent<F, Fut>(&self, paths: &[String], fetch: F) -> Vec<RouteResult>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = RouteResult> + Send + 'static,
    {
        let deadline = Instant::now() + self.timeout;

        // Spawn everything first so all paths make progress concurrently;
        // awaiting handles in input order keeps the output deterministic.
        let handles: Vec<(String, tokio::task::JoinHandle<RouteResult>)> = paths
            .iter()
            .map(|path| (path.clone(), tokio::spawn(fetch(path.clone()))))
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            let abort = handle.abort_handle();
            match timeout_at(deadline, handle).await {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(join_err)) => {
                    log::warn!("Route task for '{path}' failed: {join_err}");
                    results.push(RouteResult::failure(
                        path,
                        Origin::Primary,
                        format!("route task failed: {join_err}"),
                    ));
                }
                Err(_) => {
                    abort.abort();
                    results.push(RouteResult::failure(
                        path,
                        Origin::Primary,
                        format!("timed out after {}ms", self.timeout.as_millis()),
                    ));
                }
            }
        }
        results
    }
}
