//! # Feedchat Query
//!
//! Resolves a natural-language query to routed feed paths and fetches their
//! records: the retrieval engine maps text to paths (cached), the feed
//! gateway fetches each path's records (cached), and the parallel executor
//! dispatches multi-path fetches concurrently under one shared deadline
//! while preserving path order.
//!
//! Failure of one path never aborts the others; a path in error contributes
//! no records and its error detail is kept for the caller.

mod clients;
mod error;
mod executor;
mod resolver;

pub use clients::{FeedGateway, FetchOutcome, RetrievalEngine, RetrievalOutcome};
pub use error::{QueryError, Result};
pub use executor::ParallelExecutor;
pub use resolver::DataQueryService;
