//! # Feedchat Protocol
//!
//! Shared data model for the feedchat pipeline: feed records, per-route and
//! merged query results, intent decisions, the chat response envelope, and
//! the renderer-facing result tree (`Block` / `DatasetMap`).
//!
//! Serialized field names in this crate are a compatibility surface for the
//! rendering layer and must remain stable across versions. Absent metadata is
//! represented as an explicit `null`, never an omitted key.

mod panel;
mod query;
mod record;

pub use panel::{Block, BlockError, BlockSource, DatasetMap};
pub use query::{
    CacheHitFlags, ChatResponse, FetchStatus, IntentDecision, IntentKind, Origin, QueryResult,
    ResponseMetadata, RouteResult,
};
pub use record::{Media, MediaKind, Record};
