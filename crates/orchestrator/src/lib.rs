//! # Feedchat Orchestrator
//!
//! Top-level composition of the feedchat pipeline. `ChatService::chat` is
//! the sole entry point: it classifies intent, short-circuits chitchat,
//! resolves data queries through `feedchat-query`, and assembles the final
//! response including the renderer-facing result tree. Analysis mode builds
//! a fairness-sampled preview over multiple datasets and asks the language
//! model for a narrative summary.
//!
//! The orchestrator never returns an unhandled fault for a well-formed
//! query; every failure becomes a `ChatResponse` with `success = false`, a
//! human-readable message, and whatever partial data was obtained.

mod clients;
mod config;
pub mod intent;
mod panels;
mod sampling;
mod service;

pub use clients::LanguageModel;
pub use config::OrchestratorConfig;
pub use sampling::{sample_preview, Dataset, Preview};
pub use service::ChatService;
