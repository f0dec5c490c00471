use async_trait::async_trait;

/// Language-model client used for narrative summaries.
///
/// `Ok(None)` and blank text are treated as failure conditions by the
/// caller, never as a valid empty summary. Invocation is at-least-once
/// with idempotent prompts; exactly-once delivery is not guaranteed.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<Option<String>>;
}
