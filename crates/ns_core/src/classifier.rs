use async_trait::async_trait;

use crate::types::SentimentResult;

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Classify a single text span.
    ///
    /// Failures are returned as [`SentimentResult::Failed`] rather than raised,
    /// so one bad call never stops the rest of a run.
    async fn classify(&self, text: &str) -> SentimentResult;
}
