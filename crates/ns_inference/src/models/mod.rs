use std::sync::Arc;

use ns_core::{Config, Result, SentimentClassifier};

pub mod finbert;

pub use finbert::HttpSentimentClassifier;

/// Build the sentiment classifier used by the pipeline.
pub fn create_classifier(config: &Config) -> Result<Arc<dyn SentimentClassifier>> {
    let classifier = HttpSentimentClassifier::new(config)?;
    tracing::debug!("Using sentiment classifier {:?}", classifier);
    Ok(Arc::new(classifier))
}
