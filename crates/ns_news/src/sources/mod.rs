use std::sync::Arc;

use ns_core::{ArticleSource, Config, Result};

pub mod newsapi;

pub use newsapi::NewsApiFetcher;

/// Build the article source used by the pipeline.
pub fn create_source(config: &Config) -> Result<Arc<dyn ArticleSource>> {
    let source = NewsApiFetcher::new(config)?;
    tracing::debug!("Using article source {:?}", source);
    Ok(Arc::new(source))
}
