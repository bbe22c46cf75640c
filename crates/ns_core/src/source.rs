use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FetchError;
use crate::types::Article;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the articles matching `company` published on `date`.
    ///
    /// Every returned article has a non-empty description. No matches yields an
    /// empty vector.
    async fn fetch_articles(
        &self,
        company: &str,
        date: NaiveDate,
    ) -> std::result::Result<Vec<Article>, FetchError>;
}
