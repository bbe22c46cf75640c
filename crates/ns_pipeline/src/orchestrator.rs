use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use ns_core::{
    aggregate, AnalyzedArticle, Article, ArticleSource, Config, Error, PipelineResult, Result,
    SentimentClassifier, SentimentResult,
};

use crate::cancel::CancelToken;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    ClassifyingAll { total: usize },
    Aggregating,
    Done,
    Cancelled,
}

/// Fetch → classify → aggregate.
///
/// Classification calls fan out on a [`JoinSet`], at most `max_concurrency`
/// at a time, each bounded by `classify_timeout`. Results are written back by
/// article index so the pairing with articles is kept.
pub struct Pipeline {
    source: Arc<dyn ArticleSource>,
    classifier: Arc<dyn SentimentClassifier>,
    max_concurrency: usize,
    classify_timeout: Duration,
    state: watch::Sender<PipelineState>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("classifier", &self.classifier.name())
            .field("max_concurrency", &self.max_concurrency)
            .field("classify_timeout", &self.classify_timeout)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        classifier: Arc<dyn SentimentClassifier>,
        config: &Config,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            source,
            classifier,
            max_concurrency: config.max_concurrency.max(1),
            classify_timeout: config.classify_timeout,
            state,
        }
    }

    /// Wire the NewsAPI fetcher and the HTTP classifier from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = ns_news::create_source(config)?;
        let classifier = ns_inference::create_classifier(config)?;
        info!(
            "🧠 Pipeline ready (source: {}, classifier: {}, concurrency: {})",
            source.name(),
            classifier.name(),
            config.max_concurrency
        );
        Ok(Self::new(source, classifier, config))
    }

    /// State of the most recent run on this pipeline.
    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub async fn run(&self, company: &str, date: NaiveDate) -> Result<PipelineResult> {
        self.run_with_cancel(company, date, &CancelToken::new())
            .await
    }

    /// Run the pipeline, aborting with [`Error::Cancelled`] if `cancel` fires.
    ///
    /// A news-source failure does not fail the run; it is reported on
    /// [`PipelineResult::fetch_error`] and the run continues with no articles.
    #[instrument(skip(self, cancel), fields(run_id = tracing::field::Empty))]
    pub async fn run_with_cancel(
        &self,
        company: &str,
        date: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<PipelineResult> {
        let company = company.trim();
        if company.is_empty() {
            return Err(Error::InvalidInput(
                "company name must not be empty".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        self.transition(PipelineState::Fetching);
        info!("📰 Fetching articles for {} on {}", company, date);
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(self.abort()),
            fetched = self.source.fetch_articles(company, date) => fetched,
        };

        let (articles, fetch_error) = match fetched {
            Ok(articles) => (articles, None),
            Err(e) => {
                warn!("⚠️ Error fetching news: {}", e);
                (Vec::new(), Some(e))
            }
        };

        if articles.is_empty() {
            info!("No articles found for {} on {}", company, date);
            self.transition(PipelineState::Done);
            return Ok(PipelineResult {
                run_id,
                company: company.to_string(),
                date,
                articles: Vec::new(),
                overall: aggregate(&[]),
                fetch_error,
            });
        }

        self.transition(PipelineState::ClassifyingAll {
            total: articles.len(),
        });
        info!("🤖 Classifying {} articles", articles.len());
        let sentiments = match self.classify_all(&articles, cancel).await {
            Err(Error::Cancelled) => return Err(self.abort()),
            other => other?,
        };

        self.transition(PipelineState::Aggregating);
        let overall = aggregate(&sentiments);
        info!(
            "✨ Overall sentiment {} (average {:.2}, {} of {} classified)",
            overall.dominant_label,
            overall.average_score,
            overall.total_valid_articles,
            sentiments.len()
        );

        let articles = articles
            .into_iter()
            .zip(sentiments)
            .map(|(article, sentiment)| AnalyzedArticle { article, sentiment })
            .collect();

        self.transition(PipelineState::Done);
        Ok(PipelineResult {
            run_id,
            company: company.to_string(),
            date,
            articles,
            overall,
            fetch_error,
        })
    }

    async fn classify_all(
        &self,
        articles: &[Article],
        cancel: &CancelToken,
    ) -> Result<Vec<SentimentResult>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let timeout = self.classify_timeout;
        let mut join_set = JoinSet::new();

        for (idx, article) in articles.iter().enumerate() {
            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let text = article.description.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                if cancel.is_cancelled() {
                    return (idx, None);
                }
                let result = match tokio::time::timeout(timeout, classifier.classify(&text)).await {
                    Ok(result) => result,
                    Err(_) => SentimentResult::failed(format!(
                        "Request error: timed out after {}ms",
                        timeout.as_millis()
                    )),
                };
                (idx, Some(result))
            });
        }

        let mut slots: Vec<Option<SentimentResult>> = vec![None; articles.len()];
        loop {
            let joined = tokio::select! {
                biased;
                // dropping the set aborts the in-flight calls
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                joined = join_set.join_next() => joined,
            };
            let Some(joined) = joined else { break };
            match joined {
                Ok((idx, Some(result))) => {
                    if let SentimentResult::Failed { error_message } = &result {
                        warn!(
                            "⚠️ Classification failed for {:?}: {}",
                            articles[idx].title, error_message
                        );
                    }
                    slots[idx] = Some(result);
                }
                Ok((_, None)) => {}
                Err(e) => warn!("⚠️ Classification task did not complete: {}", e),
            }
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        Ok(slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    SentimentResult::failed("Request error: classification task did not complete")
                })
            })
            .collect())
    }

    fn transition(&self, next: PipelineState) {
        tracing::debug!("Pipeline state {:?} -> {:?}", *self.state.borrow(), next);
        self.state.send_replace(next);
    }

    fn abort(&self) -> Error {
        info!("🛑 Pipeline run cancelled");
        self.transition(PipelineState::Cancelled);
        Error::Cancelled
    }
}
