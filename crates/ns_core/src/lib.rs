pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use aggregate::aggregate;
pub use classifier::SentimentClassifier;
pub use config::{Config, ConfigBuilder};
pub use error::{Error, FetchError, Result};
pub use source::ArticleSource;
pub use types::{
    AnalyzedArticle, Article, OverallSentiment, PipelineResult, SentimentDistribution,
    SentimentLabel, SentimentResult,
};

pub mod prelude {
    pub use super::{
        aggregate, Article, ArticleSource, Config, Error, FetchError, OverallSentiment,
        PipelineResult, Result, SentimentClassifier, SentimentLabel, SentimentResult,
    };
}
