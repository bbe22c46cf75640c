pub mod models;

pub use models::{create_classifier, HttpSentimentClassifier};

pub mod prelude {
    pub use super::models::{create_classifier, HttpSentimentClassifier};
    pub use ns_core::{Config, Result, SentimentClassifier, SentimentLabel, SentimentResult};
}
