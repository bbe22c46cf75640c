use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FetchError;

/// A single news item returned for one company/date query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Always non-empty; entries without one are dropped at fetch time.
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
}

impl Article {
    /// Parses `published_at` as an RFC 3339 timestamp.
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// All labels, in tie-break priority order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unrecognized sentiment label: {:?}", other)),
        }
    }
}

/// Outcome of classifying one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentResult {
    Classified { label: SentimentLabel, score: f64 },
    Failed { error_message: String },
}

impl SentimentResult {
    pub fn failed(message: impl Into<String>) -> Self {
        SentimentResult::Failed {
            error_message: message.into(),
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, SentimentResult::Classified { .. })
    }

    pub fn label(&self) -> Option<SentimentLabel> {
        match self {
            SentimentResult::Classified { label, .. } => Some(*label),
            SentimentResult::Failed { .. } => None,
        }
    }
}

/// Per-label counts. All three labels are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, usize)> + '_ {
        SentimentLabel::ALL
            .into_iter()
            .map(move |label| (label, self.count(label)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSentiment {
    pub dominant_label: SentimentLabel,
    pub average_score: f64,
    pub total_valid_articles: usize,
    pub distribution: SentimentDistribution,
}

/// An article paired with the sentiment produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    pub article: Article,
    pub sentiment: SentimentResult,
}

/// Full output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub company: String,
    pub date: NaiveDate,
    pub articles: Vec<AnalyzedArticle>,
    pub overall: OverallSentiment,
    /// Set when the news source failed and the run continued with zero articles.
    pub fetch_error: Option<FetchError>,
}

impl PipelineResult {
    pub fn failed_count(&self) -> usize {
        self.articles
            .iter()
            .filter(|a| !a.sentiment.is_classified())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(published_at: &str) -> Article {
        Article {
            title: "Test Article".to_string(),
            description: "Shares rose after earnings.".to_string(),
            url: "http://test.com".to_string(),
            source: "Reuters".to_string(),
            published_at: published_at.to_string(),
        }
    }

    #[test]
    fn test_label_parsing_is_case_insensitive() {
        assert_eq!("Positive".parse::<SentimentLabel>(), Ok(SentimentLabel::Positive));
        assert_eq!(" NEGATIVE ".parse::<SentimentLabel>(), Ok(SentimentLabel::Negative));
        assert_eq!("neutral".parse::<SentimentLabel>(), Ok(SentimentLabel::Neutral));
        assert!("bullish".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn test_distribution_serializes_all_labels() {
        let mut dist = SentimentDistribution::default();
        dist.increment(SentimentLabel::Positive);
        let json = serde_json::to_value(dist).unwrap();
        assert_eq!(json["positive"], 1);
        assert_eq!(json["negative"], 0);
        assert_eq!(json["neutral"], 0);
    }

    #[test]
    fn test_sentiment_result_wire_shape() {
        let classified = SentimentResult::Classified {
            label: SentimentLabel::Neutral,
            score: 0.1,
        };
        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["status"], "classified");
        assert_eq!(json["label"], "neutral");

        let failed = SentimentResult::failed("timeout");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_message"], "timeout");
    }

    #[test]
    fn test_published_at_parsing() {
        let parsed = article("2024-03-05T14:30:00Z").published_at_utc().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-05T14:30:00+00:00");
        assert!(article("").published_at_utc().is_none());
    }
}
