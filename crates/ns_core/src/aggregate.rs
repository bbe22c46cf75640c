//! Folding per-article sentiment into one overall summary.

use crate::types::{OverallSentiment, SentimentDistribution, SentimentLabel, SentimentResult};

/// Combine per-article results into an [`OverallSentiment`].
///
/// `Failed` entries are ignored. With no classified entries the result is
/// neutral with a 0.0 average. When labels tie for the highest count the
/// first one in [`SentimentLabel::ALL`] wins (positive, then negative, then
/// neutral).
pub fn aggregate(results: &[SentimentResult]) -> OverallSentiment {
    let mut distribution = SentimentDistribution::default();
    let mut total_score = 0.0;
    let mut valid = 0usize;

    for result in results {
        if let SentimentResult::Classified { label, score } = result {
            distribution.increment(*label);
            total_score += score;
            valid += 1;
        }
    }

    if valid == 0 {
        return OverallSentiment {
            dominant_label: SentimentLabel::Neutral,
            average_score: 0.0,
            total_valid_articles: 0,
            distribution,
        };
    }

    OverallSentiment {
        dominant_label: dominant_label(&distribution),
        average_score: total_score / valid as f64,
        total_valid_articles: valid,
        distribution,
    }
}

fn dominant_label(distribution: &SentimentDistribution) -> SentimentLabel {
    let mut best = SentimentLabel::ALL[0];
    for label in SentimentLabel::ALL.into_iter().skip(1) {
        // strictly greater keeps the earlier label on ties
        if distribution.count(label) > distribution.count(best) {
            best = label;
        }
    }
    best
}
