use std::fmt;

use ns_core::{Article, PipelineResult, SentimentResult};

pub const NO_ARTICLES: &str = "No articles found for the selected date and company.";

/// Plain-text rendering of a run: headline metrics, the label distribution,
/// then one block per article.
pub fn render_text(result: &PipelineResult) -> String {
    TextReport(result).to_string()
}

struct TextReport<'a>(&'a PipelineResult);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        if result.articles.is_empty() {
            return writeln!(f, "{}", NO_ARTICLES);
        }

        let overall = &result.overall;
        writeln!(f, "Analysis Results: {} on {}", result.company, result.date)?;
        writeln!(f, "Total Articles: {}", overall.total_valid_articles)?;
        writeln!(f, "Overall Sentiment: {}", overall.dominant_label)?;
        writeln!(f, "Average Score: {:.2}", overall.average_score)?;

        writeln!(f, "\nSentiment Distribution")?;
        let total = overall.distribution.total();
        for (label, count) in overall.distribution.iter() {
            let share = if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            };
            writeln!(f, "  {:<9}{:>4}  ({:>5.1}%)", label, count, share)?;
        }

        writeln!(f, "\nArticle Details")?;
        for (i, analyzed) in result.articles.iter().enumerate() {
            let article = &analyzed.article;
            writeln!(f, "\n[{}] {}", i + 1, article.title)?;
            writeln!(f, "    Source: {}", article.source)?;
            writeln!(f, "    Published: {}", published(article))?;
            match &analyzed.sentiment {
                SentimentResult::Classified { label, score } => {
                    writeln!(f, "    Sentiment: {} (Score: {:.2})", label, score)?;
                }
                SentimentResult::Failed { error_message } => {
                    writeln!(f, "    Sentiment: N/A [error: {}]", error_message)?;
                }
            }
            writeln!(f, "    Description: {}", article.description)?;
            writeln!(f, "    Read full article: {}", article.url)?;
        }
        Ok(())
    }
}

fn published(article: &Article) -> String {
    match article.published_at_utc() {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => article.published_at.clone(),
    }
}
