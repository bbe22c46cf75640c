use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use ns_core::{Config, Result, SentimentClassifier, SentimentLabel, SentimentResult};

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(alias = "label")]
    sentiment: Option<String>,
    score: Option<f64>,
    error: Option<serde_json::Value>,
}

/// Client for a FinBERT-style classification endpoint.
///
/// Posts `{"text": ...}` and expects `{"sentiment": <label>, "score": <number>}`
/// back.
pub struct HttpSentimentClassifier {
    client: Client,
    endpoint: Url,
}

impl fmt::Debug for HttpSentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSentimentClassifier")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl HttpSentimentClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.classifier_url.clone(),
        })
    }

    fn interpret(body: ClassifyResponse) -> SentimentResult {
        if let Some(error) = body.error {
            let detail = match error {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return SentimentResult::failed(format!("API error: {}", detail));
        }

        let Some(raw_label) = body.sentiment else {
            return SentimentResult::failed("Invalid response: missing sentiment label");
        };

        match raw_label.parse::<SentimentLabel>() {
            Ok(label) => SentimentResult::Classified {
                label,
                score: body.score.unwrap_or(0.0),
            },
            Err(e) => SentimentResult::failed(format!("Invalid response: {}", e)),
        }
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    fn name(&self) -> &str {
        "FinBERT"
    }

    async fn classify(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::failed("Request error: text is empty");
        }

        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(&ClassifyRequest { text })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return SentimentResult::failed(format!("Request error: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Classifier returned {}", status);
            return SentimentResult::failed(format!("API error: {}", status.as_u16()));
        }

        match response.json::<ClassifyResponse>().await {
            Ok(body) => Self::interpret(body),
            Err(e) => SentimentResult::failed(format!("Invalid response: {}", e)),
        }
    }
}
