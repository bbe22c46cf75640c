use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use ns_core::{Article, ArticleSource, Config, FetchError, Result};

#[derive(Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Deserialize)]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<RawSource>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Deserialize)]
struct RawSource {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl RawArticle {
    /// Returns `None` for entries without a usable description.
    fn into_article(self) -> Option<Article> {
        let description = self.description.filter(|d| !d.trim().is_empty())?;
        Some(Article {
            title: self.title.unwrap_or_default(),
            description,
            url: self.url.unwrap_or_default(),
            source: self.source.and_then(|s| s.name).unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
        })
    }
}

/// Client for the NewsAPI `everything` endpoint, restricted to the configured
/// financial-news domains.
pub struct NewsApiFetcher {
    client: Client,
    endpoint: Url,
    api_key: String,
    domains: String,
    language: String,
}

impl fmt::Debug for NewsApiFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiFetcher")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("language", &self.language)
            .finish()
    }
}

impl NewsApiFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.news_api_url.clone(),
            api_key: config.news_api_key.clone(),
            domains: config.domains_param(),
            language: config.language.clone(),
        })
    }

    fn query(&self, company: &str, date: NaiveDate) -> Vec<(&'static str, String)> {
        let day = date.format("%Y-%m-%d").to_string();
        vec![
            ("q", company.to_string()),
            ("searchIn", "title,description".to_string()),
            ("from", day.clone()),
            ("to", day),
            ("sortBy", "publishedAt".to_string()),
            ("domains", self.domains.clone()),
            ("language", self.language.clone()),
        ]
    }
}

#[async_trait]
impl ArticleSource for NewsApiFetcher {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch_articles(
        &self,
        company: &str,
        date: NaiveDate,
    ) -> std::result::Result<Vec<Article>, FetchError> {
        tracing::debug!("Querying {} for {:?} on {}", self.endpoint, company, date);

        let response = self
            .client
            .get(self.endpoint.clone())
            .header("X-Api-Key", &self.api_key)
            .query(&self.query(company, date))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<EverythingResponse>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let received = body.articles.len();
        let articles: Vec<Article> = body
            .articles
            .into_iter()
            .filter_map(RawArticle::into_article)
            .collect();

        tracing::debug!(
            "Kept {} of {} articles for {:?} (dropped entries without description)",
            articles.len(),
            received,
            company
        );
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        query: Arc<Mutex<Option<HashMap<String, String>>>>,
        api_key: Arc<Mutex<Option<String>>>,
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v2/everything", addr)
    }

    fn fetcher(url: &str) -> NewsApiFetcher {
        let config = Config::builder()
            .news_api_url(url)
            .news_api_key("test-key")
            .classifier_url("http://localhost:8000")
            .build()
            .unwrap();
        NewsApiFetcher::new(&config).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_drops_articles_without_description() {
        let router = Router::new().route(
            "/v2/everything",
            get(|| async {
                Json(json!({
                    "status": "ok",
                    "totalResults": 4,
                    "articles": [
                        {
                            "source": {"id": "reuters", "name": "Reuters"},
                            "title": "Meta beats estimates",
                            "description": "Revenue grew 25% year over year.",
                            "url": "https://www.reuters.com/a",
                            "publishedAt": "2024-03-05T14:30:00Z"
                        },
                        {
                            "source": {"id": null, "name": "CNBC"},
                            "title": "No description here",
                            "description": null,
                            "url": "https://www.cnbc.com/b",
                            "publishedAt": "2024-03-05T12:00:00Z"
                        },
                        {
                            "source": {"name": "Forbes"},
                            "title": "Blank description",
                            "description": "   ",
                            "url": "https://www.forbes.com/c",
                            "publishedAt": "2024-03-05T11:00:00Z"
                        },
                        {
                            "title": "Missing source",
                            "description": "Analysts cut targets."
                        }
                    ]
                }))
            }),
        );
        let url = serve(router).await;

        let articles = fetcher(&url).fetch_articles("Meta", date()).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|a| !a.description.trim().is_empty()));

        assert_eq!(articles[0].title, "Meta beats estimates");
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].published_at, "2024-03-05T14:30:00Z");

        assert_eq!(articles[1].source, "");
        assert_eq!(articles[1].url, "");
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/v2/everything",
                get(
                    |State(captured): State<Captured>,
                     headers: HeaderMap,
                     Query(params): Query<HashMap<String, String>>| async move {
                        *captured.query.lock().unwrap() = Some(params);
                        *captured.api_key.lock().unwrap() = headers
                            .get("x-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        Json(json!({"status": "ok", "totalResults": 0, "articles": []}))
                    },
                ),
            )
            .with_state(captured.clone());
        let url = serve(router).await;

        let articles = fetcher(&url).fetch_articles("Apple", date()).await.unwrap();
        assert!(articles.is_empty());

        let query = captured.query.lock().unwrap().clone().unwrap();
        assert_eq!(query["q"], "Apple");
        assert_eq!(query["searchIn"], "title,description");
        assert_eq!(query["from"], "2024-03-05");
        assert_eq!(query["to"], "2024-03-05");
        assert_eq!(query["sortBy"], "publishedAt");
        assert_eq!(query["language"], "en");
        assert!(query["domains"].contains("reuters.com"));
        assert!(!query.contains_key("apiKey"));
        assert_eq!(
            captured.api_key.lock().unwrap().as_deref(),
            Some("test-key")
        );
    }

    #[tokio::test]
    async fn test_fetch_reports_error_status() {
        let router = Router::new().route(
            "/v2/everything",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "status": "error",
                        "code": "apiKeyInvalid",
                        "message": "Your API key is invalid or incorrect."
                    })),
                )
            }),
        );
        let url = serve(router).await;

        let err = fetcher(&url).fetch_articles("Meta", date()).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                status: 401,
                message: "Your API key is invalid or incorrect.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_reports_undecodable_body() {
        let router = Router::new().route("/v2/everything", get(|| async { "<html>oops</html>" }));
        let url = serve(router).await;

        let err = fetcher(&url).fetch_articles("Meta", date()).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_reports_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/v2/everything", addr);
        let err = fetcher(&url).fetch_articles("Meta", date()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", fetcher("http://localhost:1/v2/everything"));
        assert!(!debug.contains("test-key"));
    }
}
