use std::fmt;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Financial news domains the news query is restricted to.
pub const DEFAULT_FINANCIAL_DOMAINS: &[&str] = &[
    "finance.yahoo.com",
    "bloomberg.com",
    "reuters.com",
    "ft.com",
    "wsj.com",
    "cnbc.com",
    "marketwatch.com",
    "investing.com",
    "seekingalpha.com",
    "fool.com",
    "businessinsider.com",
    "forbes.com",
    "barrons.com",
    "economist.com",
    "money.cnn.com",
    "morningstar.com",
    "tradingview.com",
    "zacks.com",
    "benzinga.com",
    "finviz.com",
    "nasdaq.com",
    "nyse.com",
    "londonstockexchange.com",
    "moodys.com",
    "spglobal.com",
    "fitchratings.com",
];

/// Settings shared by the fetcher, the classifier client and the pipeline.
///
/// Built once at startup through [`ConfigBuilder`]; a missing credential or
/// endpoint fails there instead of inside a request.
#[derive(Clone)]
pub struct Config {
    pub news_api_url: Url,
    pub news_api_key: String,
    pub classifier_url: Url,
    pub domains: Vec<String>,
    pub language: String,
    pub request_timeout: Duration,
    pub classify_timeout: Duration,
    pub max_concurrency: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("news_api_url", &self.news_api_url.as_str())
            .field("news_api_key", &"<redacted>")
            .field("classifier_url", &self.classifier_url.as_str())
            .field("domains", &self.domains.len())
            .field("language", &self.language)
            .field("request_timeout", &self.request_timeout)
            .field("classify_timeout", &self.classify_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The allow-list as the comma-separated value the news API expects.
    pub fn domains_param(&self) -> String {
        self.domains.join(",")
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    news_api_url: Option<String>,
    news_api_key: Option<String>,
    classifier_url: Option<String>,
    domains: Option<Vec<String>>,
    language: Option<String>,
    request_timeout: Option<Duration>,
    classify_timeout: Option<Duration>,
    max_concurrency: Option<usize>,
}

impl ConfigBuilder {
    pub fn news_api_url(mut self, url: impl Into<String>) -> Self {
        self.news_api_url = Some(url.into());
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn classifier_url(mut self, url: impl Into<String>) -> Self {
        self.classifier_url = Some(url.into());
        self
    }

    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = Some(timeout);
        self
    }

    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn build(self) -> Result<Config> {
        let news_api_key = required(self.news_api_key, "news API key")?;
        let classifier_url = parse_url(
            &required(self.classifier_url, "classifier endpoint URL")?,
            "classifier endpoint URL",
        )?;
        let news_api_url = parse_url(
            self.news_api_url.as_deref().unwrap_or(DEFAULT_NEWS_API_URL),
            "news API URL",
        )?;

        let domains = self.domains.unwrap_or_else(|| {
            DEFAULT_FINANCIAL_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect()
        });

        let max_concurrency = self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if max_concurrency == 0 {
            return Err(Error::Configuration(
                "max concurrency must be at least 1".to_string(),
            ));
        }

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let classify_timeout = self.classify_timeout.unwrap_or(DEFAULT_CLASSIFY_TIMEOUT);
        if request_timeout.is_zero() || classify_timeout.is_zero() {
            return Err(Error::Configuration(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(Config {
            news_api_url,
            news_api_key,
            classifier_url,
            domains,
            language: self
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            request_timeout,
            classify_timeout,
            max_concurrency,
        })
    }
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::Configuration(format!("{} is required", what))),
    }
}

fn parse_url(raw: &str, what: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("invalid {} {:?}: {}", what, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Configuration(format!(
            "{} must use http or https, got {}",
            what, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ConfigBuilder {
        Config::builder()
            .news_api_key("test-key")
            .classifier_url("http://localhost:8000")
    }

    #[test]
    fn test_defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config.news_api_url.as_str(), DEFAULT_NEWS_API_URL);
        assert_eq!(config.language, "en");
        assert_eq!(config.domains.len(), DEFAULT_FINANCIAL_DOMAINS.len());
        assert!(config.domains_param().starts_with("finance.yahoo.com,bloomberg.com,"));
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let result = Config::builder()
            .classifier_url("http://localhost:8000")
            .build();
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.to_string(), "Configuration error: news API key is required");
    }

    #[test]
    fn test_blank_classifier_url_fails_fast() {
        let result = Config::builder()
            .news_api_key("test-key")
            .classifier_url("   ")
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_urls_are_rejected() {
        assert!(builder().classifier_url("not a url").build().is_err());
        assert!(builder().classifier_url("ftp://example.com").build().is_err());
        assert!(builder().news_api_url("::").build().is_err());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        assert!(matches!(
            builder().max_concurrency(0).build(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("<redacted>"));
    }
}
