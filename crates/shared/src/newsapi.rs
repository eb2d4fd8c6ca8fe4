use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{PulseError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsApiResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "totalResults")]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

impl NewsApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Where raw search results come from.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, url: &Url) -> Result<NewsApiResponse>;
}

/// NewsAPI over HTTP.
pub struct NewsApiClient {
    client: Client,
}

impl NewsApiClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("ai-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PulseError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, url: &Url) -> Result<NewsApiResponse> {
        debug!(host = url.host_str().unwrap_or(""), "querying news provider");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_response(status.as_u16(), &body)
    }
}

/// Turns a raw HTTP answer into a provider response.
///
/// NewsAPI reports most failures as JSON with `status: "error"`, so a
/// parseable error body is passed through for the collector to inspect.
pub fn parse_response(http_status: u16, body: &str) -> Result<NewsApiResponse> {
    match serde_json::from_str::<NewsApiResponse>(body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !(200..300).contains(&http_status) => Err(PulseError::provider(format!(
            "HTTP {}: {}",
            http_status,
            body.chars().take(200).collect::<String>()
        ))),
        Err(e) => Err(PulseError::provider(format!(
            "malformed response from news provider: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": null, "name": "The Verge"},
                "title": "Gemini gets faster",
                "description": "Google ships an update",
                "url": "https://www.theverge.com/gemini",
                "publishedAt": "2026-02-01T15:30:00Z"
            }]
        }"#;
        let parsed = parse_response(200, body).unwrap();
        assert!(parsed.is_ok());
        assert_eq!(parsed.total_results, 1);
        let article = &parsed.articles[0];
        assert_eq!(article.title.as_deref(), Some("Gemini gets faster"));
        assert_eq!(
            article.source.as_ref().and_then(|s| s.name.as_deref()),
            Some("The Verge")
        );
    }

    #[test]
    fn test_parse_error_body_passes_through() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let parsed = parse_response(401, body).unwrap();
        assert!(!parsed.is_ok());
        assert_eq!(parsed.code.as_deref(), Some("apiKeyInvalid"));
        assert_eq!(parsed.message.as_deref(), Some("Your API key is invalid."));
    }

    #[test]
    fn test_non_json_error_is_provider_error() {
        let err = parse_response(502, "<html>Bad Gateway</html>").unwrap_err();
        match err {
            PulseError::Provider { message } => assert!(message.starts_with("HTTP 502")),
            other => panic!("expected Provider, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_with_success_status_is_provider_error() {
        assert!(matches!(
            parse_response(200, "not json"),
            Err(PulseError::Provider { .. })
        ));
    }

    #[test]
    fn test_null_fields_deserialize() {
        let body = r#"{"status":"ok","articles":[{"title":null,"description":null,"source":null,"url":null,"publishedAt":null}]}"#;
        let parsed = parse_response(200, body).unwrap();
        assert!(parsed.articles[0].title.is_none());
        assert!(parsed.articles[0].source.is_none());
    }
}
