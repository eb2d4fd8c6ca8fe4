use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::filter::NewsFilter;
use crate::models::Article;
use crate::newsapi::{NewsApiResponse, NewsSource, RawArticle};

/// AI vendors and generic AI terms, minus finance and crypto noise.
pub const SEARCH_QUERY: &str = concat!(
    r#"("artificial intelligence" OR "machine learning" OR "#,
    r#""OpenAI" OR "Anthropic" OR "ChatGPT" OR "Claude" OR "#,
    r#""Google Gemini" OR "Microsoft Copilot" OR "GitHub Copilot" OR "#,
    r#""Meta AI" OR "AI model" OR "LLM" OR "large language model" OR "#,
    r#""generative AI" OR "GPT-4" OR "GPT-5" OR "AI assistant" OR "#,
    r#""neural network" OR "Moltbot") "#,
    r#"-crypto -cryptocurrency -bitcoin -blockchain -"Ai Weiwei" -stock -stocks"#,
);

/// Largest page NewsAPI serves in one request.
pub const PAGE_SIZE: u32 = 50;

pub struct NewsCollector {
    source: Arc<dyn NewsSource>,
    endpoint: String,
    api_key: String,
    filter: NewsFilter,
}

impl NewsCollector {
    pub fn new(config: &Config, source: Arc<dyn NewsSource>) -> Result<Self> {
        let api_key = config.news_api_key()?.to_string();

        Ok(Self {
            source,
            endpoint: config.news_api_url.clone(),
            api_key,
            filter: NewsFilter::default(),
        })
    }

    /// Builds the search URL covering yesterday through today.
    pub fn search_url<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Url> {
        let today = now.date_naive();
        let yesterday = today - Duration::days(1);
        let from = yesterday.format("%Y-%m-%d").to_string();
        let to = today.format("%Y-%m-%d").to_string();
        let page_size = PAGE_SIZE.to_string();

        Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", SEARCH_QUERY),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| PulseError::Transport(format!("invalid news endpoint {}: {e}", self.endpoint)))
    }

    /// Fetches the last day of AI news. An empty vector means nothing
    /// survived filtering; the caller decides whether that is fatal.
    pub async fn collect(&self, now: &DateTime<Local>) -> Result<Vec<Article>> {
        let url = self.search_url(now)?;
        let response = self.source.search(&url).await?;
        self.process(response)
    }

    /// Status check, normalization, filtering and truncation.
    pub fn process(&self, response: NewsApiResponse) -> Result<Vec<Article>> {
        if !response.is_ok() {
            let message = response
                .message
                .or(response.code)
                .unwrap_or_else(|| format!("unexpected status {:?}", response.status));
            return Err(PulseError::Provider { message });
        }

        let received = response.articles.len();
        if received == 0 {
            warn!("news provider returned no articles");
            return Ok(Vec::new());
        }

        let articles: Vec<Article> = response.articles.into_iter().map(normalize).collect();
        let kept = self.filter.apply(articles);

        info!(received, kept = kept.len(), "filtered news articles");
        Ok(kept)
    }
}

/// Converts one provider record into an [`Article`], filling placeholders
/// for missing fields.
pub fn normalize(raw: RawArticle) -> Article {
    let published_at = raw
        .published_at
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Article {
        title: raw.title.unwrap_or_else(|| "No title".to_string()),
        description: raw
            .description
            .unwrap_or_else(|| "No description".to_string()),
        source: raw
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        url: raw.url.unwrap_or_default(),
        published_at,
    }
}
