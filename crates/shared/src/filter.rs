use url::Url;

use crate::models::{Article, MAX_ARTICLES};

/// Low-signal or aggregator hosts. Matched as substrings of the URL host.
pub const EXCLUDED_SOURCES: &[&str] = &[
    "reddit",
    "medium",
    "blogspot",
    "wordpress",
    "seekingalpha",
    "benzinga",
    "yahoo",
    "pypi.org",
    "github.com",
    "stackoverflow",
    "timesofindia.indiatimes.com",
    "onefootball.com",
    "commondreams.org",
    "staradvertiser.com",
];

/// Terms that indicate AI is the main topic. Matched case-insensitively as
/// substrings of the title or description.
pub const AI_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "neural network",
    "openai",
    "anthropic",
    "chatgpt",
    "claude",
    "gemini",
    "copilot",
    "llm",
    "language model",
    "generative",
    "gpt",
    "deepmind",
    "moltbot",
];

/// Decides which candidate articles make it into a run.
///
/// An article is kept iff its source is not excluded AND it mentions at least
/// one AI keyword. Exclusion always wins.
#[derive(Debug, Clone)]
pub struct NewsFilter {
    excluded_sources: Vec<String>,
    keywords: Vec<String>,
}

impl Default for NewsFilter {
    fn default() -> Self {
        Self::new(EXCLUDED_SOURCES, AI_KEYWORDS)
    }
}

impl NewsFilter {
    pub fn new(excluded_sources: &[&str], keywords: &[&str]) -> Self {
        Self {
            excluded_sources: excluded_sources.iter().map(|s| s.to_lowercase()).collect(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// True when the URL's host matches an exclusion entry. URLs without a
    /// parseable host are matched as a whole.
    pub fn is_excluded(&self, url: &str) -> bool {
        let haystack = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_else(|| url.to_lowercase());

        self.excluded_sources
            .iter()
            .any(|source| haystack.contains(source.as_str()))
    }

    pub fn is_ai_relevant(&self, title: &str, description: &str) -> bool {
        let title = title.to_lowercase();
        let description = description.to_lowercase();

        self.keywords
            .iter()
            .any(|kw| title.contains(kw.as_str()) || description.contains(kw.as_str()))
    }

    pub fn keeps(&self, article: &Article) -> bool {
        !self.is_excluded(&article.url) && self.is_ai_relevant(&article.title, &article.description)
    }

    /// Filters in order, then caps the result at [`MAX_ARTICLES`].
    pub fn apply(&self, articles: Vec<Article>) -> Vec<Article> {
        articles
            .into_iter()
            .filter(|a| self.keeps(a))
            .take(MAX_ARTICLES)
            .collect()
    }
}
