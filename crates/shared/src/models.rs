use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Maximum number of articles handed to the analyzer in one run.
pub const MAX_ARTICLES: usize = 20;

/// One normalized news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub source: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Publication time for display, e.g. "Oct 17, 14:05 UTC"; empty when unknown.
    pub fn published_display(&self) -> String {
        self.published_at
            .map(|dt| dt.format("%b %d, %H:%M UTC").to_string())
            .unwrap_or_default()
    }

    /// Description cut to `max_chars` characters, respecting UTF-8 boundaries.
    pub fn description_preview(&self, max_chars: usize) -> String {
        match self.description.char_indices().nth(max_chars) {
            Some((end, _)) => format!("{}...", &self.description[..end]),
            None => self.description.clone(),
        }
    }
}

/// A report written to disk.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub html: String,
    pub path: PathBuf,
}
