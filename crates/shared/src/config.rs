use std::env;
use std::path::PathBuf;

use crate::error::{PulseError, Result};

pub const NEWS_API_KEY_VAR: &str = "NEWSAPI_KEY";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OUTPUT_DIR: &str = "reports/daily";
pub const DEFAULT_TIMEZONE_LABEL: &str = "ET";

/// Everything a pipeline run needs, resolved once at startup.
///
/// Credentials stay optional here so that each component can report exactly
/// which one is missing when it is constructed. Call [`Config::validate`]
/// before starting a run to fail early instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub news_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub news_api_url: String,
    pub openai_api_url: String,
    pub model: String,
    pub output_dir: PathBuf,
    pub timezone_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            openai_api_key: None,
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timezone_label: DEFAULT_TIMEZONE_LABEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        Self {
            news_api_key: get(NEWS_API_KEY_VAR),
            openai_api_key: get(OPENAI_API_KEY_VAR),
            news_api_url: get("NEWSAPI_URL").unwrap_or(defaults.news_api_url),
            openai_api_url: get("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            model: get("AI_PULSE_MODEL").unwrap_or(defaults.model),
            output_dir: get("AI_PULSE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            timezone_label: get("AI_PULSE_TIMEZONE_LABEL").unwrap_or(defaults.timezone_label),
        }
    }

    /// Checks every required credential, reporting the first one missing.
    pub fn validate(&self) -> Result<()> {
        self.news_api_key()?;
        self.openai_api_key()?;
        Ok(())
    }

    pub fn news_api_key(&self) -> Result<&str> {
        self.news_api_key
            .as_deref()
            .ok_or(PulseError::ConfigMissing {
                var: NEWS_API_KEY_VAR,
            })
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or(PulseError::ConfigMissing {
                var: OPENAI_API_KEY_VAR,
            })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/ai-pulse/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("ai-pulse").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // Nothing found is fine; the variables may be set system-wide
    }
}
