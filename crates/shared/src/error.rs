use thiserror::Error;

/// Failures that stop a pipeline run.
///
/// Each stage converts its own external-call errors into one of these
/// variants. Nothing is retried.
#[derive(Debug, Error)]
pub enum PulseError {
    /// A required credential is not configured.
    #[error("{var} is not set. Set it as an environment variable or add it to ~/.config/ai-pulse/.env")]
    ConfigMissing { var: &'static str },

    /// Network failure or timeout talking to a provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// A provider answered with a non-success status.
    #[error("provider error: {message}")]
    Provider { message: String },

    /// No article survived filtering.
    #[error("no AI articles found for the last 24 hours")]
    EmptyResult,

    /// The completion request failed or produced nothing usable.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Template rendering or writing the report file failed.
    #[error("failed to render report: {0}")]
    Render(String),
}

impl PulseError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for PulseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
