// Public modules
pub mod analyzer;
pub mod collector;
pub mod config;
pub mod error;
pub mod filter;
pub mod markup;
pub mod models;
pub mod newsapi;
pub mod openai;
pub mod pipeline;
pub mod renderer;
pub mod report;

// Re-export commonly used types
pub use analyzer::ReportAnalyzer;
pub use collector::NewsCollector;
pub use config::Config;
pub use error::PulseError;
pub use filter::NewsFilter;
pub use models::{Article, RenderedReport, MAX_ARTICLES};
pub use newsapi::{NewsApiClient, NewsSource};
pub use openai::{CompletionClient, OpenAiClient};
pub use pipeline::{Pipeline, PipelineOutcome, Progress, Stage};
pub use renderer::ReportRenderer;
pub use report::{AnalysisReport, Section, SectionKind};
