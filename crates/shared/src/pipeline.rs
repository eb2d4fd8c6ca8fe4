//! Collect → analyze → render, once, in order.
//!
//! Each stage builds its component from the shared [`Config`] when the stage
//! starts, so a missing credential surfaces at the stage that needs it. Any
//! failure or empty result aborts the run before the report file is touched.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::analyzer::ReportAnalyzer;
use crate::collector::NewsCollector;
use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::models::{Article, RenderedReport};
use crate::newsapi::NewsSource;
use crate::openai::CompletionClient;
use crate::renderer::ReportRenderer;
use crate::report::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collecting,
    Analyzing,
    Rendering,
    Done,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Collecting => "collecting",
            Stage::Analyzing => "analyzing",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Milestones reported to the caller while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Started(Stage),
    /// Articles kept after filtering.
    Collected(usize),
    /// Sections found in the analysis.
    Analyzed(usize),
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Done {
        report: RenderedReport,
        articles: Vec<Article>,
        analysis: AnalysisReport,
    },
    Aborted {
        stage: Stage,
        error: PulseError,
    },
}

impl PipelineOutcome {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineOutcome::Done { .. } => Stage::Done,
            PipelineOutcome::Aborted { .. } => Stage::Aborted,
        }
    }
}

pub struct Pipeline {
    config: Config,
    news: Arc<dyn NewsSource>,
    completions: Arc<dyn CompletionClient>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        news: Arc<dyn NewsSource>,
        completions: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            config,
            news,
            completions,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs only the collection stage.
    pub async fn collect(&self, now: &DateTime<Local>) -> Result<Vec<Article>> {
        let collector = NewsCollector::new(&self.config, self.news.clone())?;
        collector.collect(now).await
    }

    pub async fn run(&self, now: &DateTime<Local>) -> PipelineOutcome {
        self.run_with_progress(now, |_| {}).await
    }

    /// Same as [`Pipeline::run`], calling `progress` as each stage starts and
    /// finishes.
    pub async fn run_with_progress<F>(
        &self,
        now: &DateTime<Local>,
        mut progress: F,
    ) -> PipelineOutcome
    where
        F: FnMut(Progress),
    {
        // Collecting
        info!(stage = %Stage::Collecting, "stage started");
        progress(Progress::Started(Stage::Collecting));
        let articles = match self.collect(now).await {
            Ok(articles) if articles.is_empty() => {
                return abort(Stage::Collecting, PulseError::EmptyResult);
            }
            Ok(articles) => articles,
            Err(e) => return abort(Stage::Collecting, e),
        };
        info!(stage = %Stage::Collecting, articles = articles.len(), "stage finished");
        progress(Progress::Collected(articles.len()));

        // Analyzing
        info!(stage = %Stage::Analyzing, "stage started");
        progress(Progress::Started(Stage::Analyzing));
        let analysis = match self.analyze(&articles).await {
            Ok(analysis) if analysis.is_empty() => {
                return abort(
                    Stage::Analyzing,
                    PulseError::Analysis("model returned an empty completion".to_string()),
                );
            }
            Ok(analysis) => analysis,
            Err(e) => return abort(Stage::Analyzing, e),
        };
        info!(
            stage = %Stage::Analyzing,
            sections = analysis.sections.len(),
            "stage finished"
        );
        progress(Progress::Analyzed(analysis.sections.len()));

        // Rendering
        info!(stage = %Stage::Rendering, "stage started");
        progress(Progress::Started(Stage::Rendering));
        let renderer = ReportRenderer::new(&self.config);
        let report = match renderer.render(&articles, &analysis, now) {
            Ok(report) => report,
            Err(e) => return abort(Stage::Rendering, e),
        };

        info!(stage = %Stage::Done, path = %report.path.display(), "pipeline complete");
        PipelineOutcome::Done {
            report,
            articles,
            analysis,
        }
    }

    async fn analyze(&self, articles: &[Article]) -> Result<AnalysisReport> {
        let analyzer = ReportAnalyzer::new(&self.config, self.completions.clone())?;
        analyzer.analyze(articles).await
    }
}

fn abort(stage: Stage, error: PulseError) -> PipelineOutcome {
    error!(%stage, error = %error, "pipeline aborted");
    PipelineOutcome::Aborted { stage, error }
}
