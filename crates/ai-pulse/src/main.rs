use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use shared::{
    Article, Config, NewsApiClient, OpenAiClient, Pipeline, PipelineOutcome, Progress, Stage,
};
use tracing_subscriber::EnvFilter;

/// Articles shown by `--collect-only`.
const LISTED_ARTICLES: usize = 10;

#[derive(Parser)]
#[command(name = "ai-pulse")]
#[command(about = "Collect the day's AI news, summarize it with an LLM and write an HTML report")]
struct Args {
    /// Directory the dated report is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Model used for the analysis
    #[arg(short, long)]
    model: Option<String>,

    /// Only collect and list today's articles
    #[arg(long)]
    collect_only: bool,

    /// Print the analysis text after the report is written
    #[arg(long)]
    print_analysis: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let now = Local::now();
    println!("\n⚡ AI PULSE - Daily Report");
    println!("📅 {}", now.format("%A, %B %d, %Y"));
    println!("{}", "=".repeat(70));

    let news = Arc::new(NewsApiClient::new()?);
    let completions = Arc::new(OpenAiClient::new(config.openai_api_url.clone())?);

    if args.collect_only {
        config.news_api_key().context("Cannot collect news")?;
        let pipeline = Pipeline::new(config, news, completions);
        return list_articles(&pipeline).await;
    }

    config.validate().context("Missing configuration")?;
    let pipeline = Pipeline::new(config, news, completions);

    let outcome = pipeline.run_with_progress(&now, report_progress).await;
    match outcome {
        PipelineOutcome::Done {
            report, analysis, ..
        } => {
            if args.print_analysis {
                println!("\n{}", "=".repeat(70));
                println!("TODAY'S AI PULSE REPORT");
                println!("{}\n", "=".repeat(70));
                println!("{}", analysis.raw);
            }

            println!("\n{}", "=".repeat(70));
            println!("✅ DAILY REPORT COMPLETE!");
            println!("📂 Saved to: {}", report.path.display());
            println!("{}\n", "=".repeat(70));
            Ok(())
        }
        PipelineOutcome::Aborted { stage, error } => {
            let step = match stage {
                Stage::Collecting => "collect news",
                Stage::Analyzing => "analyze news",
                Stage::Rendering => "render the report",
                Stage::Done | Stage::Aborted => "finish",
            };
            eprintln!("❌ Failed to {}: {} - aborting", step, error);
            anyhow::bail!("pipeline aborted while {}", stage)
        }
    }
}

fn report_progress(progress: Progress) {
    match progress {
        Progress::Started(Stage::Collecting) => println!("\n📰 Collecting AI news..."),
        Progress::Collected(count) => println!("✓ Collected {} articles", count),
        Progress::Started(Stage::Analyzing) => println!("\n🤖 Analyzing with AI..."),
        Progress::Analyzed(sections) => println!("✓ Analysis complete ({} sections)", sections),
        Progress::Started(Stage::Rendering) => println!("\n📄 Generating HTML report..."),
        Progress::Started(_) => {}
    }
}

async fn list_articles(pipeline: &Pipeline) -> Result<()> {
    println!("\n📰 Fetching AI news from NewsAPI...");
    let articles = pipeline
        .collect(&Local::now())
        .await
        .context("Failed to collect news")?;

    if articles.is_empty() {
        println!("⚠ No articles found");
        return Ok(());
    }

    print!("{}", format_listing(&articles, LISTED_ARTICLES));
    Ok(())
}

/// Count line followed by the first `limit` articles.
fn format_listing(articles: &[Article], limit: usize) -> String {
    let mut out = format!("✓ Fetched {} articles\n\n", articles.len());
    for (i, article) in articles.iter().take(limit).enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, article.title));
        out.push_str(&format!("   Source: {}\n", article.source));
        out.push_str(&format!(
            "   Description: {}\n\n",
            article.description_preview(150)
        ));
    }
    if articles.len() > limit {
        out.push_str(&format!("... and {} more\n", articles.len() - limit));
    }
    out
}
