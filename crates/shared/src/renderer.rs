use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use chrono::{DateTime, TimeZone};
use tracing::info;

use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::markup::{escape_html, to_html};
use crate::models::{Article, RenderedReport};
use crate::report::AnalysisReport;

#[derive(Template)]
#[template(path = "daily_report.html")]
struct DailyReportPage<'a> {
    date: String,
    time: String,
    day: String,
    articles: &'a [Article],
    analysis_html: String,
}

/// Section headings become `<h2>`; bodies go through the markup converter.
pub fn analysis_to_html(report: &AnalysisReport) -> String {
    let mut html = String::new();

    for section in &report.sections {
        if let Some(heading) = &section.heading {
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(heading)));
        }
        html.push_str(&to_html(&section.body));
    }

    html
}

pub struct ReportRenderer {
    output_dir: PathBuf,
    timezone_label: String,
}

impl ReportRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            timezone_label: config.timezone_label.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/report_YYYYMMDD.html`. Same date, same path.
    pub fn report_path<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.output_dir
            .join(format!("report_{}.html", now.format("%Y%m%d")))
    }

    pub fn generate<Tz: TimeZone>(
        &self,
        articles: &[Article],
        report: &AnalysisReport,
        now: &DateTime<Tz>,
    ) -> Result<String>
    where
        Tz::Offset: std::fmt::Display,
    {
        let page = DailyReportPage {
            date: now.format("%B %d, %Y").to_string(),
            time: format!("{} {}", now.format("%I:%M %p"), self.timezone_label),
            day: now.format("%A").to_string(),
            articles,
            analysis_html: analysis_to_html(report),
        };

        page.render()
            .map_err(|e| PulseError::Render(format!("template error: {e}")))
    }

    /// Renders and writes the day's report, replacing any earlier one.
    pub fn render<Tz: TimeZone>(
        &self,
        articles: &[Article],
        report: &AnalysisReport,
        now: &DateTime<Tz>,
    ) -> Result<RenderedReport>
    where
        Tz::Offset: std::fmt::Display,
    {
        let html = self.generate(articles, report, now)?;
        let path = self.report_path(now);

        fs::create_dir_all(&self.output_dir).map_err(|e| {
            PulseError::Render(format!(
                "failed to create {}: {e}",
                self.output_dir.display()
            ))
        })?;
        fs::write(&path, &html)
            .map_err(|e| PulseError::Render(format!("failed to write {}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = html.len(), "report written");

        Ok(RenderedReport { html, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use tempfile::TempDir;

    fn renderer(dir: &Path) -> ReportRenderer {
        ReportRenderer::new(&Config {
            output_dir: dir.join("reports").join("daily"),
            ..Config::default()
        })
    }

    fn articles() -> Vec<Article> {
        vec![Article {
            title: "Anthropic launches Claude 5".to_string(),
            description: "New model".to_string(),
            source: "TechCrunch".to_string(),
            url: "https://techcrunch.com/claude".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2026, 2, 1, 15, 30, 0).unwrap()),
        }]
    }

    fn report() -> AnalysisReport {
        AnalysisReport::parse(
            "**HEADLINE OF THE DAY**\nClaude 5 arrives.\n\n**WHAT'S NEW**\n- **Claude 5** ships\n- Gemini update",
        )
    }

    fn morning() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 2, 1, 9, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_analysis_to_html_sections() {
        let html = analysis_to_html(&report());
        assert_eq!(
            html,
            "<h2>HEADLINE OF THE DAY</h2>\n<p>Claude 5 arrives.</p>\n\
<h2>WHAT&#39;S NEW</h2>\n<ul>\n<li><strong>Claude 5</strong> ships</li>\n<li>Gemini update</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_unheaded_fallback_has_no_heading() {
        let html = analysis_to_html(&AnalysisReport::parse("Plain summary."));
        assert_eq!(html, "<p>Plain summary.</p>\n");
    }

    #[test]
    fn test_report_path_is_keyed_by_date() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(dir.path());
        let path = renderer.report_path(&morning());
        assert_eq!(
            path,
            dir.path().join("reports/daily/report_20260201.html")
        );
    }

    #[test]
    fn test_generate_fills_template() {
        let dir = TempDir::new().unwrap();
        let html = renderer(dir.path())
            .generate(&articles(), &report(), &morning())
            .unwrap();

        assert!(html.contains("February 01, 2026"));
        assert!(html.contains("Sunday"));
        assert!(html.contains("09:05 AM ET"));
        assert!(html.contains("<h2>HEADLINE OF THE DAY</h2>"));
        assert!(html.contains("<strong>Claude 5</strong> ships"));
        assert!(html.contains("Anthropic launches Claude 5"));
        assert!(html.contains("Sources (1)"));
    }

    #[test]
    fn test_generate_escapes_article_titles() {
        let dir = TempDir::new().unwrap();
        let mut list = articles();
        list[0].title = "Claude <beta>".to_string();
        let html = renderer(dir.path())
            .generate(&list, &report(), &morning())
            .unwrap();
        assert!(html.contains("Claude &lt;beta&gt;"));
        assert!(!html.contains("Claude <beta>"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(dir.path());
        let first = renderer.generate(&articles(), &report(), &morning()).unwrap();
        let second = renderer.generate(&articles(), &report(), &morning()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_creates_directory_and_overwrites_same_day() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(dir.path());

        let first = renderer.render(&articles(), &report(), &morning()).unwrap();
        assert!(first.path.exists());
        assert_eq!(fs::read_to_string(&first.path).unwrap(), first.html);

        let later = morning() + chrono::Duration::hours(3);
        let second = renderer
            .render(&[], &AnalysisReport::parse("Second run."), &later)
            .unwrap();

        assert_eq!(first.path, second.path);
        let on_disk = fs::read_to_string(&second.path).unwrap();
        assert!(on_disk.contains("Second run."));
        assert!(!on_disk.contains("Sources ("));
        assert_eq!(fs::read_dir(renderer.output_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_render_fails_when_output_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory").unwrap();

        let renderer = ReportRenderer::new(&Config {
            output_dir: blocker,
            ..Config::default()
        });
        assert!(matches!(
            renderer.render(&articles(), &report(), &morning()),
            Err(PulseError::Render(_))
        ));
    }
}
