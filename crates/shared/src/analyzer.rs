use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::models::Article;
use crate::openai::{ChatRequest, CompletionClient, Message};
use crate::report::AnalysisReport;

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 600;

pub const SYSTEM_PERSONA: &str = "You're an AI technology analyst writing a daily NEWS ROUNDUP. \
Your job is to cover MULTIPLE stories, not to deep-dive a single topic. Mention 3-4 different \
developments in What's New and 2-3 business items when they exist. Breadth beats depth: think \
newsletter summary, not long-form article. Technical AI developments come first, but you cover \
the full landscape of what happened today.";

const INSTRUCTIONS: &str = r#"Analyze today's AI and technology news. Be enthusiastic about real innovation and realistic about challenges and limitations.

TODAY'S AI NEWS:
{articles}

This is a ROUNDUP newsletter. Cover MULTIPLE distinct stories across the sections below and do not let one story dominate the report.

Write each section title exactly as shown, alone on its own line, wrapped in double asterisks. Use these five sections in this order:

**HEADLINE OF THE DAY**
One punchy sentence on the most significant TECHNICAL development in AI today. Prefer new models over new products over research results.

**WHAT'S NEW**
Cover 3-4 DIFFERENT announcements from today as bullet points, 1-2 sentences each: model releases, new AI products or features, research breakthroughs, developer tools or APIs. Spread the bullets across multiple stories.

**BUSINESS MOVES**
Cover 2-3 DIFFERENT business developments as bullet points: funding rounds, partnerships or acquisitions, restructuring or layoffs, leadership changes. Mention each item once, briefly. If there are no business stories at all, skip this section entirely, title included.

**WHY IT MATTERS**
3-4 sentences of practical takeaways. How do today's developments affect developers, businesses or users, and what is the bigger picture? Mix enthusiasm with realism.

**BOTTOM LINE**
One sentence summing up the day.

Voice:
- Breadth, not depth
- Enthusiastic about genuine innovation, realistic about limitations
- Accessible language without excessive jargon"#;

/// Serializes articles into title/source/description/url blocks separated by
/// a blank line, in input order.
pub fn format_articles(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| {
            format!(
                "**{}**\nSource: {}\nDescription: {}\nURL: {}",
                a.title, a.source, a.description, a.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(articles: &[Article]) -> String {
    INSTRUCTIONS.replace("{articles}", &format_articles(articles))
}

pub struct ReportAnalyzer {
    client: Arc<dyn CompletionClient>,
    api_key: String,
    model: String,
}

impl ReportAnalyzer {
    pub fn new(config: &Config, client: Arc<dyn CompletionClient>) -> Result<Self> {
        let api_key = config.openai_api_key()?.to_string();

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn request(&self, articles: &[Article]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(SYSTEM_PERSONA),
                Message::user(build_prompt(articles)),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }

    /// Sends one completion request and wraps the text unmodified.
    ///
    /// Callers must pass a non-empty article set.
    pub async fn analyze(&self, articles: &[Article]) -> Result<AnalysisReport> {
        let request = self.request(articles);

        info!(articles = articles.len(), model = %self.model, "requesting analysis");
        let text = self
            .client
            .complete(&self.api_key, &request)
            .await
            .map_err(|e| PulseError::Analysis(e.to_string()))?;

        let report = AnalysisReport::parse(text);

        if !report.is_empty() {
            if !report.is_structured() {
                warn!("analysis has no section markers; rendering it as a single body");
            }
            for missing in report.missing_sections() {
                warn!(section = missing.title(), "analysis is missing a section");
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingClient {
        reply: std::result::Result<String, String>,
        requests: Mutex<Vec<(String, ChatRequest)>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String> {
            self.requests
                .lock()
                .unwrap()
                .push((api_key.to_string(), request.clone()));
            self.reply
                .clone()
                .map_err(|message| PulseError::Provider { message })
        }
    }

    fn client(reply: std::result::Result<&str, &str>) -> Arc<RecordingClient> {
        Arc::new(RecordingClient {
            reply: reply.map(str::to_string).map_err(str::to_string),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn config() -> Config {
        Config {
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        }
    }

    fn articles() -> Vec<Article> {
        vec![
            Article {
                title: "OpenAI releases GPT-5".to_string(),
                description: "Better multi-step reasoning".to_string(),
                source: "TechCrunch".to_string(),
                url: "https://example.com/gpt5".to_string(),
                published_at: None,
            },
            Article {
                title: "Google DeepMind announces AlphaFold 4".to_string(),
                description: "Protein structure prediction".to_string(),
                source: "Nature".to_string(),
                url: "https://example.com/alphafold".to_string(),
                published_at: None,
            },
        ]
    }

    #[test]
    fn test_format_articles_blocks_in_order() {
        let text = format_articles(&articles());
        assert_eq!(
            text,
            "**OpenAI releases GPT-5**\nSource: TechCrunch\nDescription: Better multi-step reasoning\nURL: https://example.com/gpt5\n\n\
**Google DeepMind announces AlphaFold 4**\nSource: Nature\nDescription: Protein structure prediction\nURL: https://example.com/alphafold"
        );
    }

    #[test]
    fn test_prompt_lists_sections_in_order() {
        let prompt = build_prompt(&articles());
        assert!(prompt.contains("OpenAI releases GPT-5"));
        assert!(!prompt.contains("{articles}"));

        let positions: Vec<usize> = crate::report::SectionKind::ALL
            .iter()
            .map(|k| prompt.find(&format!("**{}**", k.title())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_new_requires_llm_key() {
        let result = ReportAnalyzer::new(&Config::default(), client(Ok("x")));
        assert!(matches!(
            result,
            Err(PulseError::ConfigMissing { var: "OPENAI_API_KEY" })
        ));
    }

    #[tokio::test]
    async fn test_analyze_sends_one_fixed_request() {
        let client = client(Ok("**HEADLINE OF THE DAY**\nGPT-5 ships."));
        let analyzer = ReportAnalyzer::new(&config(), client.clone()).unwrap();

        let report = analyzer.analyze(&articles()).await.unwrap();
        assert_eq!(report.raw, "**HEADLINE OF THE DAY**\nGPT-5 ships.");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (key, request) = &requests[0];
        assert_eq!(key, "sk-test");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 600);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0], Message::system(SYSTEM_PERSONA));
        assert_eq!(request.messages[1].role, "user");
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_analysis_error() {
        let analyzer = ReportAnalyzer::new(&config(), client(Err("quota exceeded"))).unwrap();
        match analyzer.analyze(&articles()).await {
            Err(PulseError::Analysis(message)) => assert!(message.contains("quota exceeded")),
            other => panic!("expected Analysis error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unstructured_output_is_still_returned() {
        let analyzer = ReportAnalyzer::new(&config(), client(Ok("Plain prose summary."))).unwrap();
        let report = analyzer.analyze(&articles()).await.unwrap();
        assert!(!report.is_structured());
        assert_eq!(report.sections[0].body, "Plain prose summary.");
    }
}
