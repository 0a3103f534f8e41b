use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tripcrew_core::api::{
    parse_args, ChunkSummarizer, FieldKind, InputSchema, ScrapeConfig, Tool, ToolError, ToolSpec,
};

use crate::http::{build_client, send_text};

pub const TOOL_NAME: &str = "scrape_website";

/// Returned when a page has no readable text.
pub const EMPTY_PAGE: &str = "The page had no readable text content.";

static SCRIPT_STYLE_REGEX: OnceLock<Regex> = OnceLock::new();

fn script_style_regex() -> &'static Regex {
    SCRIPT_STYLE_REGEX.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
            .expect("SCRIPT_STYLE_REGEX is valid")
    })
}

/// Reduces an HTML document to its visible text, one non-empty line per line.
pub fn html_to_text(html: &str) -> String {
    let cleaned = script_style_regex().replace_all(html, " ");

    let mut text = String::with_capacity(cleaned.len());
    let mut in_tag = false;
    let mut chars = cleaned.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            // A bare '<' in running text is kept.
            '<' if !in_tag
                && chars
                    .peek()
                    .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')) =>
            {
                in_tag = true
            }
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    decode_entities(&text)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[derive(Debug, Deserialize)]
struct ScrapeArgs {
    website: String,
}

/// Fetches rendered page content from a browserless-style `/content` endpoint and
/// summarizes it window by window.
pub struct ScrapeWebsiteTool {
    spec: ToolSpec,
    http: reqwest::Client,
    cfg: ScrapeConfig,
    summarizer: ChunkSummarizer,
}

impl ScrapeWebsiteTool {
    pub fn new(cfg: &ScrapeConfig, summarizer: ChunkSummarizer) -> anyhow::Result<Self> {
        Ok(Self {
            spec: ToolSpec::new(
                TOOL_NAME,
                "Scrape a website's content and return a summary of it.",
                InputSchema::new().required(
                    "website",
                    FieldKind::String,
                    "The full URL of the page to scrape.",
                ),
            ),
            http: build_client(cfg.timeout_secs)?,
            cfg: cfg.clone(),
            summarizer,
        })
    }

    async fn fetch(&self, website: &str) -> Result<String, ToolError> {
        let url = self.cfg.url.as_str();
        let mut req = self
            .http
            .post(url)
            .header("cache-control", "no-cache")
            .json(&json!({ "url": website }));
        if let Some(token) = self.cfg.token.as_deref().filter(|t| !t.trim().is_empty()) {
            req = req.query(&[("token", token)]);
        }
        send_text(req, url)
            .await
            .map_err(|e| e.into_tool_error(TOOL_NAME))
    }
}

#[async_trait]
impl Tool for ScrapeWebsiteTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args: ScrapeArgs = parse_args(TOOL_NAME, args)?;
        let website = args.website.trim();
        if !(website.starts_with("http://") || website.starts_with("https://")) {
            return Err(ToolError::InvalidInput {
                tool: TOOL_NAME.to_string(),
                message: format!("'{website}' is not an http(s) URL"),
            });
        }

        let html = self.fetch(website).await?;
        let text = html_to_text(&html);
        tracing::debug!(
            tool = TOOL_NAME,
            website,
            html_chars = html.len(),
            text_chars = text.chars().count(),
            "page fetched"
        );
        if text.is_empty() {
            return Ok(EMPTY_PAGE.to_string());
        }

        self.summarizer.summarize(&text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tripcrew_core::api::{invoke, LanguageModel, PipelineConfig};
    use tripcrew_core::testing::{FnModel, ScriptedModel};

    fn summarizer(model: Arc<dyn LanguageModel>, chunk_size: usize) -> ChunkSummarizer {
        ChunkSummarizer::new(model, &PipelineConfig::default(), chunk_size)
    }

    #[test]
    fn test_html_to_text_drops_markup_and_scripts() {
        let html = r#"<html><head><style>body { color: red; }</style>
<script>var x = "<b>";</script></head>
<body>
  <h1>Kyoto   Guide</h1>
  <!-- hidden -->
  <p>Temples &amp; gardens</p>

  <p>Fish&nbsp;market</p>
</body></html>"#;
        assert_eq!(html_to_text(html), "Kyoto Guide\nTemples & gardens\nFish market");
    }

    #[test]
    fn test_html_to_text_keeps_bare_angle_brackets() {
        let html = "<p>Budget: 3 < 5 nights</p><p>Kyoto is great</p><p>a <= b</p>";
        assert_eq!(
            html_to_text(html),
            "Budget: 3 < 5 nights Kyoto is great a <= b"
        );
    }

    #[tokio::test]
    async fn test_scrape_summarizes_page() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/content")
            .match_header("cache-control", "no-cache")
            .match_query(Matcher::UrlEncoded("token".into(), "secret".into()))
            .match_body(Matcher::Json(json!({"url": "https://kyoto.example/guide"})))
            .with_status(200)
            .with_body("<p>Nishiki market opens at nine.</p>")
            .create_async()
            .await;

        let model = Arc::new(ScriptedModel::new(["Final Answer: Nishiki opens 9am."]));
        let cfg = ScrapeConfig {
            url: format!("{}/content", server.url()),
            token: Some("secret".into()),
            ..ScrapeConfig::default()
        };
        let tool = ScrapeWebsiteTool::new(&cfg, summarizer(model.clone(), 8000)).unwrap();

        let out = invoke(&tool, Value::String("https://kyoto.example/guide".into()))
            .await
            .unwrap();
        assert_eq!(out, "Nishiki opens 9am.");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].user.contains("Nishiki market opens at nine."));
        assert!(prompts[0].system.contains("Principal Researcher"));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_long_page_summaries_keep_chunk_order() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/content")
            .with_status(200)
            .with_body("<p>one</p><p>two</p><p>six</p>")
            .create_async()
            .await;

        let model: Arc<dyn LanguageModel> = Arc::new(FnModel::new(|prompt, _| {
            let body = prompt.user.split("----------\n").nth(1).unwrap_or_default();
            let word = body.split_whitespace().next().unwrap_or_default();
            Ok(format!("Final Answer: [{word}]"))
        }));
        let cfg = ScrapeConfig {
            url: format!("{}/content", server.url()),
            ..ScrapeConfig::default()
        };
        // "one two six" splits into windows of 4 chars.
        let tool = ScrapeWebsiteTool::new(&cfg, summarizer(model, 4)).unwrap();
        let out = tool
            .execute(json!({"website": "https://example.com"}))
            .await
            .unwrap();
        assert_eq!(out, "[one]\n\n[two]\n\n[six]");
    }

    #[tokio::test]
    async fn test_empty_page_is_sentinel() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/content")
            .with_status(200)
            .with_body("<html><script>1</script></html>")
            .create_async()
            .await;

        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()));
        let cfg = ScrapeConfig {
            url: format!("{}/content", server.url()),
            ..ScrapeConfig::default()
        };
        let tool = ScrapeWebsiteTool::new(&cfg, summarizer(model, 8000)).unwrap();
        let out = tool
            .execute(json!({"website": "https://example.com"}))
            .await
            .unwrap();
        assert_eq!(out, EMPTY_PAGE);
    }

    #[tokio::test]
    async fn test_non_url_is_recoverable_and_status_is_fatal() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/content")
            .with_status(503)
            .create_async()
            .await;

        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()));
        let cfg = ScrapeConfig {
            url: format!("{}/content", server.url()),
            ..ScrapeConfig::default()
        };
        let tool = ScrapeWebsiteTool::new(&cfg, summarizer(model, 8000)).unwrap();

        let err = tool.execute(json!({"website": "kyoto guide"})).await.unwrap_err();
        assert!(err.is_recoverable());

        let err = tool
            .execute(json!({"website": "https://example.com"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Status { status: 503, .. }));
    }
}
