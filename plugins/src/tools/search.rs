use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tripcrew_core::api::{
    parse_args, FieldKind, InputSchema, SearchConfig, SearchProvider, Tool, ToolError, ToolSpec,
};

use crate::http::{build_client, send_json};

pub const TOOL_NAME: &str = "web_search";

/// Returned when a search matches nothing.
pub const NO_RESULTS: &str =
    "Sorry, I couldn't find anything about that. Try a different or broader query.";

const SEPARATOR: &str = "-----------------";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    #[default]
    Basic,
    Deep,
}

impl SearchDepth {
    fn as_tavily_value(self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Deep => "advanced",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    search_depth: SearchDepth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    fn render(&self) -> String {
        format!(
            "Title: {}\nLink: {}\nSnippet: {}\n\n{SEPARATOR}",
            self.title, self.link, self.snippet
        )
    }
}

/// Web search over Serper (`organic[]`) or Tavily (`results[]`).
pub struct WebSearchTool {
    spec: ToolSpec,
    http: reqwest::Client,
    cfg: SearchConfig,
}

impl WebSearchTool {
    pub fn new(cfg: &SearchConfig) -> anyhow::Result<Self> {
        Ok(Self {
            spec: ToolSpec::new(
                TOOL_NAME,
                "Search the internet about a given topic and return the most relevant results \
                 (title, link and snippet).",
                InputSchema::new()
                    .required("query", FieldKind::String, "The search query to look up.")
                    .optional(
                        "search_depth",
                        FieldKind::Enum(vec!["basic", "deep"]),
                        "How thorough the search should be. Defaults to basic.",
                    ),
            ),
            http: build_client(cfg.timeout_secs)?,
            cfg: cfg.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, ToolError> {
        let (key, var) = match self.cfg.provider {
            SearchProvider::Serper => (&self.cfg.serper_api_key, "SERPER_API_KEY"),
            SearchProvider::Tavily => (&self.cfg.tavily_api_key, "TAVILY_API_KEY"),
        };
        if key.trim().is_empty() {
            return Err(ToolError::NotConfigured {
                tool: TOOL_NAME.to_string(),
                message: format!("{var} is not set"),
            });
        }
        Ok(key)
    }

    async fn query(&self, args: &SearchArgs) -> Result<Value, ToolError> {
        let key = self.api_key()?;
        let (url, req) = match self.cfg.provider {
            SearchProvider::Serper => {
                let url = &self.cfg.serper_url;
                let req = self
                    .http
                    .post(url)
                    .header("X-API-KEY", key)
                    .json(&json!({ "q": args.query, "num": self.cfg.top_n }));
                (url, req)
            }
            SearchProvider::Tavily => {
                let url = &self.cfg.tavily_url;
                let req = self.http.post(url).bearer_auth(key).json(&json!({
                    "query": args.query,
                    "search_depth": args.search_depth.as_tavily_value(),
                    "max_results": self.cfg.top_n,
                }));
                (url, req)
            }
        };

        send_json(req, url)
            .await
            .map_err(|e| e.into_tool_error(TOOL_NAME))
    }
}

/// Extracts hits from a provider response, counting entries missing a field.
///
/// `Ok(None)` means the response carried no result list at all.
fn extract_hits(
    provider: SearchProvider,
    body: &Value,
    top_n: usize,
) -> Result<Option<(Vec<SearchHit>, usize)>, ToolError> {
    let (list_key, link_key, snippet_key) = match provider {
        SearchProvider::Serper => ("organic", "link", "snippet"),
        SearchProvider::Tavily => ("results", "url", "content"),
    };

    if !body.is_object() {
        return Err(ToolError::Malformed {
            tool: TOOL_NAME.to_string(),
            message: "expected a JSON object".to_string(),
        });
    }
    let Some(list) = body.get(list_key) else {
        return Ok(None);
    };
    let Some(entries) = list.as_array() else {
        return Err(ToolError::Malformed {
            tool: TOOL_NAME.to_string(),
            message: format!("'{list_key}' is not an array"),
        });
    };

    let field = |entry: &Value, key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut hits = Vec::new();
    let mut skipped = 0;
    for entry in entries.iter().take(top_n) {
        match (field(entry, "title"), field(entry, link_key), field(entry, snippet_key)) {
            (Some(title), Some(link), Some(snippet)) => hits.push(SearchHit {
                title,
                link,
                snippet,
            }),
            _ => skipped += 1,
        }
    }
    Ok(Some((hits, skipped)))
}

fn format_hits(hits: &[SearchHit], skipped: usize) -> String {
    let mut out = if hits.is_empty() {
        NO_RESULTS.to_string()
    } else {
        hits.iter().map(SearchHit::render).collect::<Vec<_>>().join("\n")
    };
    if skipped > 0 {
        out.push_str(&format!("\n\n(skipped {skipped} malformed results)"));
    }
    out
}

#[async_trait]
impl Tool for WebSearchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args: SearchArgs = parse_args(TOOL_NAME, args)?;
        if args.query.trim().is_empty() {
            return Err(ToolError::InvalidInput {
                tool: TOOL_NAME.to_string(),
                message: "query must not be empty".to_string(),
            });
        }

        tracing::debug!(
            tool = TOOL_NAME,
            provider = ?self.cfg.provider,
            depth = ?args.search_depth,
            query = %args.query,
            "web search"
        );
        let body = self.query(&args).await?;

        match extract_hits(self.cfg.provider, &body, self.cfg.top_n)? {
            None => {
                tracing::warn!(tool = TOOL_NAME, "search response had no result list");
                Ok(NO_RESULTS.to_string())
            }
            Some((hits, skipped)) => {
                if skipped > 0 {
                    tracing::warn!(tool = TOOL_NAME, skipped, "skipped malformed search results");
                }
                Ok(format_hits(&hits, skipped))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use tripcrew_core::api::invoke;

    fn serper_cfg(url: String) -> SearchConfig {
        SearchConfig {
            provider: SearchProvider::Serper,
            serper_api_key: "serper-key".into(),
            serper_url: url,
            top_n: 4,
            timeout_secs: 5,
            ..SearchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_serper_formats_top_results_and_counts_skipped() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/search")
            .match_header("x-api-key", "serper-key")
            .match_body(Matcher::PartialJson(json!({"q": "Kyoto in December"})))
            .with_status(200)
            .with_body(
                json!({
                    "organic": [
                        {"title": "Kyoto weather", "link": "https://a.example", "snippet": "Cold, dry."},
                        {"title": "No link", "snippet": "oops"},
                        {"title": "Markets", "link": "https://b.example", "snippet": "Nishiki."},
                        {"title": "Temples", "link": "https://c.example", "snippet": "Kiyomizu."},
                        {"title": "Fifth", "link": "https://d.example", "snippet": "cut off"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let tool = WebSearchTool::new(&serper_cfg(format!("{}/search", server.url()))).unwrap();
        let out = invoke(&tool, Value::String("Kyoto in December".into())).await.unwrap();

        let expected = "Title: Kyoto weather\nLink: https://a.example\nSnippet: Cold, dry.\n\n-----------------\n\
Title: Markets\nLink: https://b.example\nSnippet: Nishiki.\n\n-----------------\n\
Title: Temples\nLink: https://c.example\nSnippet: Kiyomizu.\n\n-----------------\n\n\
(skipped 1 malformed results)";
        assert_eq!(out, expected);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_zero_results_is_sentinel_not_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(r#"{"organic": []}"#)
            .create_async()
            .await;

        let tool = WebSearchTool::new(&serper_cfg(format!("{}/search", server.url()))).unwrap();
        let out = tool.execute(json!({"query": "zzzz"})).await.unwrap();
        assert_eq!(out, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_missing_result_list_is_sentinel() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(r#"{"searchParameters": {}}"#)
            .create_async()
            .await;

        let tool = WebSearchTool::new(&serper_cfg(format!("{}/search", server.url()))).unwrap();
        assert_eq!(tool.execute(json!({"query": "x"})).await.unwrap(), NO_RESULTS);
    }

    #[tokio::test]
    async fn test_tavily_deep_maps_to_advanced() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/tavily")
            .match_header("authorization", "Bearer tv-key")
            .match_body(Matcher::PartialJson(json!({"search_depth": "advanced"})))
            .with_status(200)
            .with_body(
                json!({"results": [{"title": "Osaka", "url": "https://o.example", "content": "Street food."}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let cfg = SearchConfig {
            provider: SearchProvider::Tavily,
            tavily_api_key: "tv-key".into(),
            tavily_url: format!("{}/tavily", server.url()),
            ..SearchConfig::default()
        };
        let tool = WebSearchTool::new(&cfg).unwrap();
        let out = invoke(&tool, json!({"query": "Osaka food", "search_depth": "deep"}))
            .await
            .unwrap();
        assert!(out.starts_with("Title: Osaka\nLink: https://o.example\nSnippet: Street food."));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_failure_and_missing_key_are_fatal() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/search")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        let tool = WebSearchTool::new(&serper_cfg(format!("{}/search", server.url()))).unwrap();
        let err = tool.execute(json!({"query": "x"})).await.unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(err, ToolError::Status { status: 500, .. }));

        let no_key = WebSearchTool::new(&SearchConfig::default()).unwrap();
        let err = no_key.execute(json!({"query": "x"})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured { .. }));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let err = extract_hits(SearchProvider::Serper, &json!([1, 2]), 4).unwrap_err();
        assert!(matches!(err, ToolError::Malformed { .. }));
    }
}
