use serde::{Deserialize, Serialize};

use crate::crew::CrewConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub file_writer: FileWriterConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub crew: CrewConfig,

    /// Resolved path of the `.env` file; filled in by the loader.
    #[serde(skip)]
    pub env_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_true")]
    pub console: bool,

    /// If true, log to a daily file under `directory`.
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "tripcrew_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            console: true,
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Serper,
    Tavily,
}

impl std::str::FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serper" => Ok(Self::Serper),
            "tavily" => Ok(Self::Tavily),
            other => Err(format!("unknown search provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: SearchProvider,

    #[serde(default)]
    pub serper_api_key: String,

    #[serde(default = "default_serper_url")]
    pub serper_url: String,

    #[serde(default)]
    pub tavily_api_key: String,

    #[serde(default = "default_tavily_url")]
    pub tavily_url: String,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_serper_url() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_tavily_url() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_top_n() -> usize {
    4
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::default(),
            serper_api_key: String::new(),
            serper_url: default_serper_url(),
            tavily_api_key: String::new(),
            tavily_url: default_tavily_url(),
            top_n: default_top_n(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Browserless-style `/content` endpoint used by the scrape tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_scrape_url")]
    pub url: String,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_scrape_url() -> String {
    "http://localhost:3000/content".to_string()
}

fn default_chunk_size() -> usize {
    8000
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: default_scrape_url(),
            token: None,
            chunk_size: default_chunk_size(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWriterConfig {
    /// Base directory every write is confined to.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
}

fn default_base_dir() -> String {
    "output".to_string()
}

impl Default for FileWriterConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    #[serde(default = "default_summarize_concurrency")]
    pub summarize_concurrency: usize,

    #[serde(default = "default_max_summarize_depth")]
    pub max_summarize_depth: usize,

    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
}

fn default_tool_timeout_secs() -> u64 {
    120
}

fn default_summarize_concurrency() -> usize {
    4
}

fn default_max_summarize_depth() -> usize {
    1
}

fn default_max_chunks() -> usize {
    16
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            summarize_concurrency: default_summarize_concurrency(),
            max_summarize_depth: default_max_summarize_depth(),
            max_chunks: default_max_chunks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout; a plan run makes many model calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    900
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_section_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
[llm]
model = "gpt-4o"

[search]
provider = "tavily"
top_n = 6
"#,
        )
        .unwrap();

        assert_eq!(cfg.llm.model, "gpt-4o");
        assert_eq!(cfg.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.search.provider, SearchProvider::Tavily);
        assert_eq!(cfg.search.top_n, 6);
        assert_eq!(cfg.pipeline.tool_timeout_secs, 120);
        assert_eq!(cfg.scrape.chunk_size, 8000);
        assert_eq!(cfg.crew.tasks.len(), 3);
    }

    #[test]
    fn test_search_provider_from_str() {
        assert_eq!("Serper".parse::<SearchProvider>(), Ok(SearchProvider::Serper));
        assert_eq!(" tavily ".parse::<SearchProvider>(), Ok(SearchProvider::Tavily));
        assert!("bing".parse::<SearchProvider>().is_err());
    }
}
