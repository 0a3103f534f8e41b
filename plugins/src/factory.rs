use std::sync::Arc;

use anyhow::Result;
use tripcrew_core::api::{AppConfig, ChunkSummarizer, LanguageModel, ToolRegistry};

use crate::llm::OpenAiChatModel;
use crate::tools::{CalculatorTool, FileWriterTool, ScrapeWebsiteTool, WebSearchTool};

pub fn build_model(cfg: &AppConfig) -> Result<Arc<dyn LanguageModel>> {
    Ok(Arc::new(OpenAiChatModel::new(&cfg.llm)?))
}

/// Registers every tool the crew can reference. Missing API keys surface when a
/// tool is first used, so a crew that never searches does not need one.
pub fn build_tools(cfg: &AppConfig, model: Arc<dyn LanguageModel>) -> Result<ToolRegistry> {
    let summarizer = ChunkSummarizer::new(model, &cfg.pipeline, cfg.scrape.chunk_size);

    let registry = ToolRegistry::new()
        .with(Arc::new(WebSearchTool::new(&cfg.search)?))
        .with(Arc::new(ScrapeWebsiteTool::new(&cfg.scrape, summarizer)?))
        .with(Arc::new(CalculatorTool::new()))
        .with(Arc::new(FileWriterTool::new(&cfg.file_writer)));

    tracing::debug!(tools = ?registry.names(), "tool registry built");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_holds_catalog() {
        let cfg = AppConfig::default();
        let model = build_model(&cfg).unwrap();
        let tools = build_tools(&cfg, model).unwrap();
        assert_eq!(
            tools.names(),
            vec!["calculator", "file_writer", "scrape_website", "web_search"]
        );
    }
}
