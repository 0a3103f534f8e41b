//! Chunked summarization through nested single-task pipelines.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::Agent;
use crate::config::PipelineConfig;
use crate::error::ToolError;
use crate::llm::LanguageModel;
use crate::pipeline::{run_ordered, Inputs, Pipeline};
use crate::task::Task;

const SUMMARIZER_ROLE: &str = "Principal Researcher";
const SUMMARIZER_GOAL: &str =
    "Do amazing research and summaries based on the content you are working with";
const SUMMARIZER_BACKSTORY: &str =
    "You're a Principal Researcher at a big company and you need to research a given topic.";
const SUMMARIZE_DESCRIPTION: &str = "\
Analyze and summarize the content below. Make sure to include the most relevant information in \
the summary and return only the summary, nothing else.

CONTENT
----------
{content}";
const SUMMARIZE_EXPECTED: &str = "A concise summary of the content's most relevant information.";

/// Splits `content` into windows of at most `size` characters.
pub fn chunk_text(content: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = content.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[derive(Clone)]
pub struct ChunkSummarizer {
    model: Arc<dyn LanguageModel>,
    chunk_size: usize,
    concurrency: usize,
    max_depth: usize,
    max_chunks: usize,
    tool_timeout: Duration,
    /// Depth of the pipeline that owns this summarizer; nested runs are `depth + 1`.
    depth: usize,
}

impl ChunkSummarizer {
    pub fn new(model: Arc<dyn LanguageModel>, cfg: &PipelineConfig, chunk_size: usize) -> Self {
        Self {
            model,
            chunk_size,
            concurrency: cfg.summarize_concurrency,
            max_depth: cfg.max_summarize_depth,
            max_chunks: cfg.max_chunks,
            tool_timeout: Duration::from_secs(cfg.tool_timeout_secs),
            depth: 0,
        }
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Summarizes each window independently and joins the summaries in chunk order.
    pub async fn summarize(&self, content: &str) -> Result<String, ToolError> {
        let nested_depth = self.depth + 1;
        if nested_depth > self.max_depth {
            return Err(ToolError::DepthExceeded {
                depth: nested_depth,
                max: self.max_depth,
            });
        }

        let mut chunks = chunk_text(content, self.chunk_size);
        let total_chunks = chunks.len();
        if total_chunks > self.max_chunks {
            tracing::warn!(
                chunks = total_chunks,
                max_chunks = self.max_chunks,
                "content too long; dropping trailing chunks"
            );
            chunks.truncate(self.max_chunks);
        }
        if chunks.is_empty() {
            return Ok(String::new());
        }

        tracing::debug!(chunks = chunks.len(), depth = nested_depth, "summarizing content");

        let summaries = run_ordered(chunks, self.concurrency, |index, chunk| async move {
            self.summarize_chunk(index, chunk).await
        })
        .await?;

        let kept = summaries.len();
        let mut merged = summaries.join("\n\n");
        if kept < total_chunks {
            merged.push_str(&format!(
                "\n\n(content truncated after {kept} of {total_chunks} chunks)"
            ));
        }
        Ok(merged)
    }

    async fn summarize_chunk(&self, index: usize, chunk: String) -> Result<String, ToolError> {
        let wrap = |e| ToolError::Summarize {
            chunk: index,
            source: Box::new(e),
        };

        let agent = Agent::new(
            "principal_researcher",
            SUMMARIZER_ROLE,
            SUMMARIZER_GOAL,
            SUMMARIZER_BACKSTORY,
            self.model.clone(),
        )
        .with_tool_timeout(self.tool_timeout);
        let task = Task::new(
            format!("summarize_chunk_{index}"),
            SUMMARIZE_DESCRIPTION,
            SUMMARIZE_EXPECTED,
            Arc::new(agent),
        );

        let pipeline = Pipeline::new(vec![task]).map_err(wrap)?;
        let run = pipeline
            .run(&Inputs::new().with("content", chunk))
            .await
            .map_err(wrap)?;
        Ok(run.final_output)
    }
}
