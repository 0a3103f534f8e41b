//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `tripcrew_core::api` instead of reaching into internal modules.

pub use crate::agent::{parse_directive, Agent, Directive};
pub use crate::config::{
    apply_env_overrides, get_tripcrew_data_dir, load_default, AppConfig, FileWriterConfig,
    HttpServerConfig, LlmConfig, LoggingConfig, PipelineConfig, ScrapeConfig, SearchConfig,
    SearchProvider,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::crew::{split_list, AgentSpec, CrewConfig, TaskSpec, TripRequest, INPUT_KEYS};
pub use crate::error::{
    AgentError, CliError, ErrorCode, ModelError, PipelineError, TaskError, ToolError,
    ValidationError,
};
pub use crate::llm::{LanguageModel, Prompt, OBSERVATION_STOP};
pub use crate::pipeline::{
    CrewBuilder, ExecutionResult, InputValue, Inputs, Pipeline, PipelineEvent, PipelineObserver,
    PipelineRun, ProgressObserver,
};
pub use crate::summarize::{chunk_text, ChunkSummarizer};
pub use crate::tool::{invoke, parse_args, FieldKind, InputSchema, Tool, ToolRegistry, ToolSpec};
