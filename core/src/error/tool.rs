use thiserror::Error;

use super::codes::ErrorCode;
use super::pipeline::PipelineError;

/// Failures raised at the tool boundary.
///
/// "Nothing found" is never an error: tools return a sentinel string instead.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("tool '{tool}' rejected its input: {message}")]
    InvalidInput { tool: String, message: String },

    #[error("tool '{tool}' could not evaluate input: {message}")]
    Evaluation { tool: String, message: String },

    #[error("tool '{tool}' is not configured: {message}")]
    NotConfigured { tool: String, message: String },

    #[error("tool '{tool}' timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("tool '{tool}' request failed ({kind}): {message}")]
    Transport {
        tool: String,
        kind: &'static str,
        message: String,
    },

    #[error("tool '{tool}' got HTTP {status}: {body}")]
    Status {
        tool: String,
        status: u16,
        body: String,
    },

    #[error("tool '{tool}' returned a malformed response: {message}")]
    Malformed { tool: String, message: String },

    #[error("tool '{tool}' failed to write {path}: {source}")]
    Io {
        tool: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("summarization depth {depth} exceeds limit {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("summarizing chunk {chunk} failed: {source}")]
    Summarize {
        chunk: usize,
        #[source]
        source: Box<PipelineError>,
    },
}

impl ToolError {
    /// Input and evaluation problems go back to the agent as an observation;
    /// everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::Evaluation { .. })
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } | Self::Evaluation { .. } => ErrorCode::ToolError,
            Self::NotConfigured { .. } => ErrorCode::ConfigError,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Transport { .. } | Self::Status { .. } | Self::Malformed { .. } => {
                ErrorCode::NetworkError
            }
            Self::Io { .. } => ErrorCode::FileError,
            Self::DepthExceeded { .. } => ErrorCode::ToolError,
            Self::Summarize { source, .. } => source.error_code(),
        }
    }
}

/// Failures of the language-model collaborator.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("language model is not configured: {0}")]
    NotConfigured(String),

    #[error("language model request failed ({kind}): {message}")]
    Transport { kind: &'static str, message: String },

    #[error("language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("language model returned a malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("agent '{role}' exhausted {max_iterations} iterations without a final answer")]
    Exhausted { role: String, max_iterations: u32 },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AgentError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Exhausted { .. } => ErrorCode::AgentExhausted,
            Self::Tool(e) => e.error_code(),
            Self::Model(ModelError::NotConfigured(_)) => ErrorCode::ConfigError,
            Self::Model(_) => ErrorCode::ModelError,
        }
    }
}
