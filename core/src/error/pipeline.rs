use thiserror::Error;

use super::codes::ErrorCode;
use super::error::ValidationError;
use super::tool::AgentError;
use crate::pipeline::TransitionError;

/// Template errors raised while rendering a task description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task '{task}' references missing placeholder '{{{name}}}'")]
    MissingPlaceholder { task: String, name: String },
}

/// Why a single task could not produce its result.
#[derive(Error, Debug)]
pub enum TaskFailure {
    #[error(transparent)]
    Template(#[from] TaskError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl TaskFailure {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Template(_) => ErrorCode::MissingPlaceholder,
            Self::Agent(e) => e.error_code(),
        }
    }
}

/// Errors raised while building or running a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("pipeline has no tasks")]
    Empty,

    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("dependency not found: task '{task_id}' depends on '{missing_dep}'")]
    DependencyNotFound {
        task_id: String,
        missing_dep: String,
    },

    #[error("circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("duplicate agent id: {0}")]
    DuplicateAgentId(String),

    #[error("task '{task_id}' references unknown agent '{agent}'")]
    UnknownAgent { task_id: String, agent: String },

    #[error("agent '{agent}' references unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },

    #[error("agent '{agent}' must allow at least one iteration")]
    InvalidIterations { agent: String },

    #[error("task '{task_id}' failed: {source}")]
    TaskFailed {
        task_id: String,
        #[source]
        source: TaskFailure,
    },

    #[error("failed to write output to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl PipelineError {
    /// Id of the task that failed, when the failure happened mid-run.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            Self::TaskFailed { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Empty
            | Self::DuplicateTaskId(_)
            | Self::DuplicateAgentId(_)
            | Self::UnknownAgent { .. }
            | Self::UnknownTool { .. }
            | Self::InvalidIterations { .. } => ErrorCode::ConfigError,
            Self::DependencyNotFound { .. } => ErrorCode::DependencyError,
            Self::CircularDependency(_) => ErrorCode::CircularDependency,
            Self::TaskFailed { source, .. } => source.error_code(),
            Self::Persist { .. } => ErrorCode::FileError,
            Self::Transition(_) => ErrorCode::GeneralError,
        }
    }
}
