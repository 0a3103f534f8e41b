#[allow(clippy::module_inception)]
pub mod error;
pub mod codes;
pub mod pipeline;
pub mod tool;

pub use codes::ErrorCode;
pub use error::{CliError, ValidationError};
pub use pipeline::{PipelineError, TaskError, TaskFailure};
pub use tool::{AgentError, ModelError, ToolError};
