//! Uniform tool interface shared by agents.
//!
//! A tool is `name + description + input schema + execute(args) -> text`. Tools are
//! immutable once built and are shared between agents as `Arc<dyn Tool>`.

mod registry;
mod schema;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ToolError;

pub use registry::ToolRegistry;
pub use schema::{FieldKind, FieldSpec, InputSchema};

/// Static description of a tool, as shown to the language model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub schema: InputSchema,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: InputSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    fn name(&self) -> &str {
        &self.spec().name
    }

    /// Runs the tool with arguments that already passed schema validation.
    ///
    /// "Nothing found" must be reported as a sentinel string, not an error.
    async fn execute(&self, args: Value) -> Result<String, ToolError>;
}

/// Validates raw model-supplied arguments against the tool schema, then executes.
pub async fn invoke(tool: &dyn Tool, raw_args: Value) -> Result<String, ToolError> {
    let args = tool.spec().schema.validate(tool.name(), raw_args)?;
    tool.execute(args).await
}

/// Deserializes validated arguments into a typed struct.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidInput {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}
