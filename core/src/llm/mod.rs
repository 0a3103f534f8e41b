use async_trait::async_trait;

use crate::error::ModelError;
use crate::tool::ToolSpec;

/// Stop sequence appended when tools are bound, so the model halts before
/// inventing its own observation.
pub const OBSERVATION_STOP: &str = "\nObservation:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Opaque text-generation collaborator: prompt in, text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    /// `tools` lists the tools bound to the calling agent; it may be empty.
    async fn generate(&self, prompt: &Prompt, tools: &[ToolSpec]) -> Result<String, ModelError>;
}
