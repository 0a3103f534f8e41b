//! Role-bound agents that answer a task through a bounded reasoning loop.

mod directive;
mod prompt;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{AgentError, ToolError};
use crate::llm::LanguageModel;
use crate::pipeline::{ExecutionResult, RenderedTask};
use crate::tool::{self, Tool, ToolSpec};

pub use directive::{parse as parse_directive, Directive};

use prompt::Step;

pub const DEFAULT_MAX_ITERATIONS: u32 = 15;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Agent {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    tools: Vec<Arc<dyn Tool>>,
    tool_specs: Vec<ToolSpec>,
    max_iterations: u32,
    tool_timeout: Duration,
    model: Arc<dyn LanguageModel>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("tools", &self.tool_names())
            .field("max_iterations", &self.max_iterations)
            .field("model", &self.model.name())
            .finish()
    }
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            tool_specs: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            model,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tool_specs = tools.iter().map(|t| t.spec().clone()).collect();
        self.tools = tools;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Produces the final answer for `task`.
    ///
    /// Each round calls the model once and runs at most one tool. Recoverable tool
    /// failures, unknown tools and unreadable directives become observations; any
    /// other tool or model failure is returned immediately.
    pub async fn respond(
        &self,
        task: &RenderedTask,
        context: &[&ExecutionResult],
    ) -> Result<String, AgentError> {
        let mut steps: Vec<Step> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let prompt = prompt::build(
                &self.role,
                &self.goal,
                &self.backstory,
                &self.tool_specs,
                task,
                context,
                &steps,
            );
            let reply = self.model.generate(&prompt, &self.tool_specs).await?;

            let observation = match directive::parse(&reply) {
                Ok(Directive::Final(answer)) if !answer.trim().is_empty() => {
                    tracing::debug!(
                        agent = %self.id,
                        task_id = %task.task_id,
                        iteration,
                        "final answer"
                    );
                    return Ok(answer);
                }
                Ok(Directive::Final(_)) => {
                    "Error: the final answer was empty. Reply with 'Final Answer:' followed by the complete answer."
                        .to_string()
                }
                Ok(Directive::UseTool { tool, args }) => {
                    tracing::info!(
                        agent = %self.id,
                        task_id = %task.task_id,
                        tool = %tool,
                        iteration,
                        "tool call"
                    );
                    self.use_tool(&tool, args).await?
                }
                Err(message) => format!("Error: {message}"),
            };

            steps.push(Step { reply, observation });
        }

        tracing::warn!(
            agent = %self.id,
            task_id = %task.task_id,
            max_iterations = self.max_iterations,
            "agent exhausted its iterations"
        );
        Err(AgentError::Exhausted {
            role: self.role.clone(),
            max_iterations: self.max_iterations,
        })
    }

    async fn use_tool(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            let available = if self.tools.is_empty() {
                "none; answer directly with 'Final Answer:'".to_string()
            } else {
                self.tool_names().join(", ")
            };
            return Ok(format!(
                "Error: '{name}' is not an available tool. Available tools: {available}"
            ));
        };

        let fut = tool::invoke(tool.as_ref(), args);
        match tokio::time::timeout(self.tool_timeout, fut).await {
            Err(_) => Err(ToolError::Timeout {
                tool: name.to_string(),
                secs: self.tool_timeout.as_secs(),
            }),
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.is_recoverable() => {
                tracing::debug!(tool = %name, error = %e, "recoverable tool error");
                Ok(format!("Error: {e}"))
            }
            Ok(Err(e)) => Err(e),
        }
    }
}
