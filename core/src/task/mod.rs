mod template;

use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::Agent;
use crate::error::TaskError;
use crate::pipeline::{ExecutionResult, Inputs, RenderedTask, TaskLike};

pub use template::Template;

/// One unit of templated work bound to a single agent.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub description: Template,
    pub expected_output: Template,
    pub agent: Arc<Agent>,
    /// Upstream task ids, in the order their outputs appear as context.
    pub dependencies: Vec<String>,
    pub output_file: Option<PathBuf>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        description: &str,
        expected_output: &str,
        agent: Arc<Agent>,
    ) -> Self {
        Self {
            id: id.into(),
            description: Template::parse(description),
            expected_output: Template::parse(expected_output),
            agent,
            dependencies: Vec::new(),
            output_file: None,
        }
    }

    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        self.dependencies = deps;
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Every placeholder referenced by the description or the expected output.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = self.description.placeholders();
        for name in self.expected_output.placeholders() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn render(&self, inputs: &Inputs) -> Result<RenderedTask, TaskError> {
        Ok(RenderedTask {
            task_id: self.id.clone(),
            description: self.description.render(&self.id, inputs)?,
            expected_output: self.expected_output.render(&self.id, inputs)?,
        })
    }

    /// Completed results of this task's dependencies, in `dependencies` order.
    pub fn gather_context<'a>(&self, completed: &'a [ExecutionResult]) -> Vec<&'a ExecutionResult> {
        self.dependencies
            .iter()
            .filter_map(|dep| completed.iter().find(|r| &r.task_id == dep))
            .collect()
    }
}

impl TaskLike for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}
