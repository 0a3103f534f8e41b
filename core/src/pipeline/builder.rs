use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::{Agent, DEFAULT_TOOL_TIMEOUT};
use crate::crew::CrewConfig;
use crate::error::PipelineError;
use crate::llm::LanguageModel;
use crate::task::Task;
use crate::tool::ToolRegistry;

use super::engine::Pipeline;

/// Turns a declarative [`CrewConfig`] into a runnable [`Pipeline`].
pub struct CrewBuilder {
    config: CrewConfig,
    model: Arc<dyn LanguageModel>,
    tools: ToolRegistry,
    tool_timeout: Duration,
}

impl CrewBuilder {
    pub fn new(config: CrewConfig, model: Arc<dyn LanguageModel>, tools: ToolRegistry) -> Self {
        Self {
            config,
            model,
            tools,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn build(&self) -> Result<Pipeline, PipelineError> {
        let mut agents: HashMap<&str, Arc<Agent>> = HashMap::new();
        for spec in &self.config.agents {
            if agents.contains_key(spec.id.as_str()) {
                return Err(PipelineError::DuplicateAgentId(spec.id.clone()));
            }
            if spec.max_iterations == 0 {
                return Err(PipelineError::InvalidIterations {
                    agent: spec.id.clone(),
                });
            }
            let tools = self
                .tools
                .resolve(&spec.tools)
                .map_err(|tool| PipelineError::UnknownTool {
                    agent: spec.id.clone(),
                    tool,
                })?;

            let agent = Agent::new(
                spec.id.clone(),
                spec.role.clone(),
                spec.goal.clone(),
                spec.backstory.clone(),
                self.model.clone(),
            )
            .with_tools(tools)
            .with_max_iterations(spec.max_iterations)
            .with_tool_timeout(self.tool_timeout);
            agents.insert(spec.id.as_str(), Arc::new(agent));
        }

        let mut tasks = Vec::with_capacity(self.config.tasks.len());
        let mut previous: Option<&str> = None;
        for spec in &self.config.tasks {
            let agent = agents
                .get(spec.agent.as_str())
                .cloned()
                .ok_or_else(|| PipelineError::UnknownAgent {
                    task_id: spec.id.clone(),
                    agent: spec.agent.clone(),
                })?;

            let dependencies = match &spec.context {
                Some(deps) => deps.clone(),
                None => previous.map(|p| vec![p.to_string()]).unwrap_or_default(),
            };

            let mut task = Task::new(spec.id.clone(), &spec.description, &spec.expected_output, agent)
                .with_dependencies(dependencies);
            if let Some(path) = spec.output_file.as_deref().filter(|p| !p.trim().is_empty()) {
                task = task.with_output_file(path);
            }
            tasks.push(task);
            previous = Some(spec.id.as_str());
        }

        let pipeline = Pipeline::new(tasks)?;
        tracing::debug!(tasks = ?pipeline.task_ids(), "crew built");
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{AgentSpec, TaskSpec};
    use crate::error::ToolError;
    use crate::testing::ScriptedModel;
    use crate::tool::{InputSchema, Tool, ToolSpec};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    struct Named(ToolSpec);

    #[async_trait]
    impl Tool for Named {
        fn spec(&self) -> &ToolSpec {
            &self.0
        }

        async fn execute(&self, _args: Value) -> Result<String, ToolError> {
            Ok(String::new())
        }
    }

    fn registry(names: &[&str]) -> ToolRegistry {
        let mut r = ToolRegistry::new();
        for n in names {
            r.register(Arc::new(Named(ToolSpec::new(*n, "", InputSchema::new()))));
        }
        r
    }

    fn model() -> Arc<dyn LanguageModel> {
        Arc::new(ScriptedModel::new(Vec::<String>::new()))
    }

    #[test]
    fn test_default_crew_builds_with_sequential_context() {
        let pipeline = CrewBuilder::new(
            CrewConfig::default(),
            model(),
            registry(&["web_search", "calculator", "file_writer"]),
        )
        .build()
        .unwrap();

        assert_eq!(
            pipeline.task_ids(),
            vec!["identify_city", "gather_city_guide", "plan_itinerary"]
        );
        assert_eq!(pipeline.tasks()[1].dependencies, vec!["identify_city"]);
        assert_eq!(
            pipeline.tasks()[2].dependencies,
            vec!["identify_city", "gather_city_guide"]
        );
        assert_eq!(
            pipeline.tasks()[2].agent.tool_names(),
            vec!["web_search", "calculator", "file_writer"]
        );
        assert_eq!(
            pipeline.output_file().and_then(|p| p.to_str()),
            Some("output/travel_plan.md")
        );
        assert_eq!(
            pipeline.required_inputs().into_iter().collect::<Vec<_>>(),
            vec!["cities", "date_range", "interests", "origin"]
        );
    }

    #[test]
    fn test_unknown_tool_and_agent_rejected() {
        let err = CrewBuilder::new(CrewConfig::default(), model(), registry(&["web_search"]))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownTool { ref agent, ref tool } if agent == "travel_concierge" && tool == "calculator"
        ));

        let mut cfg = CrewConfig::default();
        cfg.tasks[0].agent = "ghost".into();
        let err = CrewBuilder::new(cfg, model(), registry(&["web_search", "calculator", "file_writer"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownAgent { ref agent, .. } if agent == "ghost"));
    }

    #[test]
    fn test_explicit_empty_context_means_independent() {
        let cfg = CrewConfig {
            agents: vec![AgentSpec {
                id: "solo".into(),
                role: "Solo".into(),
                goal: "g".into(),
                backstory: "b".into(),
                tools: vec![],
                max_iterations: 3,
            }],
            tasks: vec![
                TaskSpec {
                    id: "a".into(),
                    agent: "solo".into(),
                    description: "a".into(),
                    expected_output: "a".into(),
                    context: None,
                    output_file: None,
                },
                TaskSpec {
                    id: "b".into(),
                    agent: "solo".into(),
                    description: "b".into(),
                    expected_output: "b".into(),
                    context: Some(vec![]),
                    output_file: None,
                },
            ],
        };
        let pipeline = CrewBuilder::new(cfg, model(), ToolRegistry::new()).build().unwrap();
        assert!(pipeline.tasks().iter().all(|t| t.dependencies.is_empty()));
        assert!(pipeline.output_file().is_none());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut cfg = CrewConfig::default();
        cfg.agents[0].max_iterations = 0;
        let err = CrewBuilder::new(cfg, model(), registry(&["web_search", "calculator", "file_writer"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidIterations { .. }));
    }
}
