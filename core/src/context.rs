use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::llm::LanguageModel;
use crate::pipeline::{CrewBuilder, Pipeline};
use crate::tool::ToolRegistry;

#[derive(Clone)]
pub struct Services {
    pub model: Arc<dyn LanguageModel>,
    pub tools: ToolRegistry,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, services_factory: Option<Arc<dyn ServicesFactory>>) -> Self {
        Self {
            cfg,
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            services_factory: self.services_factory.clone(),
        }
    }

    pub async fn build_services(&self) -> Result<Services, CliError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(CliError::Config(
                "services_factory missing (cannot build model/tools)".into(),
            ));
        };
        factory
            .build_services(&self.cfg)
            .await
            .map_err(|e| CliError::Config(format!("{e:#}")))
    }

    /// Builds a fresh pipeline for the configured crew. No state is shared between runs.
    pub async fn build_pipeline(&self) -> Result<Pipeline, CliError> {
        let services = self.build_services().await?;
        let pipeline = CrewBuilder::new(self.cfg.crew.clone(), services.model, services.tools)
            .tool_timeout(Duration::from_secs(self.cfg.pipeline.tool_timeout_secs))
            .build()?;
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::TripRequest;
    use crate::testing::FnModel;
    use crate::tool::{FieldKind, InputSchema, Tool, ToolSpec};
    use async_trait::async_trait;
    use serde_json::Value;

    struct StubSearch(ToolSpec);

    #[async_trait]
    impl Tool for StubSearch {
        fn spec(&self) -> &ToolSpec {
            &self.0
        }

        async fn execute(&self, args: Value) -> Result<String, crate::error::ToolError> {
            Ok(format!(
                "Title: {}\nLink: https://example.com\nSnippet: mild and dry\n\n-----------------",
                args["query"].as_str().unwrap_or_default()
            ))
        }
    }

    struct StubFactory;

    #[async_trait]
    impl ServicesFactory for StubFactory {
        async fn build_services(&self, _cfg: &AppConfig) -> anyhow::Result<Services> {
            let model = FnModel::new(|prompt, tools| {
                let task = prompt.user.lines().next().unwrap_or_default().to_string();
                if !prompt.user.contains("Observation:") && !tools.is_empty() {
                    return Ok("Action: web_search\nAction Input: {\"query\": \"Kyoto December weather\"}".into());
                }
                if task.contains("full 7-day travel itinerary") {
                    return Ok("Final Answer: # 7-day Kyoto plan\n\n## Day 1\nArrive and eat ramen.".into());
                }
                Ok("Final Answer: Kyoto suits food and culture in early December.".into())
            });
            let mut tools = ToolRegistry::new();
            for name in ["web_search", "calculator", "file_writer"] {
                tools.register(Arc::new(StubSearch(ToolSpec::new(
                    name,
                    "stub",
                    InputSchema::new().required("query", FieldKind::String, "q"),
                ))));
            }
            Ok(Services {
                model: Arc::new(model),
                tools,
            })
        }
    }

    #[tokio::test]
    async fn test_end_to_end_travel_crew() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::new(AppConfig::default(), Some(Arc::new(StubFactory)));
        let pipeline = ctx
            .build_pipeline()
            .await
            .unwrap()
            .with_output_file(dir.path().join("travel_plan.md"));

        let req = TripRequest::from_fields(
            "Singapore",
            "Tokyo, Kyoto",
            "2026-11-25 to 2026-12-08",
            "food, culture",
        )
        .unwrap();
        let run = pipeline.run(&req.to_inputs()).await.unwrap();

        let ids: Vec<&str> = run.results.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["identify_city", "gather_city_guide", "plan_itinerary"]);
        assert!(run.final_output.starts_with("# 7-day Kyoto plan"));
        assert!(run.final_output.contains("## Day 1"));
    }

    #[tokio::test]
    async fn test_empty_cities_rejected_before_any_agent_runs() {
        let req = TripRequest {
            origin: "Singapore".into(),
            cities: vec![],
            date_range: "2026-11-25 to 2026-12-08".into(),
            interests: vec!["food".into()],
        };
        assert!(req.validate().is_err());

        let ctx = AppContext::new(AppConfig::default(), Some(Arc::new(StubFactory)));
        let pipeline = ctx.build_pipeline().await.unwrap();
        let err = pipeline.run(&req.to_inputs()).await.unwrap_err();
        assert_eq!(err.error_code(), crate::error::ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_missing_factory_is_config_error() {
        let ctx = AppContext::new(AppConfig::default(), None);
        assert!(matches!(ctx.build_pipeline().await, Err(CliError::Config(_))));
    }
}
