//! `ServicesFactory` implementation: builds the language model and tool registry from config.
use async_trait::async_trait;
use tripcrew_core::api::{AppConfig, Services, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services> {
        let model = factory::build_model(cfg)?;
        let tools = factory::build_tools(cfg, model.clone())?;
        Ok(Services { model, tools })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tripcrew_core::api::AppContext;

    #[tokio::test]
    async fn test_default_crew_builds_from_plugins() {
        let ctx = AppContext::new(
            AppConfig::default(),
            Some(Arc::new(PluginServicesFactory)),
        );
        let pipeline = ctx.build_pipeline().await.unwrap();
        assert_eq!(
            pipeline.task_ids(),
            vec!["identify_city", "gather_city_guide", "plan_itinerary"]
        );
    }
}
