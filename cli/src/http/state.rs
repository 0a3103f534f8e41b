//! Shared server state

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::broadcast;
use tripcrew_core::api::{AppContext, CrewBuilder, Pipeline, PipelineError, Services};

/// Shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub ctx: Arc<AppContext>,
    pub services: Arc<Services>,
    pub stats: Arc<RwLock<ServerStats>>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        session_id: String,
        ctx: AppContext,
        services: Services,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            session_id,
            ctx: Arc::new(ctx),
            services: Arc::new(services),
            stats: Arc::new(RwLock::new(ServerStats::new())),
            shutdown_tx,
        }
    }

    /// A fresh pipeline per request. Results stay in the response; nothing is
    /// written to the crew's output file.
    pub fn build_pipeline(&self) -> Result<Pipeline, PipelineError> {
        let cfg = self.ctx.cfg();
        let pipeline = CrewBuilder::new(
            cfg.crew.clone(),
            self.services.model.clone(),
            self.services.tools.clone(),
        )
        .tool_timeout(Duration::from_secs(cfg.pipeline.tool_timeout_secs))
        .build()?;
        Ok(pipeline.without_persistence())
    }

    pub fn record_request(&self, endpoint: &str) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_request(endpoint);
        }
    }

    pub fn record_outcome(&self, success: bool) {
        if let Ok(mut stats) = self.stats.write() {
            if success {
                stats.plans_completed += 1;
            } else {
                stats.increment_error();
            }
        }
    }
}

pub struct ServerStats {
    pub requests_total: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub plans_completed: u64,
    pub errors_total: u64,
    pub start_time: DateTime<Local>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            requests_total: 0,
            requests_by_endpoint: HashMap::new(),
            plans_completed: 0,
            errors_total: 0,
            start_time: Local::now(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn uptime_seconds(&self) -> f64 {
        let now = Local::now();
        (now - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_request() {
        let mut stats = ServerStats::new();
        stats.increment_request("/api/v1/plan");
        stats.increment_request("/api/v1/plan");
        stats.increment_request("/health");

        assert_eq!(stats.requests_total, 3);
        assert_eq!(stats.requests_by_endpoint.get("/api/v1/plan"), Some(&2));
        assert_eq!(stats.requests_by_endpoint.get("/health"), Some(&1));
        assert!(stats.uptime_seconds() < 1.0);
    }
}
