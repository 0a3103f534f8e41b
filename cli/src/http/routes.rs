//! HTTP route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;

use crate::http::{models::*, state::AppState, validation::validate_plan_request};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/plan", post(plan_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/shutdown", post(shutdown_handler))
        .with_state(state)
}

/// POST /api/v1/plan - run the travel crew once
async fn plan_handler(
    State(state): State<AppState>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, HttpServerError> {
    state.record_request("/api/v1/plan");

    let result = run_plan(&state, body).await;
    state.record_outcome(result.is_ok());
    result
}

async fn run_plan(
    state: &AppState,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, HttpServerError> {
    let Json(req) = body.map_err(|e| HttpServerError::InvalidRequest(e.body_text()))?;
    let trip = validate_plan_request(req)?;

    let pipeline = state.build_pipeline()?;
    let run = pipeline.run(&trip.to_inputs()).await.map_err(|e| {
        tracing::warn!(error = %e, failed_task = ?e.failed_task(), "plan request failed");
        HttpServerError::from(e)
    })?;

    Ok(Json(PlanResponse {
        success: true,
        data: Some(PlanData {
            run_id: run.run_id,
            final_output: run.final_output,
            results: run.results,
            duration_ms: run.duration_ms,
        }),
        error: None,
        error_code: None,
    }))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    state.record_request("/health");
    let (uptime_seconds, requests_handled, plans_completed) = state
        .stats
        .read()
        .map(|s| (s.uptime_seconds(), s.requests_total, s.plans_completed))
        .unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds,
        requests_handled,
        plans_completed,
        timestamp: Local::now().to_rfc3339(),
    })
}

/// POST /api/v1/shutdown - trigger graceful shutdown
async fn shutdown_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let _ = state.shutdown_tx.send(());

    Json(serde_json::json!({
        "success": true,
        "message": "Shutdown signal sent"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::sync::broadcast;
    use tower::ServiceExt;
    use tripcrew_core::api::{AppConfig, AppContext, LanguageModel, Services, ToolRegistry};
    use tripcrew_core::testing::FnModel;

    /// Tool-free crew so the scripted model can answer every task directly.
    fn create_test_state(model: Arc<dyn LanguageModel>) -> AppState {
        let mut cfg = AppConfig::default();
        cfg.crew.agents.iter_mut().for_each(|a| a.tools.clear());

        let (shutdown_tx, _) = broadcast::channel(1);
        let services = Services {
            model,
            tools: ToolRegistry::new(),
        };
        AppState::new(
            "test-session".into(),
            AppContext::new(cfg, None),
            services,
            shutdown_tx,
        )
    }

    fn answering_model() -> Arc<dyn LanguageModel> {
        Arc::new(FnModel::new(|prompt, _| {
            if prompt.user.contains("### gather_city_guide") {
                Ok("Final Answer: # Kyoto itinerary\n## Day 1\nFushimi Inari at dawn".into())
            } else if prompt.user.contains("### identify_city") {
                Ok("Final Answer: Kyoto guide: temples, Nishiki market".into())
            } else {
                Ok("Final Answer: Kyoto".into())
            }
        }))
    }

    async fn post_plan(state: AppState, body: &str) -> (StatusCode, Value) {
        let resp = create_router(state)
            .oneshot(
                Request::post("/api/v1/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_plan_runs_three_tasks_in_order() {
        let state = create_test_state(answering_model());
        let (status, body) = post_plan(
            state.clone(),
            r#"{"origin": "Singapore", "cities": ["Tokyo", "Kyoto"],
                "dateRange": "2026-11-25 to 2026-12-08", "interests": "food, culture"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let ids: Vec<&str> = body["data"]["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["task_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["identify_city", "gather_city_guide", "plan_itinerary"]);
        assert!(body["data"]["final_output"]
            .as_str()
            .unwrap()
            .contains("## Day 1"));
        assert_eq!(state.stats.read().unwrap().plans_completed, 1);
    }

    #[tokio::test]
    async fn test_empty_cities_is_400_without_model_calls() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let model: Arc<dyn LanguageModel> = Arc::new(FnModel::new(move |_, _| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok("Final Answer: x".into())
        }));

        let (status, body) = post_plan(
            create_test_state(model),
            r#"{"origin": "Singapore", "cities": [], "date_range": "May", "interests": ["food"]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = post_plan(create_test_state(answering_model()), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_502_naming_task() {
        let model: Arc<dyn LanguageModel> = Arc::new(FnModel::new(|_, _| {
            Err(tripcrew_core::api::ModelError::Status {
                status: 500,
                body: "upstream".into(),
            })
        }));
        let state = create_test_state(model);
        let (status, body) = post_plan(
            state.clone(),
            r#"{"origin": "Singapore", "cities": "Tokyo", "date_range": "May", "interests": "food"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "MODEL_ERROR");
        assert_eq!(body["failed_task"], "identify_city");
        assert_eq!(state.stats.read().unwrap().errors_total, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = create_test_state(answering_model());
        let response = health_handler(State(state)).await;

        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.session_id, "test-session");
        assert_eq!(response.0.requests_handled, 1);
    }

    #[tokio::test]
    async fn test_shutdown_handler() {
        let state = create_test_state(answering_model());
        let mut shutdown_rx = state.shutdown_tx.subscribe();

        let response = shutdown_handler(State(state)).await;
        assert_eq!(response.0["success"], true);
        assert!(shutdown_rx.try_recv().is_ok());
    }
}
