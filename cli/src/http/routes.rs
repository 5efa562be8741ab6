use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use mci_core::api::TaskFinder;

use crate::http::{models::*, state::AppState};

/// Server routes merged with every plugin's API, each under `/<plugin-name>`.
pub fn create_router(state: AppState) -> Router {
    let plugin_routes = state.ctx.plugins().api_router();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/runnable", get(runnable_handler))
        .route("/api/v1/shutdown", post(shutdown_handler))
        .with_state(state)
        .merge(plugin_routes)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (uptime_seconds, requests_handled) = {
        let stats = state.stats.read().unwrap_or_else(|e| e.into_inner());
        (stats.uptime_seconds(), stats.requests_total)
    };

    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds,
        requests_handled,
        plugins: state
            .ctx
            .plugins()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
        timestamp: Local::now().to_rfc3339(),
    })
}

/// GET /api/v1/runnable - one scan of the task store
async fn runnable_handler(
    State(state): State<AppState>,
) -> Result<Json<RunnableResponse>, HttpServerError> {
    let tasks = state
        .ctx
        .task_finder()
        .find_runnable_tasks()
        .await
        .map_err(|e| HttpServerError::Store(e.to_string()))?;

    Ok(Json(RunnableResponse {
        success: true,
        tasks: tasks.into_iter().map(RunnableTask::from).collect(),
    }))
}

/// POST /api/v1/shutdown
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
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mci_core::api::{AppConfig, AppContext, InMemoryTaskStore, Task, TaskStatus};
    use mci_plugins::factory::BuiltinPluginsFactory;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    fn create_test_state(tasks: Vec<Task>) -> AppState {
        let (shutdown_tx, _) = broadcast::channel(1);
        let ctx = AppContext::new(
            AppConfig::default(),
            Arc::new(InMemoryTaskStore::new(tasks)),
            &BuiltinPluginsFactory::default(),
        )
        .unwrap();
        AppState::new("test-session".into(), ctx, shutdown_tx)
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = create_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_lists_plugins() {
        let (status, body) = get(create_test_state(Vec::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["session_id"], "test-session");
        assert_eq!(body["plugins"], serde_json::json!(["git", "shell"]));
    }

    #[tokio::test]
    async fn runnable_reports_ready_tasks() {
        let tasks = vec![
            Task::new("compile").with_status(TaskStatus::Success),
            Task::new("test").depends_on(["compile"]),
            Task::new("deploy").depends_on(["test"]),
        ];
        let (status, body) = get(create_test_state(tasks), "/api/v1/runnable").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["test"]);
    }

    #[tokio::test]
    async fn plugin_routes_and_fallback_are_mounted() {
        let (status, body) = get(create_test_state(Vec::new()), "/git/patch").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "INVALID_REQUEST");

        let (status, body) = get(create_test_state(Vec::new()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn shutdown_signals_the_server() {
        let state = create_test_state(Vec::new());
        let mut shutdown_rx = state.shutdown_tx.subscribe();

        let response = shutdown_handler(State(state)).await;
        assert_eq!(response.0["success"], true);
        assert!(shutdown_rx.try_recv().is_ok());
    }
}
