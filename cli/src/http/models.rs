use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mci_core::api::Task;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub plugins: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunnableTask {
    pub id: String,
    pub display_name: String,
    pub project: String,
    pub build_variant: String,
}

impl From<Task> for RunnableTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            display_name: task.display_name,
            project: task.project,
            build_variant: task.build_variant,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunnableResponse {
    pub success: bool,
    pub tasks: Vec<RunnableTask>,
}

#[derive(Debug)]
pub enum HttpServerError {
    Store(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::Store(msg) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_ERROR", msg),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });

        (status, Json(body)).into_response()
    }
}
