//! HTTP routes served under `/git`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::patch::PatchStore;

use super::{GIT_PATCH_FILE_PATH, GIT_PATCH_PATH};

#[derive(Clone)]
struct ApiState {
    patches: Arc<dyn PatchStore>,
}

#[derive(Debug, Deserialize)]
struct PatchQuery {
    patch_id: Option<String>,
}

#[derive(Debug)]
enum ApiError {
    InvalidRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });

        (status, Json(body)).into_response()
    }
}

pub(super) fn router(patches: Arc<dyn PatchStore>) -> Router {
    Router::new()
        .route(
            &format!("/{GIT_PATCH_FILE_PATH}/:patchfile_id"),
            get(serve_patch_file),
        )
        .route(&format!("/{GIT_PATCH_PATH}"), get(serve_patch))
        .with_state(ApiState { patches })
}

/// GET /git/patchfile/:patchfile_id - raw stored patch file
async fn serve_patch_file(
    State(state): State<ApiState>,
    Path(patchfile_id): Path<String>,
) -> Result<Response, ApiError> {
    validate_id("patchfile_id", &patchfile_id)?;

    match state.patches.find_patch_file(&patchfile_id).await {
        Ok(Some(contents)) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            contents,
        )
            .into_response()),
        Ok(None) => Err(ApiError::NotFound(format!(
            "patch file '{patchfile_id}' not found"
        ))),
        Err(e) => {
            tracing::error!(patchfile_id = %patchfile_id, error = %e, "patch file lookup failed");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// GET /git/patch?patch_id=... - patch document with its module diffs
async fn serve_patch(
    State(state): State<ApiState>,
    Query(query): Query<PatchQuery>,
) -> Result<Response, ApiError> {
    let patch_id = query
        .patch_id
        .ok_or_else(|| ApiError::InvalidRequest("missing patch_id".to_string()))?;
    validate_id("patch_id", &patch_id)?;

    match state.patches.find_patch(&patch_id).await {
        Ok(Some(patch)) => Ok(Json(patch).into_response()),
        Ok(None) => Err(ApiError::NotFound(format!("patch '{patch_id}' not found"))),
        Err(e) => {
            tracing::error!(patch_id = %patch_id, error = %e, "patch lookup failed");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// Identifiers are limited to alphanumerics, underscore and hyphen.
fn validate_id(field: &str, id: &str) -> Result<(), ApiError> {
    if id.is_empty() {
        return Err(ApiError::InvalidRequest(format!("{field} cannot be empty")));
    }
    if id.len() > 128 {
        return Err(ApiError::InvalidRequest(format!(
            "{field} too long ({} chars, max 128)",
            id.len()
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::InvalidRequest(format!(
            "{field} can only contain alphanumeric, underscore, and hyphen characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_validation() {
        assert!(validate_id("patch_id", "5f1e-abc_9").is_ok());
        assert!(validate_id("patch_id", "").is_err());
        assert!(validate_id("patch_id", "../etc/passwd").is_err());
        assert!(validate_id("patch_id", &"a".repeat(129)).is_err());
    }
}
