use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use http_body_util::BodyExt;
use tracing::info;

use super::{
    models::{AppendFileRequest, AppendFileResponse, HealthResponse, TaskCreatedResponse},
    state::AppState,
};
use crate::api::error::ApiError;
use crate::queue::BuildJob;
use crate::registry::TaskStatus;

/// Task creation endpoint (POST /tasks)
///
/// Fails with 503 when the registry already holds the configured
/// maximum number of tasks; tasks are never evicted, so capacity only
/// frees up across restarts.
pub async fn create_task(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.registry.create().await?;
    state.metrics.task_created();

    Ok((
        StatusCode::CREATED,
        Json(TaskCreatedResponse { id: snapshot.id }),
    ))
}

/// Task listing endpoint (GET /tasks)
///
/// Returns a snapshot of every task. Order is unspecified (the
/// registry is a map keyed by id).
pub async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    let tasks = state.registry.list().await;
    (StatusCode::OK, Json(tasks))
}

/// Task status endpoint (GET /tasks/{id})
///
/// Returns the current snapshot for a task: status, derived archive
/// path, appended file URLs, and timestamps.
pub async fn get_task(
    State(state): State<AppState>,
    axum::extract::Path(task_id): axum::extract::Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = super::utils::parse_task_id(&task_id)?;
    let snapshot = state.registry.get(task_id).await?;

    Ok((StatusCode::OK, Json(snapshot)))
}

/// File append endpoint (POST /tasks/{id}/files)
///
/// Accepts a `{"url": "..."}` body and appends the URL to the task.
/// The registry enforces the per-task file cap and the extension
/// allow-list atomically with the append.
///
/// When the append brings the task to its file limit, a build job is
/// enqueued to the worker pool and this request returns immediately —
/// callers poll `GET /tasks/{id}` for `completed` or `error`.
pub async fn append_file(
    State(state): State<AppState>,
    axum::extract::Path(task_id): axum::extract::Path<String>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = super::utils::parse_task_id(&task_id)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    super::utils::parse_content_type(content_type)?;

    let max_body = state.config.server.max_body_bytes.as_u64() as usize;
    let body_bytes = read_body(body, max_body).await?;

    let request: AppendFileRequest = serde_json::from_slice(&body_bytes)?;

    let outcome = state.registry.append_file(task_id, &request.url).await?;
    state.metrics.file_appended();

    if outcome.full {
        state.broker.enqueue(BuildJob { task_id }).await;
        info!(%task_id, files = outcome.files, "Task full, build enqueued");
    }

    Ok((
        StatusCode::OK,
        Json(AppendFileResponse {
            message: "File added successfully".to_string(),
        }),
    ))
}

/// Archive download endpoint (GET /tasks/{id}/archive)
///
/// Serves the finished zip as an attachment. Fails with 400 while the
/// task has not reached `completed`, and with 404 if the archive file
/// is missing from disk despite the completed status.
pub async fn download_archive(
    State(state): State<AppState>,
    axum::extract::Path(task_id): axum::extract::Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = super::utils::parse_task_id(&task_id)?;
    let snapshot = state.registry.get(task_id).await?;

    if snapshot.status != TaskStatus::Completed {
        return Err(ApiError::ArchiveNotReady(task_id.to_string()));
    }

    let zip_path = state
        .config
        .storage
        .archive_dir
        .join(format!("{task_id}.zip"));
    let bytes = tokio::fs::read(&zip_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::ArchiveMissing(task_id.to_string())
        } else {
            ApiError::Internal(format!("Failed to read archive: {e}"))
        }
    })?;

    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{task_id}.zip\""))
            .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/zip"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// Reads request body and validates size
///
/// Decompression is handled transparently by the
/// RequestDecompressionLayer middleware, so this receives
/// already-decompressed data.
async fn read_body(body: axum::body::Body, max_size: usize) -> Result<Vec<u8>, ApiError> {
    let data = body
        .collect()
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .to_bytes()
        .to_vec();

    super::utils::validate_body_size(&data, max_size)?;

    Ok(data)
}

/// Health check endpoint (GET /health)
///
/// Reports per-component health plus a metrics snapshot. Returns 503
/// if any component is unhealthy.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert(
        "build_broker".to_string(),
        if state.broker.health_check() {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
    );

    let all_healthy = components.values().all(|status| status == "healthy");
    let overall_status = if all_healthy { "healthy" } else { "unhealthy" };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    };

    (status_code, Json(response))
}
