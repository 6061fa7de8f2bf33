//! API models for the zipdrop task endpoints.
//!
//! The external contract is small:
//! - `POST /tasks` returns [`TaskCreatedResponse`]
//! - `GET /tasks` and `GET /tasks/{id}` return
//!   [`crate::registry::TaskSnapshot`] values serialized directly
//! - `POST /tasks/{id}/files` accepts [`AppendFileRequest`] and
//!   returns [`AppendFileResponse`]
//! - `GET /tasks/{id}/archive` streams the finished zip as an
//!   attachment
//! - errors everywhere serialize as [`ErrorResponse`]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::observability::MetricsSnapshot;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskCreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppendFileRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppendFileResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
    pub metrics: MetricsSnapshot,
}
