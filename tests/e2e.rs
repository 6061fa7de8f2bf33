//! End-to-end integration tests for zipdrop
//!
//! These tests verify the complete system flow over a real TCP
//! listener:
//! 1. Create a task and append file URLs over HTTP
//! 2. The third append enqueues a build job to the worker pool
//! 3. A worker downloads the files from an embedded mock server
//! 4. The worker packs the zip and completes the task
//! 5. The client polls status and downloads the archive

use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use bytes::Bytes;
use serde_json::json;
use tempfile::TempDir;
use tokio::time::sleep;

use zipdrop::api::state::AppState;
use zipdrop::builder::ArchiveBuilder;
use zipdrop::config::Config;
use zipdrop::queue::BuildBroker;
use zipdrop::registry::{TaskRegistry, TaskSnapshot, TaskStatus};
use zipdrop::worker;

/// Test context holding all shared resources
struct E2EContext {
    base_url: String,
    file_server_url: String,
    staging_dir: PathBuf,
    archive_dir: PathBuf,
    client: reqwest::Client,
    _temp_dir: TempDir,
}

impl E2EContext {
    /// Start the full application (workers included) plus an embedded
    /// file server, both on ephemeral ports.
    async fn setup() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let staging_dir = temp_dir.path().join("tmp");
        let archive_dir = temp_dir.path().join("archives");

        let config_toml = format!(
            r#"
[storage]
staging_dir = "{staging}"
archive_dir = "{archive}"

[workers]
count = 2
"#,
            staging = staging_dir.display(),
            archive = archive_dir.display(),
        );
        let config: Config = toml::from_str(&config_toml).expect("Failed to parse test config");

        let registry = Arc::new(TaskRegistry::new(config.limits.clone()));
        let builder = Arc::new(ArchiveBuilder::new(&config).expect("Failed to build builder"));
        let (broker, receivers) =
            BuildBroker::new(config.workers.count, config.workers.channel_size);
        let broker = Arc::new(broker);

        let state = AppState::new(config, registry.clone(), broker);
        worker::spawn_pool(receivers, registry, builder, state.metrics.clone());

        let app = zipdrop::api::router(state);
        let base_url = serve(app).await;

        let file_server_url = serve(file_server()).await;

        Self {
            base_url,
            file_server_url,
            staging_dir,
            archive_dir,
            client: reqwest::Client::new(),
            _temp_dir: temp_dir,
        }
    }

    async fn create_task(&self) -> String {
        let response = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.unwrap();
        body.get("id").and_then(|v| v.as_str()).unwrap().to_string()
    }

    async fn append_file(&self, task_id: &str, file: &str) -> reqwest::StatusCode {
        let url = format!("{}/{}", self.file_server_url, file);
        let response = self
            .client
            .post(format!("{}/tasks/{}/files", self.base_url, task_id))
            .json(&json!({ "url": url }))
            .send()
            .await
            .unwrap();
        response.status()
    }

    async fn get_task(&self, task_id: &str) -> TaskSnapshot {
        let response = self
            .client
            .get(format!("{}/tasks/{}", self.base_url, task_id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.unwrap()
    }

    /// Poll task status until it reaches `expected` or times out.
    /// Asserts the status never takes an unexpected terminal turn.
    async fn wait_for_status(&self, task_id: &str, expected: TaskStatus) -> TaskSnapshot {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
        loop {
            let snapshot = self.get_task(task_id).await;
            if snapshot.status == expected {
                return snapshot;
            }
            assert!(
                matches!(snapshot.status, TaskStatus::Created | TaskStatus::Processing),
                "task reached unexpected terminal status {:?} while waiting for {:?}",
                snapshot.status,
                expected
            );
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for status {:?}",
                expected
            );
            sleep(Duration::from_millis(50)).await;
        }
    }
}

/// Serve a router on an ephemeral local port, returning its base URL
async fn serve(app: Router) -> String {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", bound)
}

/// Embedded mock server for the remote files. `missing.jpg` is not
/// routed, so requests for it 404.
fn file_server() -> Router {
    Router::new()
        .route("/a.pdf", get(|| async { Bytes::from_static(b"%PDF-1.4 alpha") }))
        .route("/b.jpg", get(|| async { Bytes::from_static(b"jpg bravo") }))
        .route("/c.jpeg", get(|| async { Bytes::from_static(b"jpeg charlie") }))
}

#[tokio::test]
async fn test_full_flow_produces_archive() {
    let ctx = E2EContext::setup().await;

    let task_id = ctx.create_task().await;

    assert_eq!(
        ctx.append_file(&task_id, "a.pdf").await,
        reqwest::StatusCode::OK
    );
    assert_eq!(
        ctx.append_file(&task_id, "b.jpg").await,
        reqwest::StatusCode::OK
    );

    // Two files in: no build yet
    let snapshot = ctx.get_task(&task_id).await;
    assert_eq!(snapshot.status, TaskStatus::Created);
    assert_eq!(snapshot.files.len(), 2);

    // Third append fills the task and triggers the build
    assert_eq!(
        ctx.append_file(&task_id, "c.jpeg").await,
        reqwest::StatusCode::OK
    );

    ctx.wait_for_status(&task_id, TaskStatus::Completed).await;

    // Download the archive
    let response = ctx
        .client
        .get(format!("{}/tasks/{}/archive", ctx.base_url, task_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/zip")
    );
    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"{}.zip\"", task_id)
    );

    let bytes = response.bytes().await.unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_ref())).unwrap();

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["0_a.pdf", "1_b.jpg", "2_c.jpeg"]);

    let mut content = Vec::new();
    archive
        .by_name("2_c.jpeg")
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    assert_eq!(content, b"jpeg charlie");

    // The archive exists on disk and staging is cleaned up
    assert!(ctx.archive_dir.join(format!("{}.zip", task_id)).exists());
    assert!(!ctx.staging_dir.join(&task_id).exists());
}

#[tokio::test]
async fn test_failed_download_marks_task_error() {
    let ctx = E2EContext::setup().await;

    let task_id = ctx.create_task().await;

    assert_eq!(
        ctx.append_file(&task_id, "a.pdf").await,
        reqwest::StatusCode::OK
    );
    // Unroutable file: the download 404s and the build must abort
    assert_eq!(
        ctx.append_file(&task_id, "missing.jpg").await,
        reqwest::StatusCode::OK
    );
    assert_eq!(
        ctx.append_file(&task_id, "c.jpeg").await,
        reqwest::StatusCode::OK
    );

    ctx.wait_for_status(&task_id, TaskStatus::Error).await;

    // No zip was produced, and the archive endpoint refuses
    assert!(!ctx.archive_dir.join(format!("{}.zip", task_id)).exists());
    assert!(!ctx.staging_dir.join(&task_id).exists());

    let response = ctx
        .client
        .get(format!("{}/tasks/{}/archive", ctx.base_url, task_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body.get("code").and_then(|v| v.as_str()),
        Some("ARCHIVE_NOT_READY")
    );
}

#[tokio::test]
async fn test_concurrent_tasks_build_independently() {
    let ctx = E2EContext::setup().await;

    let good = ctx.create_task().await;
    let bad = ctx.create_task().await;

    for file in ["a.pdf", "b.jpg", "c.jpeg"] {
        assert_eq!(ctx.append_file(&good, file).await, reqwest::StatusCode::OK);
    }
    for file in ["a.pdf", "missing.jpg", "c.jpeg"] {
        assert_eq!(ctx.append_file(&bad, file).await, reqwest::StatusCode::OK);
    }

    // One task failing never affects the other
    ctx.wait_for_status(&good, TaskStatus::Completed).await;
    ctx.wait_for_status(&bad, TaskStatus::Error).await;

    assert!(ctx.archive_dir.join(format!("{}.zip", good)).exists());
    assert!(!ctx.archive_dir.join(format!("{}.zip", bad)).exists());
}
