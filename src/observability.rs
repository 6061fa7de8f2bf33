//! Observability stubs (metrics, tracing)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    tasks_created: AtomicU64,
    files_appended: AtomicU64,
    builds_completed: AtomicU64,
    builds_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_created(&self) {
        self.tasks_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_created", "Metric incremented");
    }

    pub fn file_appended(&self) {
        self.files_appended.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "files_appended", "Metric incremented");
    }

    pub fn build_completed(&self) {
        self.builds_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "builds_completed", "Metric incremented");
    }

    pub fn build_failed(&self) {
        self.builds_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "builds_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_created: self.tasks_created.load(Ordering::Relaxed),
            files_appended: self.files_appended.load(Ordering::Relaxed),
            builds_completed: self.builds_completed.load(Ordering::Relaxed),
            builds_failed: self.builds_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tasks_created: u64,
    pub files_appended: u64,
    pub builds_completed: u64,
    pub builds_failed: u64,
}
