use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task lifecycle state.
///
/// Transitions only move forward: `created` -> `processing` ->
/// `completed` or `error`. The registry refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Created,
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Created, TaskStatus::Processing)
                | (TaskStatus::Processing, TaskStatus::Completed)
                | (TaskStatus::Processing, TaskStatus::Error)
        )
    }
}

/// A unit of work: up to N file URLs to be downloaded and zipped.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub status: TaskStatus,
    pub path: String,
    pub files: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Task {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        Self {
            id,
            status: TaskStatus::Created,
            path: format!("archives/{id}"),
            files: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            status: self.status,
            path: self.path.clone(),
            files: self.files.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of a task, returned to callers and serialized on
/// the status endpoints. Detached from the registry: holding one never
/// holds the lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: Uuid,
    pub status: TaskStatus,
    pub path: String,
    pub files: Vec<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
