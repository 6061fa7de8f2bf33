use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::naming;

use super::error::RegistryError;
use super::task::{Task, TaskSnapshot, TaskStatus};

/// Result of a successful file append.
#[derive(Debug, Clone, Copy)]
pub struct AppendOutcome {
    /// File count after the append.
    pub files: usize,
    /// True exactly when this append brought the task to its file
    /// limit — the signal to enqueue an archive build.
    pub full: bool,
}

/// Registry of all tasks, keyed by id.
///
/// Capacity check + insert, and append + full-check, each happen under
/// one write-lock acquisition, so concurrent requests cannot overshoot
/// the configured limits.
pub struct TaskRegistry {
    tasks: RwLock<HashMap<Uuid, Task>>,
    limits: LimitsConfig,
}

impl TaskRegistry {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            limits,
        }
    }

    /// Allocate and register a new task.
    pub async fn create(&self) -> Result<TaskSnapshot, RegistryError> {
        let mut tasks = self.tasks.write().await;

        if tasks.len() >= self.limits.max_active_tasks {
            return Err(RegistryError::CapacityExceeded(self.limits.max_active_tasks));
        }

        let task = Task::new();
        let snapshot = task.snapshot();
        tasks.insert(task.id, task);

        info!(task_id = %snapshot.id, "Task created");
        Ok(snapshot)
    }

    /// Snapshot of all current tasks. Order is unspecified.
    pub async fn list(&self) -> Vec<TaskSnapshot> {
        let tasks = self.tasks.read().await;
        tasks.values().map(Task::snapshot).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<TaskSnapshot, RegistryError> {
        let tasks = self.tasks.read().await;
        tasks
            .get(&id)
            .map(Task::snapshot)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Append a file URL to a task.
    ///
    /// The URL's extension must match the configured allow-list
    /// exactly (case-sensitive, leading dot included).
    pub async fn append_file(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<AppendOutcome, RegistryError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(RegistryError::NotFound(id))?;

        if task.files.len() >= self.limits.max_files_per_task {
            return Err(RegistryError::LimitExceeded(self.limits.max_files_per_task));
        }

        let ext = naming::extension(url).unwrap_or("");
        if !self.limits.allowed_extensions.iter().any(|allowed| allowed == ext) {
            return Err(RegistryError::InvalidFormat(ext.to_string()));
        }

        task.files.push(url.to_string());
        task.touch();

        let files = task.files.len();
        let full = files == self.limits.max_files_per_task;
        debug!(task_id = %id, files, full, "File appended");

        Ok(AppendOutcome { files, full })
    }

    /// Advance a task's status. Forward-only: regressions are refused.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<(), RegistryError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(RegistryError::NotFound(id))?;

        if !task.status.can_advance_to(status) {
            return Err(RegistryError::InvalidTransition {
                from: task.status,
                to: status,
            });
        }

        task.status = status;
        task.touch();
        info!(task_id = %id, status = ?status, "Task status updated");
        Ok(())
    }
}
