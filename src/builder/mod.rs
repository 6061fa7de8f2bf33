//! Archive builder
//!
//! Downloads a full task's files into a per-task staging directory and
//! packs them into `archives/{task_id}.zip`, driving the task status
//! through the registry: `processing` on entry, `completed` or `error`
//! on exit.
//!
//! Failure policy is split by stage. A download failure aborts the
//! whole build (caller-input-driven, fails fast before any zip I/O).
//! The zip stage tolerates individual unreadable staged files, but an
//! archive with zero entries fails the build.

mod archive;
mod download;

pub use download::{DownloadError, HttpClient};

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::naming;
use crate::registry::{RegistryError, TaskRegistry, TaskSnapshot, TaskStatus};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(DownloadError),

    #[error("download failed for {url}: {source}")]
    DownloadFailed { url: String, source: DownloadError },

    #[error("no files were added to the archive")]
    EmptyArchive,

    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive packing task failed: {0}")]
    PackJoin(#[from] tokio::task::JoinError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

pub struct ArchiveBuilder {
    client: HttpClient,
    staging_dir: PathBuf,
    archive_dir: PathBuf,
}

impl ArchiveBuilder {
    pub fn new(config: &Config) -> Result<Self, BuildError> {
        let client = HttpClient::new(&config.download).map_err(BuildError::Client)?;
        Ok(Self {
            client,
            staging_dir: config.storage.staging_dir.clone(),
            archive_dir: config.storage.archive_dir.clone(),
        })
    }

    /// Build the archive for a full task.
    ///
    /// The staging directory for the task is removed afterwards on
    /// both success and failure paths (best-effort).
    pub async fn build(
        &self,
        registry: &TaskRegistry,
        task_id: Uuid,
    ) -> Result<(), BuildError> {
        let task = registry.get(task_id).await?;
        registry.set_status(task_id, TaskStatus::Processing).await?;

        let result = self.download_and_pack(&task).await;

        let staging = self.staging_dir.join(task_id.to_string());
        if let Err(error) = tokio::fs::remove_dir_all(&staging).await {
            if error.kind() != std::io::ErrorKind::NotFound {
                warn!(%task_id, %error, "Failed to clean up staging directory");
            }
        }

        match result {
            Ok(()) => {
                registry.set_status(task_id, TaskStatus::Completed).await?;
                info!(%task_id, "Archive created");
                Ok(())
            }
            Err(error) => {
                warn!(%task_id, %error, "Archive build failed");
                if let Err(status_error) =
                    registry.set_status(task_id, TaskStatus::Error).await
                {
                    warn!(%task_id, %status_error, "Failed to record error status");
                }
                Err(error)
            }
        }
    }

    async fn download_and_pack(&self, task: &TaskSnapshot) -> Result<(), BuildError> {
        let staging = self.staging_dir.join(task.id.to_string());
        tokio::fs::create_dir_all(&staging).await?;

        let mut staged = Vec::with_capacity(task.files.len());
        for (index, url) in task.files.iter().enumerate() {
            let name = naming::staged_name(index, url);
            let path = staging.join(&name);

            let bytes = self.client.fetch(url).await.map_err(|source| {
                BuildError::DownloadFailed {
                    url: url.clone(),
                    source,
                }
            })?;
            tokio::fs::write(&path, &bytes).await?;

            debug!(task_id = %task.id, url = %url, size = bytes.len(), "File staged");
            staged.push((name, path));
        }

        tokio::fs::create_dir_all(&self.archive_dir).await?;
        let zip_path = self.archive_dir.join(format!("{}.zip", task.id));
        let added =
            tokio::task::spawn_blocking(move || archive::pack_zip(&zip_path, &staged)).await??;

        if added == 0 {
            return Err(BuildError::EmptyArchive);
        }

        Ok(())
    }
}
