use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound for append-file request bodies
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_max_body_bytes() -> ByteSize {
    ByteSize(64 * 1024) // 64 KB
}

/// Task and file caps
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_files_per_task")]
    pub max_files_per_task: usize,
    #[serde(default = "default_max_active_tasks")]
    pub max_active_tasks: usize,
    /// Accepted file extensions, compared case-sensitively with the
    /// leading dot included
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files_per_task: default_max_files_per_task(),
            max_active_tasks: default_max_active_tasks(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_max_files_per_task() -> usize {
    3
}

fn default_max_active_tasks() -> usize {
    3
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".pdf".to_string(), ".jpg".to_string(), ".jpeg".to_string()]
}

/// Filesystem layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Staged downloads live under `{staging_dir}/{task_id}/`
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Finished archives live at `{archive_dir}/{task_id}.zip`
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            archive_dir: default_archive_dir(),
        }
    }
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archives")
}

/// HTTP download client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("zipdrop/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Build worker pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkersConfig {
    #[serde(default = "default_worker_count")]
    pub count: usize,
    #[serde(default = "default_channel_size")]
    pub channel_size: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: default_worker_count(),
            channel_size: default_channel_size(),
        }
    }
}

fn default_worker_count() -> usize {
    2
}

fn default_channel_size() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config {
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            storage: StorageConfig::default(),
            download: DownloadConfig::default(),
            workers: WorkersConfig::default(),
        };

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.server.max_body_bytes.as_u64(), 64 * 1024);
        assert_eq!(config.limits.max_files_per_task, 3);
        assert_eq!(config.limits.max_active_tasks, 3);
        assert_eq!(
            config.limits.allowed_extensions,
            vec![".pdf", ".jpg", ".jpeg"]
        );
        assert_eq!(config.storage.staging_dir, PathBuf::from("tmp"));
        assert_eq!(config.storage.archive_dir, PathBuf::from("archives"));
        assert_eq!(config.workers.count, 2);
    }
}
