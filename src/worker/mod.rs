//! Build worker loop
//!
//! Each worker owns one receiver from the [`crate::queue::BuildBroker`]
//! and drains it for the life of the process. Builder failures are
//! recorded in task status by the builder itself; the worker logs the
//! outcome and counts it, so one bad task never takes a worker down.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::builder::ArchiveBuilder;
use crate::observability::Metrics;
use crate::queue::BuildJob;
use crate::registry::TaskRegistry;

pub async fn run(
    worker_id: usize,
    mut receiver: mpsc::Receiver<BuildJob>,
    registry: Arc<TaskRegistry>,
    builder: Arc<ArchiveBuilder>,
    metrics: Arc<Metrics>,
) {
    info!(worker_id, "Build worker started");

    while let Some(job) = receiver.recv().await {
        info!(worker_id, task_id = %job.task_id, "Processing build job");

        match builder.build(&registry, job.task_id).await {
            Ok(()) => {
                metrics.build_completed();
                info!(worker_id, task_id = %job.task_id, "Build job completed");
            }
            Err(e) => {
                metrics.build_failed();
                error!(worker_id, task_id = %job.task_id, error = %e, "Build job failed");
            }
        }
    }

    info!(worker_id, "Worker channel closed, shutting down");
}

/// Spawn one worker task per broker receiver.
pub fn spawn_pool(
    broker_receivers: Vec<mpsc::Receiver<BuildJob>>,
    registry: Arc<TaskRegistry>,
    builder: Arc<ArchiveBuilder>,
    metrics: Arc<Metrics>,
) {
    for (worker_id, receiver) in broker_receivers.into_iter().enumerate() {
        tokio::spawn(run(
            worker_id,
            receiver,
            registry.clone(),
            builder.clone(),
            metrics.clone(),
        ));
    }
}
