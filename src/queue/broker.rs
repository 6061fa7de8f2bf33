use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A build job for one full task.
#[derive(Clone, Copy, Debug)]
pub struct BuildJob {
    pub task_id: Uuid,
}

/// BuildBroker hands build jobs from the API to the worker pool.
///
/// The append that fills a task calls `broker.enqueue(job)`; the job
/// is sent to a worker over a bounded mpsc channel, round-robin across
/// the pool. Backpressure comes from the channel bound. The broker is
/// not a separate task — just a struct with methods called by API
/// handlers.
///
/// Task state lives in the registry, not here: a dropped job leaves
/// the task in its last status, it is never lost from the map.
pub struct BuildBroker {
    worker_channels: Vec<mpsc::Sender<BuildJob>>,
    next_worker: AtomicUsize,
}

impl BuildBroker {
    /// Create a broker with one channel per worker.
    ///
    /// Returns the broker (for the API state) and the receivers, one
    /// per worker, for spawning the worker loops.
    pub fn new(
        num_workers: usize,
        channel_size: usize,
    ) -> (Self, Vec<mpsc::Receiver<BuildJob>>) {
        info!(num_workers, channel_size, "Creating BuildBroker");

        let mut worker_channels = Vec::with_capacity(num_workers);
        let mut worker_receivers = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let (tx, rx) = mpsc::channel(channel_size);
            worker_channels.push(tx);
            worker_receivers.push(rx);
            debug!(worker_id, "Created worker channel");
        }

        let broker = Self {
            worker_channels,
            next_worker: AtomicUsize::new(0),
        };

        (broker, worker_receivers)
    }

    /// Send a job to the next worker (round-robin).
    ///
    /// Awaits channel capacity when the worker's queue is full. A
    /// closed channel (worker gone, which only happens at shutdown) is
    /// logged and tolerated.
    pub async fn enqueue(&self, job: BuildJob) {
        let worker_idx =
            self.next_worker.fetch_add(1, Ordering::Relaxed) % self.worker_channels.len();

        match self.worker_channels[worker_idx].send(job).await {
            Ok(()) => {
                debug!(task_id = %job.task_id, worker_idx, "Build job sent to worker");
            }
            Err(_) => {
                warn!(
                    task_id = %job.task_id,
                    worker_idx,
                    "Worker channel closed, build job not delivered"
                );
            }
        }
    }

    pub fn num_workers(&self) -> usize {
        self.worker_channels.len()
    }

    /// True while every worker channel is still open.
    pub fn health_check(&self) -> bool {
        self.worker_channels.iter().all(|ch| !ch.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn jobs_distribute_round_robin() {
        let (broker, mut receivers) = BuildBroker::new(2, 10);

        let jobs: Vec<BuildJob> = (0..4).map(|_| BuildJob { task_id: Uuid::new_v4() }).collect();
        for job in &jobs {
            broker.enqueue(*job).await;
        }

        // Worker 0 gets jobs 0 and 2, worker 1 gets 1 and 3
        assert_eq!(receivers[0].recv().await.unwrap().task_id, jobs[0].task_id);
        assert_eq!(receivers[1].recv().await.unwrap().task_id, jobs[1].task_id);
        assert_eq!(receivers[0].recv().await.unwrap().task_id, jobs[2].task_id);
        assert_eq!(receivers[1].recv().await.unwrap().task_id, jobs[3].task_id);
    }

    #[tokio::test]
    async fn enqueue_tolerates_closed_channel() {
        let (broker, receivers) = BuildBroker::new(1, 10);
        drop(receivers);

        // Must not panic or hang
        broker.enqueue(BuildJob { task_id: Uuid::new_v4() }).await;
        assert!(!broker.health_check());
    }

    #[tokio::test]
    async fn health_check_reports_open_channels() {
        let (broker, _receivers) = BuildBroker::new(3, 10);
        assert_eq!(broker.num_workers(), 3);
        assert!(broker.health_check());
    }
}
