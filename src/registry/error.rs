use thiserror::Error;
use uuid::Uuid;

use super::task::TaskStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("server busy: no more than {0} active tasks allowed")]
    CapacityExceeded(usize),

    #[error("task {0} not found")]
    NotFound(Uuid),

    #[error("no more than {0} files allowed per task")]
    LimitExceeded(usize),

    #[error("file extension {0:?} is not allowed")]
    InvalidFormat(String),

    #[error("invalid status transition {from:?} -> {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
}
