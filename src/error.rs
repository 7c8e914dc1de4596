use crate::domain::identity::{Address, ProjectId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DelegateError {
    #[error("Delegate already initialized for project {0}")]
    AlreadyInitialized(ProjectId),
    #[error("Delegate has not been initialized")]
    NotInitialized,
    #[error("Invalid home identity: {0}")]
    InvalidHomeIdentity(ProjectId),
    #[error("Unauthorized payment event: {0}")]
    UnauthorizedPaymentEvent(String),
    #[error("Caller {caller} may not manage candidates of project {project}")]
    UnauthorizedOperator { caller: Address, project: ProjectId },
    #[error("No candidates registered")]
    EmptyCandidateSet,
    #[error("Forward failed: {0}")]
    ForwardFailed(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl DelegateError {
    /// Whether the same call may succeed later without changing its arguments.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EmptyCandidateSet | Self::IoError(_))
    }
}

pub type Result<T> = std::result::Result<T, DelegateError>;
