//! Error type for SRCF-specific plumbing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BespokeError>;

#[derive(Debug, Error)]
pub enum BespokeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Unix(#[from] srcf_unix::UnixError),

    #[error(transparent)]
    HostGuard(#[from] srcf_task::HostGuardError),

    #[error("{0} has no registered admins left")]
    NoAdminsRemaining(String),

    #[error("{0}")]
    Other(String),
}
