//! Error type for the runner crate: job-row CRUD, approval lookups, and
//! the dispatch loop all funnel through this one type. The dispatch loop
//! itself distinguishes [`RunnerError::JobFailed`]/a task's other typed
//! errors from anything else per the runner's clean-vs-unexpected-failure
//! split, but that distinction is made by matching on `srcf_tasks::TasksError`
//! at the call site, not by a variant here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Db(#[from] srcf_db::DbError),

    #[error(transparent)]
    Jobs(#[from] srcf_jobs::JobsError),

    #[error(transparent)]
    Protocol(#[from] srcf_protocol::ProtocolError),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("malformed job args: {0}")]
    Json(#[from] serde_json::Error),

    #[error("job {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Other(String),
}
