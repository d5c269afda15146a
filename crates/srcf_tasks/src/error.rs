//! Error type for the task layer. Each handler's `run` either succeeds or
//! fails with one of these; [`TasksError::JobFailed`] is the clean,
//! user-reportable failure a handler raises deliberately (mirrors
//! `controllib.jobs.JobFailed`'s use inside a job's `run` body) — every
//! other variant is an unexpected error the runner logs in full and
//! summarises for the submitter.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TasksError>;

#[derive(Debug, Error)]
pub enum TasksError {
    #[error(transparent)]
    JobFailed(#[from] srcf_protocol::JobFailed),

    #[error(transparent)]
    Unix(#[from] srcf_unix::UnixError),

    #[error(transparent)]
    Sql(#[from] srcf_sql::SqlError),

    #[error(transparent)]
    Mailman(#[from] srcf_mailman::MailmanError),

    #[error(transparent)]
    Bespoke(#[from] srcf_bespoke::BespokeError),

    #[error(transparent)]
    Email(#[from] srcf_email::EmailError),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

impl TasksError {
    pub fn failed(message: impl Into<String>) -> Self {
        TasksError::JobFailed(srcf_protocol::JobFailed::new(message))
    }

    pub fn failed_with_raw(message: impl Into<String>, raw: impl Into<String>) -> Self {
        TasksError::JobFailed(srcf_protocol::JobFailed::with_raw(message, raw))
    }
}
