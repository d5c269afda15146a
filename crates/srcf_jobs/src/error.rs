//! Error type for the job model: malformed args rows, invalid state
//! transitions, and the `JobFailed` a handler raises to fail its own job
//! without that being a bug in the runner.

use thiserror::Error;

use srcf_protocol::JobState;

pub type Result<T> = std::result::Result<T, JobsError>;

#[derive(Debug, Error)]
pub enum JobsError {
    /// Raised by a task handler to terminate its own job as failed, with a
    /// human-readable message and optional captured command output.
    /// Mirrors `controllib.jobs.JobFailed`.
    #[error("{}", .message.as_deref().unwrap_or("job failed"))]
    JobFailed {
        message: Option<String>,
        raw: Option<String>,
    },

    /// An action was requested while the job was not in the state that
    /// action requires. Mirrors `controllib.jobs.JobActionInvalid`.
    #[error("can't {action} job, must be in {required} state (currently {current})")]
    ActionInvalid {
        action: &'static str,
        required: JobState,
        current: JobState,
    },

    #[error("unknown job type {0:?}")]
    UnknownJobKind(String),

    #[error("job type {job_type:?} is missing required argument {key:?}")]
    MissingArg { job_type: &'static str, key: &'static str },

    #[error("job type {job_type:?} argument {key:?} has invalid value {value:?}")]
    InvalidArg {
        job_type: &'static str,
        key: &'static str,
        value: String,
    },
}

impl JobsError {
    pub fn failed(message: impl Into<String>) -> Self {
        JobsError::JobFailed {
            message: Some(message.into()),
            raw: None,
        }
    }

    pub fn failed_with_raw(message: impl Into<String>, raw: impl Into<String>) -> Self {
        JobsError::JobFailed {
            message: Some(message.into()),
            raw: Some(raw.into()),
        }
    }
}
