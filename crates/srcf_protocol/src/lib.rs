//! Shared domain types for the SRCF job control plane.
//!
//! These types are the vocabulary every other `srcf_*` crate builds on: the
//! job state machine, the member/society/domain data model, and the small
//! identity helpers (`owner_name`, `owner_desc`, ...) used throughout the
//! task layer to avoid duplicating "is this owner a Member or a Society"
//! branches at every call site.

pub mod error;
pub mod owner;
pub mod types;

pub use error::{ProtocolError, Result};
pub use owner::{owner_desc, owner_home, owner_name, owner_website, Owner};
pub use types::{
    Domain, HttpsCert, JobId, JobLogEntry, JobState, LogLevel, LogType, MailHandler, Member,
    PendingAdmin, Society,
};

/// Job dispatch error raised by a task for a clean, user-reportable failure.
///
/// Mirrors the distinction the runner makes between a task-reported failure
/// (logged at warning, message shown verbatim to the submitter) and any other
/// panic/error (logged at error with the full chain, summarised for the
/// submitter).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct JobFailed {
    pub message: String,
    pub raw: Option<String>,
}

impl JobFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw: None,
        }
    }

    pub fn with_raw(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw: Some(raw.into()),
        }
    }
}
