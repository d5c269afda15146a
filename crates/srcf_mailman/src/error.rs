//! Error type for mailing-list plumbing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MailmanError>;

#[derive(Debug, Error)]
pub enum MailmanError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    HostGuard(#[from] srcf_task::HostGuardError),

    #[error("invalid list name {0:?}: must match [A-Za-z0-9-]+")]
    InvalidName(String),

    #[error("list name {0:?} ends with reserved suffix {1:?}")]
    ReservedSuffix(String, String),

    #[error("list {0:?} already exists")]
    AlreadyExists(String),

    #[error("change_pw produced no recognisable password line: {0:?}")]
    UnrecognisedPasswordOutput(String),
}
