//! Error type for malformed protocol-level data (bad state strings, etc).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unrecognised job state: {0:?}")]
    UnknownJobState(String),

    #[error("unrecognised log level: {0:?}")]
    UnknownLogLevel(String),

    #[error("unrecognised log type: {0:?}")]
    UnknownLogType(String),

    #[error("unrecognised mail handler: {0:?}")]
    UnknownMailHandler(String),
}
