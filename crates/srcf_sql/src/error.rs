//! Error type for SQL plumbing: either dialect's connector errors, plus the
//! identifier-safety rejection shared by both.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqlError>;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] srcf_db::IdentifierError),

    #[error("{0}")]
    Other(String),
}
