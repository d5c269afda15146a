//! Error type for the notification email layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmailError>;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("template render error: {0}")]
    Render(#[from] askama::Error),

    #[error("template produced no body separator: {0:?}")]
    MalformedTemplate(String),

    #[error("invalid address {0:?}: {1}")]
    InvalidAddress(String, String),

    #[error("smtp transport error: {0}")]
    Smtp(String),
}
