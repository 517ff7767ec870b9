//! Error types for the tag registry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("invalid tag document: {0}")]
    InvalidTagDocument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
