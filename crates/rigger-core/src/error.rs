//! Error types for Rigger.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown os for user '{0}'")]
    UnknownOs(String),

    #[error("app not found: {0}")]
    AppNotFound(String),

    #[error("invalid repository: {0}")]
    InvalidRepository(String),

    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },
}

/// Broad class of a compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required scenario field is absent.
    Configuration,
    /// A cross-reference (os, app) could not be resolved.
    Resolution,
    /// A value is present but malformed.
    Validation,
    /// A delegated I/O collaborator failed.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField(_) => ErrorKind::Configuration,
            Error::UnknownOs(_) | Error::AppNotFound(_) => ErrorKind::Resolution,
            Error::InvalidRepository(_) => ErrorKind::Validation,
            Error::Download { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
