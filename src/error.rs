use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request to {url} rejected with status {status_code}. Response preview: {body_preview}")]
    RemoteRejected {
        url: String,
        status_code: u16,
        body_preview: String,
    },

    #[error("Request to {url} failed: {cause}")]
    TransportFailure {
        url: String,
        #[source]
        cause: reqwest::Error,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    FilesystemFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification of an [`EdgarError`], one per corrective action a
/// caller can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fix the input (ticker, CIK).
    BadInput,
    /// The ticker, filing or document does not exist where it was expected.
    NotFound,
    /// The remote service answered with an error status.
    RemoteRejected,
    /// The remote service could not be reached.
    Transport,
    /// The remote service answered with something that is not the expected document.
    Malformed,
    /// Local storage could not be read or written.
    Storage,
    /// The client was constructed with invalid settings.
    Config,
}

impl EdgarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EdgarError::InvalidIdentifier(_) => ErrorKind::BadInput,
            EdgarError::NotFound(_) => ErrorKind::NotFound,
            EdgarError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            EdgarError::TransportFailure { .. } => ErrorKind::Transport,
            EdgarError::MalformedResponse(_) => ErrorKind::Malformed,
            EdgarError::FilesystemFailure { .. } => ErrorKind::Storage,
            EdgarError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Wraps an I/O error with the path it happened at.
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EdgarError::FilesystemFailure {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for EdgarError {
    fn from(error: serde_json::Error) -> Self {
        EdgarError::MalformedResponse(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EdgarError>;
