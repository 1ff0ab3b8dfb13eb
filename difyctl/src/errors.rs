use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Boxed source for transport failures, which come from reqwest, URL parsing or custom senders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Local file could not be opened or read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Multipart body could not be assembled
    #[error("failed to encode multipart body: {0}")]
    Encoding(#[source] reqwest::Error),

    /// Request construction or network send failed
    #[error("failed to {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// The service answered with an unexpected status
    #[error("API request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The service answered with the expected status but the body was not the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Config validation: {message}")]
    Config { message: String },
}

impl Error {
    pub(crate) fn transport(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// HTTP status returned by the service, if the failure came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport { source, .. } => source.downcast_ref::<reqwest::Error>().and_then(reqwest::Error::status),
            _ => None,
        }
    }
}

/// Type alias for client operation results
pub type Result<T> = std::result::Result<T, Error>;
