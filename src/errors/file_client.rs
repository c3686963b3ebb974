use reqwest::StatusCode;
use thiserror::Error;

use super::AppError;

/// Errors raised while talking to the WebDAV server or preparing a request
#[derive(Error, Debug)]
pub enum FileClientError {
    #[error("Unauthorized: server answered {status}")]
    Unauthorized { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error {status} for '{path}': {message}")]
    ServerError {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Invalid WebDAV response: {details}")]
    InvalidResponse { details: String },

    #[error("Failed to read local file '{path}': {source}")]
    ClientSideRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No file selected for upload")]
    EmptySelection,

    #[error("Failed to save '{name}': {source}")]
    Save {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {details}")]
    Configuration { details: String },
}

impl FileClientError {
    /// Builds the error for a non-success HTTP status.
    pub fn from_status(path: &str, status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FileClientError::Unauthorized {
                status: status.as_u16(),
            },
            _ => FileClientError::ServerError {
                path: path.to_string(),
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn configuration(details: impl Into<String>) -> Self {
        FileClientError::Configuration {
            details: details.into(),
        }
    }

    /// True for failures of a remote call: any of these invalidates the listing
    /// and, under the default logout policy, the session.
    pub fn is_session_failure(&self) -> bool {
        matches!(
            self,
            FileClientError::Unauthorized { .. }
                | FileClientError::Network(_)
                | FileClientError::ServerError { .. }
                | FileClientError::InvalidResponse { .. }
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FileClientError::Unauthorized { .. })
    }
}

impl AppError for FileClientError {
    fn user_message(&self) -> String {
        match self {
            FileClientError::Unauthorized { .. } => "Your session is no longer valid".to_string(),
            FileClientError::Network(_) => "Could not reach the file server".to_string(),
            FileClientError::ServerError { path, status, .. } => {
                format!("The server rejected the request for '{}' ({})", path, status)
            }
            FileClientError::InvalidResponse { .. } => {
                "The server sent a listing that could not be read".to_string()
            }
            FileClientError::ClientSideRead { path, .. } => format!("Could not read '{}'", path),
            FileClientError::EmptySelection => "Choose a file before uploading".to_string(),
            FileClientError::Save { name, .. } => format!("Could not save '{}'", name),
            FileClientError::Configuration { details } => details.clone(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            FileClientError::Unauthorized { .. } => "UNAUTHORIZED",
            FileClientError::Network(_) => "NETWORK",
            FileClientError::ServerError { .. } => "SERVER_ERROR",
            FileClientError::InvalidResponse { .. } => "INVALID_RESPONSE",
            FileClientError::ClientSideRead { .. } => "CLIENT_SIDE_READ",
            FileClientError::EmptySelection => "EMPTY_SELECTION",
            FileClientError::Save { .. } => "SAVE_FAILED",
            FileClientError::Configuration { .. } => "CONFIGURATION",
        }
    }

    fn suggested_action(&self) -> Option<String> {
        match self {
            FileClientError::Unauthorized { .. } => Some("Sign in again".to_string()),
            FileClientError::Network(_) => {
                Some("Check your connection and API_URL, then retry".to_string())
            }
            FileClientError::ServerError { status: 412, .. } => {
                Some("The file already exists; upload with overwrite enabled".to_string())
            }
            _ => None,
        }
    }
}
