//! Error types for repository operations

use conan_center_core::CoreError;
use thiserror::Error;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Configuration Errors ============
    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    #[error("Server not configured: {server_id}")]
    ServerNotFound { server_id: String },

    #[error("Server already configured: {server_id}")]
    ServerAlreadyExists { server_id: String },

    #[error("Invalid server URL: {url} - {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Network Errors ============
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    // ============ Authentication Errors ============
    #[error("Authentication required for {url}")]
    AuthRequired { url: String },

    #[error("Authentication failed: {message}")]
    AuthFailed { message: String },

    // ============ Remote Data Errors ============
    #[error("Remote file not found: {path}")]
    RemoteFileNotFound { path: String },

    #[error("Invalid revision index {path}: {message}")]
    IndexParseError { path: String, message: String },

    #[error("No revisions listed in {path}")]
    NoRevisions { path: String },

    #[error("Latest revision '{revision}' of {node} listed in the index was not found in the repository")]
    InconsistentRevision { node: String, revision: String },

    #[error("Unexpected search result '{path}': {reason}")]
    UnexpectedSearchResult { path: String, reason: String },

    #[error("Invalid search response: {message}")]
    InvalidSearchResponse { message: String },

    #[error("Properties for {kind} '{path}' not found")]
    PropertiesNotFound { kind: &'static str, path: String },

    // ============ Usage Errors ============
    #[error("Invalid usage: {message}")]
    InvalidUsage { message: String },

    // ============ Wrapped Errors ============
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RepoError::Timeout { seconds: 30 }
        } else if e.is_connect() {
            RepoError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if let Some(status) = e.status() {
            RepoError::HttpError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            RepoError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for RepoError {
    fn from(e: url::ParseError) -> Self {
        RepoError::InvalidServerUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}
