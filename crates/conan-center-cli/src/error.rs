//! CLI error types with exit code handling
//!
//! Every library error is classified into one of the variants below, which
//! decides the process exit code.

use conan_center_core::CoreError;
use conan_center_repo::RepoError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Malformed user input
    #[error("Invalid input: {message}")]
    #[diagnostic(code(conan_center::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Options that cannot be combined
    #[error("Invalid usage: {message}")]
    #[diagnostic(code(conan_center::cli::usage))]
    Usage { message: String },

    /// Repository, server or remote node missing
    #[error("{message}")]
    #[diagnostic(code(conan_center::cli::not_found))]
    NotFound { message: String },

    /// Server unreachable or request rejected
    #[error("Remote error: {message}")]
    #[diagnostic(code(conan_center::cli::remote))]
    Remote {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Repository content is malformed or inconsistent
    #[error("Repository data error: {message}")]
    #[diagnostic(code(conan_center::cli::data))]
    Data { message: String },

    /// Server configuration or credential problem
    #[error("Configuration error: {message}")]
    #[diagnostic(code(conan_center::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(conan_center::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(conan_center::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Remote { .. } => exit_codes::REMOTE_ERROR,
            CliError::Data { .. } => exit_codes::DATA_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io { .. } => exit_codes::ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidReference { .. } => CliError::input_with_help(
                message,
                "expected name/version[@user/channel][#revision]",
            ),
            CoreError::InvalidToken { .. } | CoreError::UnresolvedRevision { .. } => {
                CliError::input(message)
            }
            CoreError::InvalidPath { .. }
            | CoreError::InvalidTimestamp { .. }
            | CoreError::IndexParse(_) => CliError::Data { message },
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        let message = err.to_string();
        match err {
            RepoError::Core(core) => core.into(),

            RepoError::RepositoryNotFound { .. }
            | RepoError::ServerNotFound { .. }
            | RepoError::RemoteFileNotFound { .. }
            | RepoError::NoRevisions { .. }
            | RepoError::PropertiesNotFound { .. } => CliError::NotFound { message },

            RepoError::ServerAlreadyExists { .. }
            | RepoError::InvalidServerUrl { .. }
            | RepoError::InvalidConfig { .. } => CliError::Config {
                message,
                help: Some("see 'conan-center server --help'".to_string()),
            },

            RepoError::AuthRequired { .. } | RepoError::AuthFailed { .. } => CliError::Remote {
                message,
                help: Some(
                    "configure credentials with 'server add' or pass --access-token".to_string(),
                ),
            },
            RepoError::HttpError { .. }
            | RepoError::NetworkError { .. }
            | RepoError::Timeout { .. } => CliError::Remote {
                message,
                help: None,
            },

            RepoError::IndexParseError { .. }
            | RepoError::InconsistentRevision { .. }
            | RepoError::UnexpectedSearchResult { .. }
            | RepoError::InvalidSearchResponse { .. }
            | RepoError::Serialization(_) => CliError::Data { message },

            RepoError::InvalidUsage { .. } => CliError::Usage { message },

            RepoError::Io(_) => CliError::Io { message },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let invalid: CliError = CoreError::InvalidReference {
            input: "zlib".to_string(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_codes::INPUT_ERROR);

        let missing: CliError = RepoError::RepositoryNotFound {
            name: "conan".to_string(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_codes::NOT_FOUND);
        assert_eq!(missing.to_string(), "Repository not found: conan");

        let usage: CliError = RepoError::InvalidUsage {
            message: "nope".to_string(),
        }
        .into();
        assert_eq!(usage.exit_code(), exit_codes::USAGE_ERROR);

        let wrapped: CliError = RepoError::Core(CoreError::InvalidPath {
            path: "a/b".to_string(),
            reason: "short".to_string(),
        })
        .into();
        assert_eq!(wrapped.exit_code(), exit_codes::DATA_ERROR);

        let remote: CliError = RepoError::AuthRequired {
            url: "https://example.com".to_string(),
        }
        .into();
        assert_eq!(remote.exit_code(), exit_codes::REMOTE_ERROR);
    }
}
