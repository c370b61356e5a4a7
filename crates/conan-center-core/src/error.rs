//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("String '{input}' doesn't match a Conan reference")]
    InvalidReference { input: String },

    #[error("Invalid {field} '{value}' in Conan reference")]
    InvalidToken { field: &'static str, value: String },

    #[error("Path '{path}' is not a valid Conan layout: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Reference '{reference}' has no revision")]
    UnresolvedRevision { reference: String },

    #[error("Invalid revision timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("Failed to parse revision index: {0}")]
    IndexParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
