//! Repository services trait
//!
//! Everything this crate needs from an Artifactory server: find items by
//! pattern, read a file and check that a repository exists. Search logic is
//! written against this trait so it runs unchanged against the HTTP client
//! or an in-memory implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters of a pattern search
///
/// The pattern is `{repo}/{path pattern}/{name pattern}` where `*` matches
/// any sequence of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub pattern: String,
    /// Also match items in subfolders of the path pattern
    pub recursive: bool,
    /// Also return folders, not only files
    pub include_dirs: bool,
}

impl SearchParams {
    /// Files matching the pattern exactly
    pub fn files(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            recursive: false,
            include_dirs: false,
        }
    }

    /// The single node (file or folder) at the given path
    pub fn node(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            recursive: false,
            include_dirs: true,
        }
    }
}

/// A key/value property attached to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An item returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub repo: String,
    /// Folder of the item, relative to the repository
    pub path: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl ResultItem {
    /// Path of the item relative to the repository
    pub fn relative_path(&self) -> String {
        match self.path.as_str() {
            "" | "." => self.name.clone(),
            path => format!("{}/{}", path.trim_end_matches('/'), self.name),
        }
    }
}

/// Access to an Artifactory server
#[async_trait]
pub trait ArtifactoryServices: Send + Sync {
    /// Fail with `RepositoryNotFound` unless the repository exists
    async fn check_repository(&self, repository: &str) -> Result<()>;

    /// Items matching the search parameters, in server order
    async fn search_files(&self, params: &SearchParams) -> Result<Vec<ResultItem>>;

    /// Content of a file, addressed as `{repo}/{path}`
    async fn read_remote_file(&self, path: &str) -> Result<Vec<u8>>;
}
