//! In-memory repository services for testing
//!
//! Serves searches from a list of items and reads from a map of documents,
//! without an Artifactory server. Fixtures are JSON:
//!
//! ```json
//! {
//!   "repositories": ["repository"],
//!   "files": ["repository/_/b2/4.0.0/_/3c07b6a5/export/conanfile.py"],
//!   "folders": [{"path": "repository/_/b2/4.0.0/_/3c07b6a5", "properties": []}],
//!   "documents": {"repository/_/b2/4.0.0/_/index.json": {"revisions": []}}
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::aql::split_pattern;
use crate::error::{RepoError, Result};
use crate::services::{ArtifactoryServices, Property, ResultItem, SearchParams};

/// In-memory Artifactory
#[derive(Clone, Default)]
pub struct MockServices {
    repositories: Arc<RwLock<BTreeSet<String>>>,
    items: Arc<RwLock<Vec<ResultItem>>>,
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Track calls for assertions
    operations: Arc<RwLock<OperationLog>>,
}

/// Calls performed against the mock
#[derive(Debug, Default, Clone)]
pub struct OperationLog {
    pub repository_checks: usize,
    pub searches: Vec<String>,
    pub reads: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    repositories: Vec<String>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    folders: Vec<FixtureNode>,
    #[serde(default)]
    documents: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FixtureNode {
    path: String,
    #[serde(default)]
    properties: Vec<Property>,
}

/// Split `{repo}/{path}/{name}` into a result item
fn item_at(full_path: &str, item_type: &str, properties: Vec<Property>) -> ResultItem {
    let trimmed = full_path.trim_matches('/');
    let (repo, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    let (path, name) = rest.rsplit_once('/').unwrap_or((".", rest));
    ResultItem {
        repo: repo.to_string(),
        path: path.to_string(),
        name: name.to_string(),
        item_type: Some(item_type.to_string()),
        properties,
    }
}

/// AQL `$match` semantics: `*` is any sequence (including `/`), `?` any character
fn wildcard_match(pattern: &str, text: &str) -> Result<bool> {
    let compiled = glob::Pattern::new(pattern).map_err(|e| RepoError::InvalidUsage {
        message: format!("invalid search pattern '{}': {}", pattern, e),
    })?;
    Ok(compiled.matches(text))
}

impl MockServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON fixture
    pub fn from_fixture(json: &str) -> serde_json::Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        let mut mock = Self::new();
        for repository in fixture.repositories {
            mock = mock.with_repository(repository);
        }
        for path in fixture.files {
            mock = mock.with_item(item_at(&path, "file", vec![]));
        }
        for folder in fixture.folders {
            mock = mock.with_item(item_at(&folder.path, "folder", folder.properties));
        }
        for (path, document) in fixture.documents {
            let content = match document {
                serde_json::Value::String(text) => text.into_bytes(),
                other => serde_json::to_vec(&other)?,
            };
            mock = mock.with_file(path, content);
        }
        Ok(mock)
    }

    pub fn with_repository(self, name: impl Into<String>) -> Self {
        self.repositories.write().unwrap().insert(name.into());
        self
    }

    pub fn with_item(self, item: ResultItem) -> Self {
        self.items.write().unwrap().push(item);
        self
    }

    /// Document served by `read_remote_file`
    pub fn with_file(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Calls performed so far
    pub fn operations(&self) -> OperationLog {
        self.operations.read().unwrap().clone()
    }

    pub fn reset_operations(&self) {
        *self.operations.write().unwrap() = OperationLog::default();
    }

    fn matches(params: &SearchParams, item: &ResultItem) -> Result<bool> {
        let (repo, path, name) = split_pattern(&params.pattern)?;
        if item.repo != repo || !wildcard_match(name, &item.name)? {
            return Ok(false);
        }
        if !params.include_dirs && item.item_type.as_deref() == Some("folder") {
            return Ok(false);
        }
        let path_matches = wildcard_match(path, &item.path)?
            || (params.recursive && wildcard_match(&format!("{}/*", path), &item.path)?);
        Ok(path_matches)
    }
}

#[async_trait]
impl ArtifactoryServices for MockServices {
    async fn check_repository(&self, repository: &str) -> Result<()> {
        self.operations.write().unwrap().repository_checks += 1;
        if self.repositories.read().unwrap().contains(repository) {
            Ok(())
        } else {
            Err(RepoError::RepositoryNotFound {
                name: repository.to_string(),
            })
        }
    }

    async fn search_files(&self, params: &SearchParams) -> Result<Vec<ResultItem>> {
        self.operations
            .write()
            .unwrap()
            .searches
            .push(params.pattern.clone());

        let items = self.items.read().unwrap();
        let mut found = Vec::new();
        for item in items.iter() {
            if Self::matches(params, item)? {
                found.push(item.clone());
            }
        }
        Ok(found)
    }

    async fn read_remote_file(&self, path: &str) -> Result<Vec<u8>> {
        self.operations.write().unwrap().reads.push(path.to_string());
        self.documents
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| RepoError::RemoteFileNotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_match() {
        let matches = |pattern: &str, text: &str| wildcard_match(pattern, text).unwrap();
        assert!(matches("*", ""));
        assert!(matches("*/b2/*/*", "_/b2/4.0.0/_"));
        assert!(matches("conaninfo.txt", "conaninfo.txt"));
        assert!(matches("*.txt", "conaninfo.txt"));
        assert!(matches("a?c", "abc"));
        assert!(!matches("*/b2/*", "_/zlib/1.2.11"));
        assert!(!matches("a?c", "ac"));
        assert!(matches!(
            wildcard_match("[", "x"),
            Err(RepoError::InvalidUsage { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_and_read() {
        let mock = MockServices::from_fixture(
            r#"{
                "repositories": ["repo"],
                "files": [
                    "repo/_/b2/4.0.0/_/abc/export/conanfile.py",
                    "repo/_/zlib/1.2.11/_/def/export/conanfile.py"
                ],
                "folders": [{"path": "repo/_/b2/4.0.0/_/abc", "properties": [{"key": "k", "value": "v"}]}],
                "documents": {"repo/_/b2/4.0.0/_/index.json": {"revisions": []}}
            }"#,
        )
        .unwrap();

        mock.check_repository("repo").await.unwrap();
        assert!(mock.check_repository("other").await.is_err());

        let found = mock
            .search_files(&SearchParams::files("repo/*/b2/*/*/*/export/conanfile.py"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let nodes = mock
            .search_files(&SearchParams::node("repo/_/b2/4.0.0/_/abc"))
            .await
            .unwrap();
        assert_eq!(nodes[0].properties, vec![Property::new("k", "v")]);
        assert!(mock
            .search_files(&SearchParams::files("repo/_/b2/4.0.0/_/abc"))
            .await
            .unwrap()
            .is_empty());

        let index = mock
            .read_remote_file("repo/_/b2/4.0.0/_/index.json")
            .await
            .unwrap();
        assert_eq!(index, br#"{"revisions":[]}"#);

        let ops = mock.operations();
        assert_eq!(ops.repository_checks, 2);
        assert_eq!(ops.searches.len(), 3);
        assert_eq!(ops.reads, vec!["repo/_/b2/4.0.0/_/index.json"]);
    }

    #[tokio::test]
    async fn test_recursive_search() {
        let mock = MockServices::new()
            .with_item(item_at("repo/a/b/c/file.txt", "file", vec![]))
            .with_item(item_at("repo/a/file.txt", "file", vec![]));

        let flat = mock
            .search_files(&SearchParams::files("repo/a/file.txt"))
            .await
            .unwrap();
        assert_eq!(flat.len(), 1);

        let recursive = mock
            .search_files(&SearchParams {
                pattern: "repo/a/file.txt".to_string(),
                recursive: true,
                include_dirs: false,
            })
            .await
            .unwrap();
        assert_eq!(recursive.len(), 2);
    }
}
