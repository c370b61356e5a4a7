//! Revision resolution from remote `index.json` documents

use conan_center_core::path::recipe_index_path;
use conan_center_core::{CoreError, Reference, RevisionIndex, RevisionRecord};

use crate::error::{RepoError, Result};
use crate::services::ArtifactoryServices;

/// Read the index at `{repo}/{path}` and return its revisions, oldest first
pub async fn parse_revisions<S>(services: &S, index_path: &str) -> Result<Vec<RevisionRecord>>
where
    S: ArtifactoryServices + ?Sized,
{
    tracing::debug!("Reading revision index {}", index_path);
    let content = services.read_remote_file(index_path).await?;

    let index = RevisionIndex::from_slice(&content).map_err(|e| RepoError::IndexParseError {
        path: index_path.to_string(),
        message: match e {
            CoreError::IndexParse(inner) => inner.to_string(),
            other => other.to_string(),
        },
    })?;
    Ok(index.into_sorted())
}

/// Revision with the greatest timestamp in the index at `index_path`
pub async fn latest_revision<S>(services: &S, index_path: &str) -> Result<RevisionRecord>
where
    S: ArtifactoryServices + ?Sized,
{
    parse_revisions(services, index_path)
        .await?
        .pop()
        .ok_or_else(|| RepoError::NoRevisions {
            path: index_path.to_string(),
        })
}

/// The reference itself if it carries a revision, else its latest revision
pub async fn resolve_reference<S>(
    services: &S,
    repository: &str,
    reference: &Reference,
) -> Result<Reference>
where
    S: ArtifactoryServices + ?Sized,
{
    if reference.is_resolved() {
        return Ok(reference.clone());
    }
    let index_path = format!("{}/{}", repository, recipe_index_path(reference));
    let latest = latest_revision(services, &index_path).await?;
    tracing::debug!(
        "Latest revision of {} is {}",
        reference.to_string_with(false),
        latest.revision
    );
    Ok(reference.clone().with_revision(latest.revision)?)
}
