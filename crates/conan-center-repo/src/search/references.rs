use std::collections::BTreeMap;

use conan_center_core::path::{EXPORT_FOLDER, RECIPE_MARKER, parse_recipe_marker, recipe_index_path};
use conan_center_core::reference::is_valid_token;
use conan_center_core::{CoreError, Reference, ReferenceIdentity};

use super::take_latest;
use crate::error::{RepoError, Result};
use crate::revisions::latest_revision;
use crate::services::{ArtifactoryServices, SearchParams};

/// References stored in `repository`, optionally only those named `name`
///
/// Without `only_latest` every recipe revision found is returned. With it,
/// each reference is reduced to the revision its index lists as latest; a
/// reference with a single revision is returned without reading the index.
pub async fn search_references<S>(
    services: &S,
    repository: &str,
    name: Option<&str>,
    only_latest: bool,
) -> Result<Vec<Reference>>
where
    S: ArtifactoryServices + ?Sized,
{
    if let Some(name) = name.filter(|n| !is_valid_token(n)) {
        return Err(CoreError::InvalidToken {
            field: "name",
            value: name.to_string(),
        }
        .into());
    }

    let pattern = format!(
        "{}/*/{}/*/*/*/{}/{}",
        repository,
        name.unwrap_or("*"),
        EXPORT_FOLDER,
        RECIPE_MARKER
    );
    tracing::debug!("Searching references: {}", pattern);
    let items = services.search_files(&SearchParams::files(pattern)).await?;

    let mut grouped: BTreeMap<ReferenceIdentity, Vec<Reference>> = BTreeMap::new();
    for item in &items {
        let path = item.relative_path();
        let reference = parse_recipe_marker(&path)?;
        if let Some(name) = name {
            if reference.name != name {
                return Err(RepoError::UnexpectedSearchResult {
                    path,
                    reason: format!("expected a reference named '{}'", name),
                });
            }
        }

        let revisions = grouped.entry(reference.identity()).or_default();
        if !revisions.contains(&reference) {
            revisions.push(reference);
        }
    }

    if !only_latest {
        let references: Vec<Reference> = grouped.into_values().flatten().collect();
        tracing::info!("Found {} references", references.len());
        return Ok(references);
    }

    let mut references = Vec::with_capacity(grouped.len());
    for (identity, mut candidates) in grouped {
        if candidates.len() == 1 {
            references.append(&mut candidates);
            continue;
        }

        let index_path = format!("{}/{}", repository, recipe_index_path(&identity.to_reference()));
        let latest = latest_revision(services, &index_path).await?;
        references.push(take_latest(
            candidates,
            &latest.revision,
            || identity.to_string(),
            |r| r.revision().unwrap_or_default(),
        )?);
    }
    tracing::info!("Found {} references", references.len());
    Ok(references)
}
