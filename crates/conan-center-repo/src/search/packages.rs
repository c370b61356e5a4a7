use std::collections::BTreeMap;

use conan_center_core::package::PACKAGE_FOLDER;
use conan_center_core::path::{PACKAGE_MARKER, package_index_path, parse_package_marker, recipe_index_path};
use conan_center_core::reference::is_valid_token;
use conan_center_core::{CoreError, Package, Reference, ReferenceIdentity};

use super::take_latest;
use crate::error::{RepoError, Result};
use crate::revisions::latest_revision;
use crate::services::{ArtifactoryServices, SearchParams};

/// Filters of a package search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageQuery {
    /// Only packages of references with this name
    pub name: Option<String>,
    /// Only packages of this reference (and recipe revision, if set)
    pub reference: Option<Reference>,
    /// Keep the latest recipe revision of each reference
    pub only_latest_recipe: bool,
    /// Keep the latest package revision of each package id
    pub only_latest_package: bool,
}

impl PackageQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn for_reference(reference: Reference) -> Self {
        Self {
            reference: Some(reference),
            ..Self::default()
        }
    }

    pub fn latest(mut self, recipe: bool, package: bool) -> Self {
        self.only_latest_recipe = recipe;
        self.only_latest_package = package;
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(name) = self.name.as_deref().filter(|n| !is_valid_token(n)) {
            return Err(CoreError::InvalidToken {
                field: "name",
                value: name.to_string(),
            }
            .into());
        }
        if let Some(reference) = &self.reference {
            if self.only_latest_recipe {
                return Err(RepoError::InvalidUsage {
                    message: format!(
                        "cannot ask for the latest recipe revision of an explicit reference '{}'",
                        reference
                    ),
                });
            }
            if let Some(name) = &self.name {
                if *name != reference.name {
                    return Err(RepoError::InvalidUsage {
                        message: format!(
                            "name '{}' does not match reference '{}'",
                            name, reference
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn pattern(&self, repository: &str) -> String {
        let prefix = match &self.reference {
            Some(reference) => format!(
                "{}/{}",
                reference.rt_path(),
                reference.revision().unwrap_or("*")
            ),
            None => format!("*/{}/*/*/*", self.name.as_deref().unwrap_or("*")),
        };
        format!(
            "{}/{}/{}/*/*/{}",
            repository, prefix, PACKAGE_FOLDER, PACKAGE_MARKER
        )
    }

    fn accepts(&self, package: &Package) -> bool {
        let found = package.reference();
        if let Some(name) = &self.name {
            if found.name != *name {
                return false;
            }
        }
        match &self.reference {
            Some(reference) => {
                found.identity() == reference.identity()
                    && reference
                        .revision()
                        .is_none_or(|revision| revision == package.recipe_revision())
            }
            None => true,
        }
    }
}

/// Packages stored in `repository` matching `query`
///
/// Results are grouped by reference, then recipe revision, then package id.
/// The two "latest" filters apply independently: the recipe filter keeps one
/// recipe revision per reference, the package filter one package revision
/// per package id. A group with a single candidate never reads its index.
pub async fn search_packages<S>(
    services: &S,
    repository: &str,
    query: &PackageQuery,
) -> Result<Vec<Package>>
where
    S: ArtifactoryServices + ?Sized,
{
    query.validate()?;

    let pattern = query.pattern(repository);
    tracing::debug!("Searching packages: {}", pattern);
    let items = services.search_files(&SearchParams::files(pattern)).await?;

    let mut grouped: BTreeMap<ReferenceIdentity, BTreeMap<String, Vec<Package>>> = BTreeMap::new();
    for item in &items {
        let path = item.relative_path();
        let package = parse_package_marker(&path)?;
        if !query.accepts(&package) {
            return Err(RepoError::UnexpectedSearchResult {
                path,
                reason: "package does not belong to the requested reference".to_string(),
            });
        }

        grouped
            .entry(package.reference().identity())
            .or_default()
            .entry(package.recipe_revision().to_string())
            .or_default()
            .push(package);
    }

    let mut packages = Vec::new();
    for (identity, mut recipe_groups) in grouped {
        if query.only_latest_recipe && recipe_groups.len() > 1 {
            let index_path = format!("{}/{}", repository, recipe_index_path(&identity.to_reference()));
            let latest = latest_revision(services, &index_path).await?;
            let group = recipe_groups.remove(&latest.revision).ok_or_else(|| {
                RepoError::InconsistentRevision {
                    node: identity.to_string(),
                    revision: latest.revision.clone(),
                }
            })?;
            recipe_groups = BTreeMap::from([(latest.revision, group)]);
        }

        for candidates in recipe_groups.into_values() {
            packages.extend(select_packages(services, repository, candidates, query).await?);
        }
    }

    tracing::info!("Found {} packages", packages.len());
    Ok(packages)
}

/// Stage two: one recipe revision, grouped by package id
async fn select_packages<S>(
    services: &S,
    repository: &str,
    candidates: Vec<Package>,
    query: &PackageQuery,
) -> Result<Vec<Package>>
where
    S: ArtifactoryServices + ?Sized,
{
    let mut by_id: BTreeMap<String, Vec<Package>> = BTreeMap::new();
    for package in candidates {
        let revisions = by_id.entry(package.package_id().to_string()).or_default();
        if !revisions.contains(&package) {
            revisions.push(package);
        }
    }

    let mut selected = Vec::new();
    for mut revisions in by_id.into_values() {
        if !query.only_latest_package || revisions.len() == 1 {
            selected.append(&mut revisions);
            continue;
        }

        let first = &revisions[0];
        let node = format!("{}:{}", first.reference(), first.package_id());
        let index_path = format!("{}/{}", repository, package_index_path(first));
        let latest = latest_revision(services, &index_path).await?;
        selected.push(take_latest(revisions, &latest.revision, || node, |p| p.revision())?);
    }
    Ok(selected)
}

/// All packages of a resolved reference
pub async fn list_reference_packages<S>(
    services: &S,
    repository: &str,
    reference: &Reference,
) -> Result<Vec<Package>>
where
    S: ArtifactoryServices + ?Sized,
{
    if !reference.is_resolved() {
        return Err(CoreError::UnresolvedRevision {
            reference: reference.to_string_with(false),
        }
        .into());
    }
    search_packages(services, repository, &PackageQuery::for_reference(reference.clone())).await
}
