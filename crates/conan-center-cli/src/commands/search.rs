//! Search command

use conan_center_core::{Package, Reference};
use conan_center_repo::{ArtifactoryServices, PackageQuery, search_packages, search_references};

use super::{ServerArgs, connect, open_repository};
use crate::error::Result;

/// Packages of references named `ref_name` (all references if `None`)
///
/// `only_latest` keeps the latest recipe revision and, within it, the
/// latest revision of each package id.
pub async fn find_packages<S>(
    services: &S,
    repository: &str,
    ref_name: Option<&str>,
    only_latest: bool,
) -> Result<Vec<Package>>
where
    S: ArtifactoryServices + ?Sized,
{
    let query = PackageQuery {
        name: ref_name.map(str::to_string),
        ..PackageQuery::default()
    }
    .latest(only_latest, only_latest);

    Ok(search_packages(services, repository, &query).await?)
}

/// Search references or packages in a repository
pub async fn run(
    server: &ServerArgs,
    repository: &str,
    ref_name: Option<&str>,
    packages: bool,
    only_latest: bool,
    json_output: bool,
) -> Result<()> {
    let client = connect(server)?;
    open_repository(&client, repository).await?;

    if packages {
        tracing::debug!("Retrieving packages (ref-name: {:?})", ref_name);
        let found = find_packages(&client, repository, ref_name, only_latest).await?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&found)?);
            return Ok(());
        }
        if !found.is_empty() {
            println!("Found {} packages:", found.len());
        }
        for package in &found {
            println!("{}", package);
        }
    } else {
        tracing::debug!("Retrieving recipes (ref-name: {:?})", ref_name);
        let found: Vec<Reference> =
            search_references(&client, repository, ref_name, only_latest).await?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&found)?);
            return Ok(());
        }
        for reference in &found {
            println!("{}", reference);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conan_center_repo::MockServices;

    const FIXTURE: &str = include_str!("../../../conan-center-repo/tests/fixtures/b2.json");

    #[tokio::test]
    async fn test_find_packages() {
        let services = MockServices::from_fixture(FIXTURE).unwrap();

        let all = find_packages(&services, "repository", Some("b2"), false)
            .await
            .unwrap();
        assert_eq!(all.len(), 25);

        services.reset_operations();
        let latest = find_packages(&services, "repository", Some("b2"), true)
            .await
            .unwrap();
        assert!(latest.len() < all.len());
        for package in &latest {
            assert_eq!(
                latest
                    .iter()
                    .filter(|p| p.reference().identity() == package.reference().identity()
                        && p.package_id() == package.package_id())
                    .count(),
                1
            );
        }
        assert!(!services.operations().reads.is_empty());
    }

    #[tokio::test]
    async fn test_json_shape() {
        let services = MockServices::from_fixture(FIXTURE).unwrap();
        let references = search_references(&services, "repository", Some("b2"), true)
            .await
            .unwrap();

        let json = serde_json::to_value(&references).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), references.len());
        assert!(entries.iter().all(|e| e["name"] == "b2"));
        assert!(entries.iter().any(|e| e["user"] == "conan" && e["channel"] == "stable"));
    }
}
