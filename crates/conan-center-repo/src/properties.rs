//! Properties attached to reference and package nodes

use conan_center_core::{Package, Reference};

use crate::error::{RepoError, Result};
use crate::services::{ArtifactoryServices, Property, SearchParams};

/// Properties of the recipe revision folder `{ref}/{rrev}`
pub async fn read_reference_properties<S>(
    services: &S,
    repository: &str,
    reference: &Reference,
) -> Result<Vec<Property>>
where
    S: ArtifactoryServices + ?Sized,
{
    let path = reference.revision_rt_path()?;
    read_node_properties(services, repository, "reference", path).await
}

/// Properties of the package revision folder `{ref}/{rrev}/package/{id}/{prev}`
pub async fn read_package_properties<S>(
    services: &S,
    repository: &str,
    package: &Package,
) -> Result<Vec<Property>>
where
    S: ArtifactoryServices + ?Sized,
{
    read_node_properties(services, repository, "package", package.rt_path(true)).await
}

async fn read_node_properties<S>(
    services: &S,
    repository: &str,
    kind: &'static str,
    path: String,
) -> Result<Vec<Property>>
where
    S: ArtifactoryServices + ?Sized,
{
    let params = SearchParams::node(format!("{}/{}", repository, path));
    let items = services.search_files(&params).await?;
    items
        .into_iter()
        .next()
        .map(|item| item.properties)
        .ok_or(RepoError::PropertiesNotFound { kind, path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServices;

    const FIXTURE: &str = include_str!("../tests/fixtures/properties.json");

    #[tokio::test]
    async fn test_reference_properties_in_order() {
        let services = MockServices::from_fixture(FIXTURE).unwrap();
        let reference: Reference = "name/version#rrev".parse().unwrap();

        let properties = read_reference_properties(&services, "repository", &reference)
            .await
            .unwrap();
        let expected: Vec<Property> = [
            ("conan.package.name", "name"),
            ("conan.package.version", "version"),
            ("conan.package.user", "_"),
            ("conan.package.channel", "_"),
            ("conan.package.description", "A library to test properties"),
            ("conan.package.license", "MIT"),
            ("conan.package.homepage", "https://example.com/name"),
            ("conan.package.url", "https://github.com/conan-io/conan-center-index"),
            ("conan.package.topics", "conan"),
            ("conan.package.topics", "testing"),
            ("conan.package.topics", "properties"),
            ("conan.package.deprecated", "false"),
            ("conan.recipe.revision", "rrev"),
            ("conan.recipe.exported", "2020-09-16T14:05:05.965+0000"),
            ("build.name", "conan-center-index"),
            ("build.number", "4521"),
            ("build.timestamp", "1600265105965"),
        ]
        .into_iter()
        .map(|(key, value)| Property::new(key, value))
        .collect();
        assert_eq!(properties.len(), 17);
        assert_eq!(properties, expected);
    }

    #[tokio::test]
    async fn test_reference_properties_not_found() {
        let services = MockServices::from_fixture(FIXTURE).unwrap();
        let reference: Reference = "other/version#rrev".parse().unwrap();

        let err = read_reference_properties(&services, "repository", &reference)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Properties for reference '_/other/version/_/rrev' not found"
        );
    }

    #[tokio::test]
    async fn test_unresolved_reference() {
        let services = MockServices::from_fixture(FIXTURE).unwrap();
        let reference: Reference = "name/version".parse().unwrap();
        assert!(read_reference_properties(&services, "repository", &reference)
            .await
            .is_err());
        assert!(services.operations().searches.is_empty());
    }

    #[tokio::test]
    async fn test_package_properties() {
        let services = MockServices::from_fixture(FIXTURE).unwrap();
        let reference: Reference = "name/version#rrev".parse().unwrap();
        let package = Package::new(reference.clone(), "pkgid", "prev").unwrap();

        let properties = read_package_properties(&services, "repository", &package)
            .await
            .unwrap();
        assert_eq!(properties.len(), 7);
        assert_eq!(
            services.operations().searches,
            vec!["repository/_/name/version/_/rrev/package/pkgid/prev"]
        );

        let missing = Package::new(reference, "pkgid", "other").unwrap();
        let err = read_package_properties(&services, "repository", &missing)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Properties for package '_/name/version/_/rrev/package/pkgid/other' not found"
        );
    }
}
