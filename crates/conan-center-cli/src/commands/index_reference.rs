//! Index-reference command

use conan_center_core::Reference;
use conan_center_repo::{
    ArtifactoryServices, IndexData, IndexPackage, list_reference_packages,
    read_package_properties, read_reference_properties, resolve_reference,
};

use super::{ServerArgs, connect, open_repository, parse_reference};
use crate::error::Result;

/// Indexer document of a resolved reference and all its packages
pub async fn build<S>(
    services: &S,
    repository: &str,
    reference: &Reference,
    force: bool,
) -> Result<IndexData>
where
    S: ArtifactoryServices + ?Sized,
{
    let properties = read_reference_properties(services, repository, reference).await?;
    let mut data = IndexData::from_properties(reference, &properties);
    data.set_force(force);

    for package in list_reference_packages(services, repository, reference).await? {
        let properties = read_package_properties(services, repository, &package).await?;
        data.add_package(IndexPackage::from_properties(&package, &properties));
    }
    tracing::debug!("{} packages indexed", data.packages.len());

    Ok(data)
}

/// Print the indexer document of a reference as JSON
pub async fn run(server: &ServerArgs, repository: &str, reference: &str, force: bool) -> Result<()> {
    let reference = parse_reference(reference)?;

    let client = connect(server)?;
    open_repository(&client, repository).await?;

    let reference = resolve_reference(&client, repository, &reference).await?;
    tracing::info!("Working reference: {}", reference);

    let data = build(&client, repository, &reference, force).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);

    Ok(())
}
