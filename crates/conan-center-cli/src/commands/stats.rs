//! Stats command

use console::style;

use conan_center_core::Reference;
use conan_center_repo::{ArtifactoryServices, list_reference_packages, search_references};

use super::{ServerArgs, connect, open_repository};
use crate::error::Result;

/// Every recipe revision found and its number of packages
pub async fn collect<S>(
    services: &S,
    repository: &str,
    ref_name: Option<&str>,
) -> Result<Vec<(Reference, usize)>>
where
    S: ArtifactoryServices + ?Sized,
{
    let references = search_references(services, repository, ref_name, false).await?;

    let mut stats = Vec::with_capacity(references.len());
    for reference in references {
        let packages = list_reference_packages(services, repository, &reference).await?;
        stats.push((reference, packages.len()));
    }
    Ok(stats)
}

/// Print the number of packages of every reference
pub async fn run(server: &ServerArgs, repository: &str, ref_name: Option<&str>) -> Result<()> {
    let client = connect(server)?;
    open_repository(&client, repository).await?;

    let stats = collect(&client, repository, ref_name).await?;

    println!(
        "Found {} Conan references",
        style(stats.len()).bold()
    );
    let mut total = 0;
    for (reference, count) in &stats {
        println!(" - {}: {} packages", style(reference).cyan(), count);
        total += count;
    }
    println!("Total found {} packages", style(total).bold());

    Ok(())
}
