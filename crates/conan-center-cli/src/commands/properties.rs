//! Properties command

use console::style;

use conan_center_repo::{
    Property, list_reference_packages, read_package_properties, read_reference_properties,
    resolve_reference,
};

use super::{ServerArgs, connect, open_repository, parse_reference};
use crate::error::Result;

fn print_properties(title: &str, properties: &[Property]) {
    println!("{}:", style(title).bold());
    for property in properties {
        println!("  {}: {}", property.key, property.value);
    }
}

/// Print the properties of a reference, and optionally of its packages
pub async fn run(
    server: &ServerArgs,
    repository: &str,
    reference: &str,
    packages: bool,
) -> Result<()> {
    let reference = parse_reference(reference)?;

    let client = connect(server)?;
    open_repository(&client, repository).await?;

    let reference = resolve_reference(&client, repository, &reference).await?;
    tracing::info!("Working reference: {}", reference);

    let properties = read_reference_properties(&client, repository, &reference).await?;
    print_properties(&format!("Reference '{}'", reference), &properties);

    if packages {
        for package in list_reference_packages(&client, repository, &reference).await? {
            let properties = read_package_properties(&client, repository, &package).await?;
            print_properties(&format!("Package '{}'", package), &properties);
        }
    }

    Ok(())
}
