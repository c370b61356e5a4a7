//! conan-center repository access
//!
//! This crate talks to a JFrog Artifactory server hosting a Conan
//! repository:
//!
//! - **Services**: the [`ArtifactoryServices`] seam (search by pattern, read
//!   a file, check a repository) with an HTTP implementation speaking AQL
//! - **Search**: references and packages rebuilt from marker files, with
//!   "latest revision" filters driven by the `index.json` documents
//! - **Properties**: metadata attached to reference and package nodes
//! - **Indexer**: the ConanCenter indexer payload built from those properties
//! - **Configuration**: configured servers and their credentials
//!
//! ## Example
//!
//! ```rust,no_run
//! use conan_center_repo::{ArtifactoryClient, ArtifactoryServices, Server, search_references};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::new("main", "https://example.jfrog.io/artifactory")?;
//! let client = ArtifactoryClient::public(server)?;
//!
//! client.check_repository("conan-center").await?;
//! for reference in search_references(&client, "conan-center", Some("zlib"), true).await? {
//!     println!("{}", reference);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Notes
//!
//! - Credentials are NEVER sent after cross-origin redirects
//! - The credential store is written readable by its owner only

pub mod aql;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod indexer;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod properties;
pub mod revisions;
pub mod search;
pub mod services;

pub use client::ArtifactoryClient;
pub use config::{Server, ServerConfig};
pub use credentials::{
    CredentialStore, Credentials, ResolvedCredentials, ScopedCredentials, SecureHttpClient,
};
pub use error::{RepoError, Result};
pub use indexer::{IndexData, IndexPackage};
#[cfg(any(test, feature = "testing"))]
pub use mock::MockServices;
pub use properties::{read_package_properties, read_reference_properties};
pub use revisions::{latest_revision, parse_revisions, resolve_reference};
pub use search::{PackageQuery, list_reference_packages, search_packages, search_references};
pub use services::{ArtifactoryServices, Property, ResultItem, SearchParams};
