//! Reference and package search
//!
//! Both searches list marker files (`conanfile.py` for recipes,
//! `conaninfo.txt` for packages), rebuild identities from their paths and
//! optionally keep only the latest revision according to the `index.json`
//! documents. Grouping tables are local to each call.

mod packages;
mod references;

pub use packages::{PackageQuery, list_reference_packages, search_packages};
pub use references::search_references;

use crate::error::{RepoError, Result};

/// Take the candidate whose revision is `latest`
///
/// The index is authoritative: a latest revision that the search did not
/// discover means the repository and its index disagree.
pub(crate) fn take_latest<T>(
    candidates: Vec<T>,
    latest: &str,
    node: impl FnOnce() -> String,
    revision_of: impl Fn(&T) -> &str,
) -> Result<T> {
    candidates
        .into_iter()
        .find(|candidate| revision_of(candidate) == latest)
        .ok_or_else(|| RepoError::InconsistentRevision {
            node: node(),
            revision: latest.to_string(),
        })
}
