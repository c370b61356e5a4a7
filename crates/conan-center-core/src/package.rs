//! Conan binary packages
//!
//! A package is one built configuration (package id) of a resolved
//! reference, together with the revision of that build.

use serde::Serialize;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::reference::{Reference, check_revision};

/// Folder that separates the recipe revision from the package ids
pub const PACKAGE_FOLDER: &str = "package";

/// A Conan package: reference, package id and package revision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Package {
    reference: Reference,
    package_id: String,
    revision: String,
}

impl Package {
    /// Create a package. The reference must carry a recipe revision.
    pub fn new(
        reference: Reference,
        package_id: impl Into<String>,
        revision: impl Into<String>,
    ) -> Result<Self> {
        if !reference.is_resolved() {
            return Err(CoreError::UnresolvedRevision {
                reference: reference.to_string_with(false),
            });
        }
        let package_id = package_id.into();
        let revision = revision.into();
        check_revision("package id", &package_id)?;
        check_revision("package revision", &revision)?;
        Ok(Self {
            reference,
            package_id,
            revision,
        })
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn recipe_revision(&self) -> &str {
        self.reference.revision().unwrap_or_default()
    }

    /// `name/version[@user/channel][#rrev]:package_id[#prev]`
    pub fn to_string_with(&self, with_revision: bool) -> String {
        let mut s = format!(
            "{}:{}",
            self.reference.to_string_with(with_revision),
            self.package_id
        );
        if with_revision {
            s.push('#');
            s.push_str(&self.revision);
        }
        s
    }

    /// Artifactory path of the package.
    ///
    /// The recipe revision is always part of the path; `with_revision`
    /// controls only the trailing package revision.
    pub fn rt_path(&self, with_revision: bool) -> String {
        let mut segments = vec![
            self.reference.rt_path(),
            self.recipe_revision().to_string(),
            PACKAGE_FOLDER.to_string(),
            self.package_id.clone(),
        ];
        if with_revision {
            segments.push(self.revision.clone());
        }
        segments.join("/")
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(true))
    }
}
