//! conan-center core - Conan identities as stored in Artifactory
//!
//! This crate provides the value types shared by the rest of the workspace:
//! - `Reference`: a recipe, `name/version[@user/channel][#revision]`
//! - `Package`: one binary configuration of a reference and its revision
//! - `RevisionIndex`: the `index.json` documents listing revisions by time
//! - `path`: the Artifactory folder layout used by Conan repositories

pub mod error;
pub mod package;
pub mod path;
pub mod reference;
pub mod revision;

pub use error::{CoreError, Result};
pub use package::Package;
pub use reference::{PLACEHOLDER, Reference, ReferenceIdentity, UserChannel};
pub use revision::{RevisionIndex, RevisionRecord, format_timestamp, parse_timestamp};
