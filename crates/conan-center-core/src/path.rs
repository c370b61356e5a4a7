//! Artifactory layout of a Conan repository
//!
//! ```text
//! {user|_}/{name}/{version}/{channel|_}/{rrev}/export/conanfile.py
//! {user|_}/{name}/{version}/{channel|_}/{rrev}/package/{pkgid}/{prev}/conaninfo.txt
//! ```
//!
//! Paths are relative to the repository root. Every layout has a fixed
//! number of segments, so parsing is a split plus per-segment validation.

use crate::error::{CoreError, Result};
use crate::package::{PACKAGE_FOLDER, Package};
use crate::reference::{PLACEHOLDER, Reference, UserChannel, check_revision, check_token};

/// Folder holding the exported recipe files
pub const EXPORT_FOLDER: &str = "export";

/// File that marks an exported recipe revision
pub const RECIPE_MARKER: &str = "conanfile.py";

/// File that marks a package revision
pub const PACKAGE_MARKER: &str = "conaninfo.txt";

/// Revision index stored next to every revisioned node
pub const INDEX_FILE: &str = "index.json";

fn invalid(path: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn split_exact<'a>(path: &'a str, expected: usize) -> Result<Vec<&'a str>> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.len() != expected {
        return Err(invalid(
            path,
            format!("expected {} segments, found {}", expected, segments.len()),
        ));
    }
    Ok(segments)
}

fn expect_segment(path: &str, found: &str, expected: &str) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(invalid(path, format!("expected '{expected}', found '{found}'")))
    }
}

/// Build a reference from the `{user}/{name}/{version}/{channel}` segments
fn reference_from_segments(
    path: &str,
    segments: &[&str],
    revision: Option<&str>,
) -> Result<Reference> {
    let [user, name, version, channel] = segments else {
        return Err(invalid(path, "expected user/name/version/channel"));
    };

    check_token("name", name)?;
    check_token("version", version)?;

    let user_channel = match (*user == PLACEHOLDER, *channel == PLACEHOLDER) {
        (true, true) => None,
        (false, false) => Some(UserChannel::new(*user, *channel)?),
        _ => return Err(invalid(path, "user and channel must be both set or both empty")),
    };

    if let Some(revision) = revision {
        check_revision("revision", revision)?;
    }

    Ok(Reference {
        name: name.to_string(),
        version: version.to_string(),
        user_channel,
        revision: revision.map(str::to_string),
    })
}

/// Parse `{user}/{name}/{version}/{channel}` or the same plus `/{rrev}`
pub fn parse_reference_path(path: &str) -> Result<Reference> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.len() {
        4 => reference_from_segments(path, &segments, None),
        5 => reference_from_segments(path, &segments[..4], Some(segments[4])),
        n => Err(invalid(path, format!("expected 4 or 5 segments, found {n}"))),
    }
}

/// Parse the path of an exported `conanfile.py`
pub fn parse_recipe_marker(path: &str) -> Result<Reference> {
    let segments = split_exact(path, 7)?;
    expect_segment(path, segments[5], EXPORT_FOLDER)?;
    expect_segment(path, segments[6], RECIPE_MARKER)?;
    reference_from_segments(path, &segments[..4], Some(segments[4]))
}

/// Parse the path of a package `conaninfo.txt`
pub fn parse_package_marker(path: &str) -> Result<Package> {
    let segments = split_exact(path, 9)?;
    expect_segment(path, segments[5], PACKAGE_FOLDER)?;
    expect_segment(path, segments[8], PACKAGE_MARKER)?;
    let reference = reference_from_segments(path, &segments[..4], Some(segments[4]))?;
    Package::new(reference, segments[6], segments[7])
}

/// `index.json` of a recipe: `{ref}/index.json`
pub fn recipe_index_path(reference: &Reference) -> String {
    format!("{}/{}", reference.rt_path(), INDEX_FILE)
}

/// `index.json` of a package id: `{ref}/{rrev}/package/{pkgid}/index.json`
pub fn package_index_path(package: &Package) -> String {
    format!("{}/{}", package.rt_path(false), INDEX_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe_marker() {
        let r = parse_recipe_marker("_/b2/4.0.0/_/3c07b6a54477e856d429493d01c85636/export/conanfile.py")
            .unwrap();
        assert_eq!(r.to_string(), "b2/4.0.0#3c07b6a54477e856d429493d01c85636");

        let r = parse_recipe_marker("conan/b2/4.0.0/stable/abc/export/conanfile.py").unwrap();
        assert_eq!(r.to_string(), "b2/4.0.0@conan/stable#abc");
    }

    #[test]
    fn test_parse_recipe_marker_rejects_bad_layout() {
        assert!(parse_recipe_marker("_/b2/4.0.0/_/abc/conanfile.py").is_err());
        assert!(parse_recipe_marker("_/b2/4.0.0/_/abc/export/conanmanifest.txt").is_err());
        assert!(parse_recipe_marker("_/b2/4.0.0/_/abc/package/conanfile.py").is_err());
        assert!(parse_recipe_marker("_/b2/4.0.0/_/ABC/export/conanfile.py").is_err());
    }

    #[test]
    fn test_half_placeholder_is_invalid() {
        let err = parse_recipe_marker("user/b2/4.0.0/_/abc/export/conanfile.py").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath { .. }));
        let err = parse_recipe_marker("_/b2/4.0.0/channel/abc/export/conanfile.py").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath { .. }));
    }

    #[test]
    fn test_parse_package_marker() {
        let pkg = parse_package_marker(
            "_/b2/4.3.0/_/ec8af29b790f5745890470ce4220ed50/package/46f53f156846659bf39ad6675fa0ee8156e859fe/anotherprev/conaninfo.txt",
        )
        .unwrap();
        assert_eq!(pkg.reference().to_string_with(false), "b2/4.3.0");
        assert_eq!(pkg.recipe_revision(), "ec8af29b790f5745890470ce4220ed50");
        assert_eq!(pkg.package_id(), "46f53f156846659bf39ad6675fa0ee8156e859fe");
        assert_eq!(pkg.revision(), "anotherprev");
    }

    #[test]
    fn test_parse_package_marker_rejects_bad_layout() {
        assert!(parse_package_marker("_/b2/4.3.0/_/rrev/package/pkgid/conaninfo.txt").is_err());
        assert!(parse_package_marker("_/b2/4.3.0/_/rrev/export/pkgid/prev/conaninfo.txt").is_err());
        assert!(parse_package_marker("_/b2/4.3.0/_/rrev/package/pkgid/prev/conanfile.py").is_err());
    }

    #[test]
    fn test_reference_path_round_trip() {
        for input in [
            "name/version",
            "name/version@user/channel",
            "lib_a+b/1.0.0-rc.1",
            "_x/1.0@my_user/my.channel",
        ] {
            let reference: Reference = input.parse().unwrap();
            let parsed = parse_reference_path(&reference.rt_path()).unwrap();
            assert_eq!(parsed.identity(), reference.identity());
            assert_eq!(parsed.to_string_with(false), input);
        }
    }

    #[test]
    fn test_reference_path_with_revision() {
        let r = parse_reference_path("user/name/version/channel/rrev").unwrap();
        assert_eq!(r.to_string(), "name/version@user/channel#rrev");
        assert!(parse_reference_path("name/version").is_err());
    }

    #[test]
    fn test_index_paths() {
        let reference: Reference = "b2/4.0.0#rrev".parse().unwrap();
        assert_eq!(recipe_index_path(&reference), "_/b2/4.0.0/_/index.json");
        let pkg = Package::new(reference, "pkgid", "prev").unwrap();
        assert_eq!(package_index_path(&pkg), "_/b2/4.0.0/_/rrev/package/pkgid/index.json");
    }
}
