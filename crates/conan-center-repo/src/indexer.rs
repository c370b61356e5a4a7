//! ConanCenter indexer payload
//!
//! The indexer receives one JSON document per recipe revision with the
//! recipe metadata and the settings of every package built from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use conan_center_core::{PLACEHOLDER, Package, Reference};

use crate::services::Property;

const PACKAGE_PROPERTY_PREFIX: &str = "conan.package.";
const SETTINGS_PROPERTY_PREFIX: &str = "conan.settings.";

/// One package id of an [`IndexData`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPackage {
    pub package_id: String,
    pub version: String,
    pub package_revision: String,
    pub settings: BTreeMap<String, String>,
    pub requires: Vec<String>,
}

impl IndexPackage {
    pub fn new(package: &Package) -> Self {
        Self {
            package_id: package.package_id().to_string(),
            version: package.reference().version.clone(),
            package_revision: package.revision().to_string(),
            ..Self::default()
        }
    }

    /// Record a setting; `compiler.version` is stored as `compiler_version`
    pub fn add_setting(&mut self, key: &str, value: impl Into<String>) {
        self.settings.insert(key.replace('.', "_"), value.into());
    }

    /// Package entry with the settings found in `conan.settings.*` properties
    pub fn from_properties(package: &Package, properties: &[Property]) -> Self {
        let mut entry = Self::new(package);
        for property in properties {
            if let Some(key) = property.key.strip_prefix(SETTINGS_PROPERTY_PREFIX) {
                entry.add_setting(key, property.value.as_str());
            }
        }
        entry
    }
}

/// Document sent to the indexer for one recipe revision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexData {
    pub user: String,
    pub channel: String,
    pub recipe_revision: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub homepage: String,
    #[serde(rename = "giturl", default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topics: String,

    pub requires: Vec<String>,
    pub packages: Vec<IndexPackage>,

    pub force: bool,
    pub force_requires: bool,
    pub force_settings: bool,
}

impl IndexData {
    pub fn new(reference: &Reference) -> Self {
        Self {
            user: reference.user().unwrap_or(PLACEHOLDER).to_string(),
            channel: reference.channel().unwrap_or(PLACEHOLDER).to_string(),
            recipe_revision: reference.revision().unwrap_or_default().to_string(),
            name: reference.name.clone(),
            version: reference.version.clone(),
            ..Self::default()
        }
    }

    /// Recipe metadata from `conan.package.<field>` or plain `<field>` properties
    ///
    /// The first value of a field wins, except `topics` whose values are
    /// joined with commas.
    pub fn from_properties(reference: &Reference, properties: &[Property]) -> Self {
        let mut data = Self::new(reference);
        let mut topics: Vec<&str> = Vec::new();

        for property in properties {
            let field = property
                .key
                .strip_prefix(PACKAGE_PROPERTY_PREFIX)
                .unwrap_or(&property.key);
            let value = property.value.as_str();
            let slot = match field {
                "description" => &mut data.description,
                "license" => &mut data.license,
                "homepage" => &mut data.homepage,
                "url" => &mut data.url,
                "topics" => {
                    topics.extend(value.split(',').map(str::trim).filter(|t| !t.is_empty()));
                    continue;
                }
                _ => continue,
            };
            if slot.is_empty() {
                *slot = value.to_string();
            }
        }

        data.topics = topics.join(",");
        data
    }

    /// Set `force` and the flags that derive from it
    pub fn set_force(&mut self, value: bool) {
        self.force = value;
        self.force_requires = value;
        self.force_settings = value;
    }

    pub fn add_package(&mut self, package: IndexPackage) {
        self.packages.push(package);
    }
}
