//! Conan references
//!
//! A reference identifies a recipe: `name/version[@user/channel][#revision]`.
//! Inside Artifactory the same reference lives under
//! `{user|_}/{name}/{version}/{channel|_}/{revision}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Path segment used by Artifactory for a missing user or channel
pub const PLACEHOLDER: &str = "_";

const TOKEN: &str = r"[a-zA-Z0-9_][a-zA-Z0-9_+.\-]*";

static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<name>{TOKEN})/(?P<version>{TOKEN})(?:@(?P<user>{TOKEN})/(?P<channel>{TOKEN}))?(?:#(?P<revision>[a-z0-9]+))?$"
    ))
    .expect("valid regex")
});

/// Check a name, version, user or channel token
pub fn is_valid_token(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-'))
}

/// Check a recipe revision, package id or package revision
pub fn is_valid_revision(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

pub(crate) fn check_token(field: &'static str, value: &str) -> Result<()> {
    if is_valid_token(value) {
        Ok(())
    } else {
        Err(CoreError::InvalidToken {
            field,
            value: value.to_string(),
        })
    }
}

pub(crate) fn check_revision(field: &'static str, value: &str) -> Result<()> {
    if is_valid_revision(value) {
        Ok(())
    } else {
        Err(CoreError::InvalidToken {
            field,
            value: value.to_string(),
        })
    }
}

/// Optional namespace of a reference. Both parts are always present together,
/// and neither is the `_` placeholder that stands for "no namespace".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UserChannel {
    pub user: String,
    pub channel: String,
}

impl UserChannel {
    pub fn new(user: impl Into<String>, channel: impl Into<String>) -> Result<Self> {
        let user = user.into();
        let channel = channel.into();
        check_token("user", &user)?;
        check_token("channel", &channel)?;
        for (field, value) in [("user", &user), ("channel", &channel)] {
            if value == PLACEHOLDER {
                return Err(CoreError::InvalidToken {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(Self { user, channel })
    }
}

/// A Conan reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub user_channel: Option<UserChannel>,
    /// `None` until resolved against the revision index
    pub revision: Option<String>,
}

impl Reference {
    /// Create a reference without namespace nor revision
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let version = version.into();
        check_token("name", &name)?;
        check_token("version", &version)?;
        Ok(Self {
            name,
            version,
            user_channel: None,
            revision: None,
        })
    }

    /// Set the user/channel namespace
    pub fn with_user_channel(
        mut self,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Result<Self> {
        self.user_channel = Some(UserChannel::new(user, channel)?);
        Ok(self)
    }

    /// Set the recipe revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Result<Self> {
        let revision = revision.into();
        check_revision("revision", &revision)?;
        self.revision = Some(revision);
        Ok(self)
    }

    pub fn user(&self) -> Option<&str> {
        self.user_channel.as_ref().map(|uc| uc.user.as_str())
    }

    pub fn channel(&self) -> Option<&str> {
        self.user_channel.as_ref().map(|uc| uc.channel.as_str())
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.revision.is_some()
    }

    /// String form, with or without the `#revision` suffix.
    ///
    /// An unresolved reference asked for its revision ends with a bare `#`.
    pub fn to_string_with(&self, with_revision: bool) -> String {
        let mut s = format!("{}/{}", self.name, self.version);
        if let Some(uc) = &self.user_channel {
            s.push('@');
            s.push_str(&uc.user);
            s.push('/');
            s.push_str(&uc.channel);
        }
        if with_revision {
            s.push('#');
            s.push_str(self.revision.as_deref().unwrap_or_default());
        }
        s
    }

    /// Artifactory path without revision: `{user|_}/{name}/{version}/{channel|_}`
    pub fn rt_path(&self) -> String {
        let (user, channel) = match &self.user_channel {
            Some(uc) => (uc.user.as_str(), uc.channel.as_str()),
            None => (PLACEHOLDER, PLACEHOLDER),
        };
        [user, &self.name, &self.version, channel].join("/")
    }

    /// Artifactory path including the recipe revision
    pub fn revision_rt_path(&self) -> Result<String> {
        let revision = self
            .revision
            .as_deref()
            .ok_or_else(|| CoreError::UnresolvedRevision {
                reference: self.to_string_with(false),
            })?;
        Ok(format!("{}/{}", self.rt_path(), revision))
    }

    /// Identity of the reference ignoring its revision
    pub fn identity(&self) -> ReferenceIdentity {
        ReferenceIdentity {
            name: self.name.clone(),
            version: self.version.clone(),
            user_channel: self.user_channel.clone(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(true))
    }
}

impl FromStr for Reference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = REFERENCE_PATTERN
            .captures(s)
            .ok_or_else(|| CoreError::InvalidReference {
                input: s.to_string(),
            })?;

        let user_channel = match (caps.name("user"), caps.name("channel")) {
            // `@_/_` is the explicit spelling of "no namespace"
            (Some(user), Some(channel))
                if user.as_str() == PLACEHOLDER && channel.as_str() == PLACEHOLDER =>
            {
                None
            }
            (Some(user), Some(channel))
                if user.as_str() != PLACEHOLDER && channel.as_str() != PLACEHOLDER =>
            {
                Some(UserChannel {
                    user: user.as_str().to_string(),
                    channel: channel.as_str().to_string(),
                })
            }
            (None, None) => None,
            _ => {
                return Err(CoreError::InvalidReference {
                    input: s.to_string(),
                });
            }
        };

        Ok(Self {
            name: caps["name"].to_string(),
            version: caps["version"].to_string(),
            user_channel,
            revision: caps.name("revision").map(|m| m.as_str().to_string()),
        })
    }
}

/// Grouping key: name, version and namespace of a reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceIdentity {
    pub name: String,
    pub version: String,
    pub user_channel: Option<UserChannel>,
}

impl ReferenceIdentity {
    /// Unresolved reference for this identity
    pub fn to_reference(&self) -> Reference {
        Reference {
            name: self.name.clone(),
            version: self.version.clone(),
            user_channel: self.user_channel.clone(),
            revision: None,
        }
    }

    pub fn rt_path(&self) -> String {
        self.to_reference().rt_path()
    }
}

impl fmt::Display for ReferenceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_reference().to_string_with(false))
    }
}
