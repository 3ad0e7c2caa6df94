// SPDX-License-Identifier: Apache-2.0

//! Canonical test identity.
//!
//! Both the assertion graph and the dashboard address a test through the
//! same [`CanonicalId`], so the derivation here must never depend on anything
//! but the declaring group and the method name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Conventional suffix carried by group (test class) names.
pub const GROUP_SUFFIX: &str = "Test";
/// Conventional prefix carried by test method names.
pub const METHOD_PREFIX: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Parses an id that was written out by a previous derivation, for
    /// example an explicit coverage reference in a catalog file.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let raw = value.trim();
        if raw.is_empty() {
            return Err(Error::InvalidIdentifier {
                kind: "canonical id",
                value: value.clone(),
                reason: "must not be empty",
            });
        }
        let Some((group, method)) = raw.split_once('-') else {
            return Err(Error::InvalidIdentifier {
                kind: "canonical id",
                value: raw.to_string(),
                reason: "expected <group>-<method>",
            });
        };
        if group.is_empty() || method.is_empty() {
            return Err(Error::InvalidIdentifier {
                kind: "canonical id",
                value: raw.to_string(),
                reason: "group and method parts must not be empty",
            });
        }
        if !raw.chars().all(is_id_char) {
            return Err(Error::InvalidIdentifier {
                kind: "canonical id",
                value: raw.to_string(),
                reason: "must contain only [A-Za-z0-9_-]",
            });
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fragment identifier used by the dashboard.
    #[must_use]
    pub fn anchor(&self) -> &str {
        &self.0
    }

    /// Subject IRI used by the assertion graph.
    #[must_use]
    pub fn iri(&self, namespace: &str) -> String {
        format!("{namespace}{}", self.0)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Last segment of a `.` or `::` qualified group name.
#[must_use]
pub fn group_simple_name(group: &str) -> &str {
    let trimmed = group.trim();
    trimmed
        .rsplit(|c: char| c == '.' || c == ':')
        .find(|segment| !segment.is_empty())
        .unwrap_or(trimmed)
}

/// Group part of a canonical id: the simple name without the `Test` suffix.
#[must_use]
pub fn group_stem(group: &str) -> &str {
    let simple = group_simple_name(group);
    simple
        .strip_suffix(GROUP_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(simple)
}

/// Method part of a canonical id: the method name without the `test` prefix.
#[must_use]
pub fn method_stem(method: &str) -> &str {
    let trimmed = method.trim();
    trimmed
        .strip_prefix(METHOD_PREFIX)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(trimmed)
}

/// Derives the canonical id of a test from its declaring group and method.
///
/// Total and deterministic: `("org.example.GroupATest", "testFoo")` and
/// `("GroupA", "Foo")` both yield `GroupA-Foo`. A suffix or prefix that would
/// leave an empty stem is kept.
#[must_use]
pub fn canonical_id(group: &str, method: &str) -> CanonicalId {
    CanonicalId(format!("{}-{}", group_stem(group), method_stem(method)))
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalId> for String {
    fn from(value: CanonicalId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CanonicalId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for CanonicalId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl FromStr for CanonicalId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_conventional_suffix_and_prefix() {
        assert_eq!(canonical_id("GroupATest", "testFoo").as_str(), "GroupA-Foo");
        assert_eq!(
            canonical_id("org.w3.ldp.BasicContainerTest", "testPostResource").as_str(),
            "BasicContainer-PostResource"
        );
        assert_eq!(canonical_id("crate::RdfSourceTest", "testEtag").as_str(), "RdfSource-Etag");
    }

    #[test]
    fn keeps_names_without_conventions() {
        assert_eq!(canonical_id("GroupA", "foo").as_str(), "GroupA-foo");
        assert_eq!(canonical_id("Test", "test").as_str(), "Test-test");
    }

    #[test]
    fn parse_accepts_derived_ids_and_rejects_garbage() {
        let derived = canonical_id("GroupCTest", "testBaz");
        assert_eq!(CanonicalId::parse(derived.as_str()), Ok(derived));
        assert!(CanonicalId::parse("").is_err());
        assert!(CanonicalId::parse("NoSeparator").is_err());
        assert!(CanonicalId::parse("-Foo").is_err());
        assert!(CanonicalId::parse("Group A-Foo").is_err());
    }

    #[test]
    fn iri_and_anchor_share_the_id() {
        let id = canonical_id("GroupATest", "testFoo");
        assert_eq!(id.anchor(), "GroupA-Foo");
        assert_eq!(id.iri("https://example.org/ns#"), "https://example.org/ns#GroupA-Foo");
    }
}
