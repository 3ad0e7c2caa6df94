// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::ids::{canonical_id, CanonicalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequirementLevel {
    Must,
    Should,
    May,
}

impl RequirementLevel {
    pub const ALL: [Self; 3] = [Self::Must, Self::Should, Self::May];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Must => "MUST",
            Self::Should => "SHOULD",
            Self::May => "MAY",
        }
    }

    /// Recognises a level tag among the free-form group tags a test runner
    /// reports. Anything that is not MUST/SHOULD/MAY yields `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "MUST" => Some(Self::Must),
            "SHOULD" => Some(Self::Should),
            "MAY" => Some(Self::May),
            _ => None,
        }
    }
}

impl fmt::Display for RequirementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequirementLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| Error::UnknownVariant {
            kind: "requirement level",
            value: s.to_string(),
            expected: "MUST, SHOULD, MAY",
        })
    }
}

/// Aggregation bucket of a descriptor: one of its levels, or the explicit
/// unclassified bucket when it declares none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketLevel {
    Must,
    Should,
    May,
    Unclassified,
}

impl BucketLevel {
    pub const ALL: [Self; 4] = [Self::Must, Self::Should, Self::May, Self::Unclassified];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Must => "MUST",
            Self::Should => "SHOULD",
            Self::May => "MAY",
            Self::Unclassified => "unclassified",
        }
    }
}

impl From<RequirementLevel> for BucketLevel {
    fn from(value: RequirementLevel) -> Self {
        match value {
            RequirementLevel::Must => Self::Must,
            RequirementLevel::Should => Self::Should,
            RequirementLevel::May => Self::May,
        }
    }
}

impl fmt::Display for BucketLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    Pending,
    Extension,
    Deprecated,
    NeedsClarification,
}

impl ReviewStatus {
    pub const ALL: [Self; 5] = [
        Self::Approved,
        Self::Pending,
        Self::Extension,
        Self::Deprecated,
        Self::NeedsClarification,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Extension => "extension",
            Self::Deprecated => "deprecated",
            Self::NeedsClarification => "needs_clarification",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Pending => "Pending review",
            Self::Extension => "Extension",
            Self::Deprecated => "Deprecated",
            Self::NeedsClarification => "Needs clarification",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "extension" => Ok(Self::Extension),
            "deprecated" => Ok(Self::Deprecated),
            "needs_clarification" => Ok(Self::NeedsClarification),
            other => Err(Error::UnknownVariant {
                kind: "review status",
                value: other.to_string(),
                expected: "approved, pending, extension, deprecated, needs_clarification",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationMethod {
    Automated,
    Manual,
    ClientOnly,
    NotImplemented,
    Indirect,
}

impl ImplementationMethod {
    pub const ALL: [Self; 5] = [
        Self::Automated,
        Self::Manual,
        Self::ClientOnly,
        Self::NotImplemented,
        Self::Indirect,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Manual => "manual",
            Self::ClientOnly => "client_only",
            Self::NotImplemented => "not_implemented",
            Self::Indirect => "indirect",
        }
    }

    /// Local name used for the method in the suite vocabulary.
    #[must_use]
    pub const fn vocabulary_term(self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Manual => "manual",
            Self::ClientOnly => "clientOnly",
            Self::NotImplemented => "notImplemented",
            Self::Indirect => "indirect",
        }
    }
}

impl fmt::Display for ImplementationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImplementationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "automated" => Ok(Self::Automated),
            "manual" => Ok(Self::Manual),
            "client_only" => Ok(Self::ClientOnly),
            "not_implemented" => Ok(Self::NotImplemented),
            "indirect" => Ok(Self::Indirect),
            other => Err(Error::UnknownVariant {
                kind: "implementation method",
                value: other.to_string(),
                expected: "automated, manual, client_only, not_implemented, indirect",
            }),
        }
    }
}

/// Which other tests stand in for an indirect test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSpec {
    pub groups: BTreeSet<String>,
    pub levels: BTreeSet<RequirementLevel>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tests: BTreeSet<CanonicalId>,
}

impl CoverageSpec {
    #[must_use]
    pub fn new<G, L>(groups: G, levels: L) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        L: IntoIterator<Item = RequirementLevel>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
            levels: levels.into_iter().collect(),
            tests: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_tests(mut self, tests: impl IntoIterator<Item = CanonicalId>) -> Self {
        self.tests.extend(tests);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty() && (self.groups.is_empty() || self.levels.is_empty())
    }
}

/// Immutable catalog entry for one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDescriptor {
    id: CanonicalId,
    group: String,
    method: String,
    levels: BTreeSet<RequirementLevel>,
    status: ReviewStatus,
    implementation: ImplementationMethod,
    spec_ref: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    coverage: Option<CoverageSpec>,
}

impl TestDescriptor {
    #[must_use]
    pub fn builder(group: impl Into<String>, method: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            group: group.into(),
            method: method.into(),
            levels: BTreeSet::new(),
            status: ReviewStatus::Approved,
            implementation: ImplementationMethod::Automated,
            spec_ref: String::new(),
            description: String::new(),
            coverage: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &CanonicalId {
        &self.id
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn levels(&self) -> &BTreeSet<RequirementLevel> {
        &self.levels
    }

    #[must_use]
    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    #[must_use]
    pub fn implementation(&self) -> ImplementationMethod {
        self.implementation
    }

    #[must_use]
    pub fn spec_ref(&self) -> &str {
        &self.spec_ref
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn coverage(&self) -> Option<&CoverageSpec> {
        self.coverage.as_ref()
    }

    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.implementation == ImplementationMethod::Indirect
    }

    /// Buckets this descriptor is counted in.
    #[must_use]
    pub fn bucket_levels(&self) -> Vec<BucketLevel> {
        if self.levels.is_empty() {
            vec![BucketLevel::Unclassified]
        } else {
            self.levels.iter().copied().map(BucketLevel::from).collect()
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    group: String,
    method: String,
    levels: BTreeSet<RequirementLevel>,
    status: ReviewStatus,
    implementation: ImplementationMethod,
    spec_ref: String,
    description: String,
    coverage: Option<CoverageSpec>,
}

impl DescriptorBuilder {
    #[must_use]
    pub fn level(mut self, level: RequirementLevel) -> Self {
        self.levels.insert(level);
        self
    }

    #[must_use]
    pub fn levels(mut self, levels: impl IntoIterator<Item = RequirementLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn status(mut self, status: ReviewStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn implementation(mut self, implementation: ImplementationMethod) -> Self {
        self.implementation = implementation;
        self
    }

    #[must_use]
    pub fn spec_ref(mut self, spec_ref: impl Into<String>) -> Self {
        self.spec_ref = spec_ref.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the descriptor indirect and attaches its coverage.
    #[must_use]
    pub fn covered_by(mut self, coverage: CoverageSpec) -> Self {
        self.implementation = ImplementationMethod::Indirect;
        self.coverage = Some(coverage);
        self
    }

    pub fn build(self) -> Result<TestDescriptor> {
        let group = self.group.trim().to_string();
        let method = self.method.trim().to_string();
        let invalid = |reason: &str| Error::InvalidDescriptor {
            group: group.clone(),
            method: method.clone(),
            reason: reason.to_string(),
        };

        if group.is_empty() || !group.chars().all(is_group_char) {
            return Err(invalid("group must be a non-empty [A-Za-z0-9_.:] name"));
        }
        if method.is_empty() || !method.chars().all(is_method_char) {
            return Err(invalid("method must be a non-empty [A-Za-z0-9_] name"));
        }
        let spec_ref = self.spec_ref.trim().to_string();
        if spec_ref.is_empty() {
            return Err(invalid("specification reference must not be empty"));
        }
        match (self.implementation, &self.coverage) {
            (ImplementationMethod::Indirect, None) => {
                return Err(invalid("indirect tests must declare a coverage specification"));
            }
            (ImplementationMethod::Indirect, Some(coverage)) if coverage.is_empty() => {
                return Err(invalid("coverage specification selects no tests"));
            }
            (other, Some(_)) if other != ImplementationMethod::Indirect => {
                return Err(invalid("only indirect tests may declare coverage"));
            }
            _ => {}
        }

        Ok(TestDescriptor {
            id: canonical_id(&group, &method),
            group,
            method,
            levels: self.levels,
            status: self.status,
            implementation: self.implementation,
            spec_ref,
            description: self.description.trim().to_string(),
            coverage: self.coverage,
        })
    }
}

fn is_group_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == ':'
}

fn is_method_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
