// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use bijux_conformance_model::{
    group_stem, CanonicalId, CoverageSpec, ImplementationMethod, RequirementLevel, ReviewStatus,
    TestDescriptor,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateId {
        id: CanonicalId,
        first: String,
        second: String,
    },
    SelfCoverage {
        id: CanonicalId,
    },
    UnknownCoverageTarget {
        id: CanonicalId,
        target: CanonicalId,
    },
    GroupStemCollision {
        stem: String,
        first: String,
        second: String,
    },
    InvalidDescriptor(bijux_conformance_model::Error),
    Io {
        path: String,
        detail: String,
    },
    Parse {
        path: String,
        detail: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id, first, second } => {
                write!(f, "duplicate canonical id `{id}`: {first} and {second}")
            }
            Self::SelfCoverage { id } => write!(f, "`{id}` lists itself as coverage"),
            Self::UnknownCoverageTarget { id, target } => {
                write!(f, "`{id}` is covered by unknown test `{target}`")
            }
            Self::GroupStemCollision {
                stem,
                first,
                second,
            } => write!(f, "groups {first} and {second} share the short name `{stem}`"),
            Self::InvalidDescriptor(err) => write!(f, "{err}"),
            Self::Io { path, detail } => write!(f, "failed to read {path}: {detail}"),
            Self::Parse { path, detail } => write!(f, "failed to parse {path}: {detail}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDescriptor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bijux_conformance_model::Error> for CatalogError {
    fn from(value: bijux_conformance_model::Error) -> Self {
        Self::InvalidDescriptor(value)
    }
}

/// Which declaring groups take part in a run. Groups match on their stem,
/// so `GroupA`, `GroupATest` and `org.example.GroupATest` are the same group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSelection {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl GroupSelection {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            include: include
                .into_iter()
                .map(|g| group_stem(g.as_ref()).to_string())
                .collect(),
            exclude: exclude
                .into_iter()
                .map(|g| group_stem(g.as_ref()).to_string())
                .collect(),
        }
    }

    /// Exclusion wins over inclusion; an empty include list admits every
    /// group.
    #[must_use]
    pub fn allows(&self, group: &str) -> bool {
        let stem = group_stem(group);
        if self.exclude.contains(stem) {
            return false;
        }
        self.include.is_empty() || self.include.contains(stem)
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    selection: GroupSelection,
    descriptors: Vec<TestDescriptor>,
    index: BTreeMap<CanonicalId, usize>,
    excluded: BTreeSet<CanonicalId>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_selection(selection: GroupSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Adds a descriptor. Descriptors of groups outside the selection are
    /// dropped, but their ids stay reserved.
    pub fn register(&mut self, descriptor: TestDescriptor) -> Result<&mut Self, CatalogError> {
        let id = descriptor.id().clone();
        if let Some(&first) = self.index.get(&id) {
            let first = &self.descriptors[first];
            return Err(CatalogError::DuplicateId {
                id,
                first: format!("{}.{}", first.group(), first.method()),
                second: format!("{}.{}", descriptor.group(), descriptor.method()),
            });
        }
        if self.excluded.contains(&id) {
            return Err(CatalogError::DuplicateId {
                id,
                first: "an excluded descriptor".to_string(),
                second: format!("{}.{}", descriptor.group(), descriptor.method()),
            });
        }
        if descriptor
            .coverage()
            .is_some_and(|coverage| coverage.tests.contains(&id))
        {
            return Err(CatalogError::SelfCoverage { id });
        }
        if !self.selection.allows(descriptor.group()) {
            debug!(id = %id, group = descriptor.group(), "descriptor excluded by group selection");
            self.excluded.insert(id);
            return Ok(self);
        }
        self.index.insert(id, self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(self)
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut stems: BTreeMap<&str, &str> = BTreeMap::new();
        for descriptor in &self.descriptors {
            let group = descriptor.group();
            let first = *stems.entry(group_stem(group)).or_insert(group);
            if first != group {
                return Err(CatalogError::GroupStemCollision {
                    stem: group_stem(group).to_string(),
                    first: first.to_string(),
                    second: group.to_string(),
                });
            }
        }
        for descriptor in &self.descriptors {
            let Some(coverage) = descriptor.coverage() else {
                continue;
            };
            for target in &coverage.tests {
                if self.index.contains_key(target) {
                    continue;
                }
                if self.excluded.contains(target) {
                    debug!(
                        id = %descriptor.id(),
                        target = %target,
                        "explicit coverage target excluded by group selection"
                    );
                    continue;
                }
                return Err(CatalogError::UnknownCoverageTarget {
                    id: descriptor.id().clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(Catalog {
            selection: self.selection,
            descriptors: self.descriptors,
            index: self.index,
        })
    }
}

/// Immutable, validated set of descriptors for one run.
#[derive(Debug, Clone)]
pub struct Catalog {
    selection: GroupSelection,
    descriptors: Vec<TestDescriptor>,
    index: BTreeMap<CanonicalId, usize>,
}

impl Catalog {
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Descriptors in registration order.
    pub fn all(&self) -> impl Iterator<Item = &TestDescriptor> {
        self.descriptors.iter()
    }

    #[must_use]
    pub fn get(&self, id: &CanonicalId) -> Option<&TestDescriptor> {
        self.index.get(id).map(|&at| &self.descriptors[at])
    }

    #[must_use]
    pub fn contains(&self, id: &CanonicalId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Distinct declaring groups in first-seen order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.descriptors
            .iter()
            .map(TestDescriptor::group)
            .filter(|group| seen.insert(*group))
            .collect()
    }

    #[must_use]
    pub fn selection(&self) -> &GroupSelection {
        &self.selection
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    tests: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTest {
    group: String,
    method: String,
    #[serde(default)]
    levels: Vec<String>,
    status: Option<String>,
    implementation: Option<String>,
    spec_ref: String,
    #[serde(default)]
    description: String,
    coverage: Option<RawCoverage>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCoverage {
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    levels: Vec<String>,
    #[serde(default)]
    tests: Vec<String>,
}

fn parse_levels(raw: &[String]) -> Result<Vec<RequirementLevel>, CatalogError> {
    raw.iter()
        .map(|v| v.parse::<RequirementLevel>().map_err(CatalogError::from))
        .collect()
}

fn parse_row(row: RawTest) -> Result<TestDescriptor, CatalogError> {
    let mut builder = TestDescriptor::builder(row.group, row.method)
        .levels(parse_levels(&row.levels)?)
        .spec_ref(row.spec_ref)
        .description(row.description);
    if let Some(coverage) = row.coverage {
        let tests = coverage
            .tests
            .iter()
            .map(|v| CanonicalId::parse(v.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.covered_by(
            CoverageSpec::new(coverage.groups, parse_levels(&coverage.levels)?).with_tests(tests),
        );
    }
    if let Some(status) = row.status {
        builder = builder.status(status.parse::<ReviewStatus>()?);
    }
    // Applied after the coverage so a direct method next to a coverage
    // table is reported instead of silently overridden.
    if let Some(implementation) = row.implementation {
        builder = builder.implementation(implementation.parse::<ImplementationMethod>()?);
    }
    Ok(builder.build()?)
}

/// Parses a catalog table; `origin` names the source in error messages.
pub fn parse_catalog(
    text: &str,
    origin: &str,
    selection: GroupSelection,
) -> Result<Catalog, CatalogError> {
    let raw: RawCatalog = toml::from_str(text).map_err(|err| CatalogError::Parse {
        path: origin.to_string(),
        detail: err.to_string(),
    })?;
    let mut builder = CatalogBuilder::with_selection(selection);
    for row in raw.tests {
        builder.register(parse_row(row)?)?;
    }
    builder.build()
}

pub fn load_catalog(path: &Path, selection: GroupSelection) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|err| CatalogError::Io {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    let catalog = parse_catalog(&text, &path.display().to_string(), selection)?;
    debug!(path = %path.display(), descriptors = catalog.len(), "catalog loaded");
    Ok(catalog)
}

pub fn list_output(catalog: &Catalog) -> String {
    catalog
        .all()
        .map(|d| {
            let levels = d
                .levels()
                .iter()
                .map(|l| l.as_str())
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "{}\t{}\t{}\t{}",
                d.id(),
                if levels.is_empty() { "-" } else { levels.as_str() },
                d.status(),
                d.implementation()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn explain_output(catalog: &Catalog, id: &CanonicalId) -> Result<String, String> {
    let d = catalog
        .get(id)
        .ok_or_else(|| format!("unknown test id `{id}`"))?;
    let levels = d
        .levels()
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let mut out = format!(
        "id: {}\ngroup: {}\nmethod: {}\nlevels: {}\nstatus: {}\nimplementation: {}\nspec_ref: {}\ndescription: {}",
        d.id(),
        d.group(),
        d.method(),
        levels,
        d.status(),
        d.implementation(),
        d.spec_ref(),
        d.description()
    );
    if let Some(coverage) = d.coverage() {
        let join = |items: Vec<String>| items.join(",");
        out.push_str(&format!(
            "\ncovered_by_groups: {}\ncovering_levels: {}\ncovered_by_tests: {}",
            join(coverage.groups.iter().cloned().collect()),
            join(coverage.levels.iter().map(|l| l.to_string()).collect()),
            join(coverage.tests.iter().map(|t| t.to_string()).collect()),
        ));
    }
    Ok(out)
}
