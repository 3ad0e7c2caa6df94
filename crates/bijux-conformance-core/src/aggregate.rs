// SPDX-License-Identifier: Apache-2.0

//! Classification of a finished run into (level, group) buckets.
//!
//! [`aggregate`] is one pure pass over the catalog. Every descriptor lands in
//! one bucket per requirement level it declares, or in the `unclassified`
//! bucket when it declares none. Within each bucket
//! `pass + fail + skip + unresolved == total`.

use std::collections::BTreeMap;

use bijux_conformance_model::{
    group_stem, BucketLevel, CanonicalId, ImplementationMethod, Outcome, RequirementLevel,
    ReviewStatus, TestDescriptor,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::collector::ClosedOutcomes;
use crate::config::{format_timestamp, lookup_group_info, GroupInfo, SuiteConfig};
use crate::resolver::Resolution;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub total: usize,
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
    pub unresolved: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: Option<Outcome>) {
        self.total += 1;
        match outcome {
            Some(Outcome::Pass) => self.pass += 1,
            Some(Outcome::Fail) => self.fail += 1,
            Some(Outcome::Skip) => self.skip += 1,
            None => self.unresolved += 1,
        }
    }

    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.pass + self.fail + self.skip + self.unresolved == self.total
    }
}

/// Requirement tallies, deduplicated by specification reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequirementCounts {
    pub requirements_total: usize,
    /// References with at least one pass or fail.
    pub requirements_covered: usize,
    /// References with at least one pass and no fail.
    pub requirements_passed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub counts: OutcomeCounts,
    pub by_status: BTreeMap<ReviewStatus, usize>,
    pub by_method: BTreeMap<ImplementationMethod, usize>,
    pub requirements: RequirementCounts,
}

#[derive(Debug, Clone, Copy, Default)]
struct RefState {
    pass: bool,
    fail: bool,
}

#[derive(Debug, Default)]
struct Tally {
    counts: OutcomeCounts,
    by_status: BTreeMap<ReviewStatus, usize>,
    by_method: BTreeMap<ImplementationMethod, usize>,
    refs: BTreeMap<String, RefState>,
}

impl Tally {
    fn add(&mut self, descriptor: &TestDescriptor, outcome: Option<Outcome>) {
        self.counts.record(outcome);
        *self.by_status.entry(descriptor.status()).or_default() += 1;
        *self.by_method.entry(descriptor.implementation()).or_default() += 1;
        let state = self.refs.entry(descriptor.spec_ref().to_string()).or_default();
        match outcome {
            Some(Outcome::Pass) => state.pass = true,
            Some(Outcome::Fail) => state.fail = true,
            Some(Outcome::Skip) | None => {}
        }
    }

    fn finish(&self) -> Breakdown {
        let states = self.refs.values();
        Breakdown {
            counts: self.counts,
            by_status: self.by_status.clone(),
            by_method: self.by_method.clone(),
            requirements: RequirementCounts {
                requirements_total: self.refs.len(),
                requirements_covered: states.clone().filter(|s| s.pass || s.fail).count(),
                requirements_passed: states.filter(|s| s.pass && !s.fail).count(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateBucket {
    pub level: BucketLevel,
    pub group: String,
    pub breakdown: Breakdown,
    /// Member tests in catalog order.
    pub tests: Vec<CanonicalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub level: BucketLevel,
    pub breakdown: Breakdown,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub title: String,
    pub description: String,
    pub anchor: String,
    /// Each descriptor of the group counted once.
    pub breakdown: Breakdown,
    pub buckets: Vec<AggregateBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Indirect test whose coverage matched no recorded outcome.
    NoCoveringEvidence,
    /// Direct test that never reported an outcome.
    NotExecuted,
}

impl UnresolvedReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoCoveringEvidence => "no covering evidence",
            Self::NotExecuted => "not executed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestEntry {
    pub id: CanonicalId,
    pub group: String,
    pub method: String,
    pub levels: Vec<RequirementLevel>,
    pub status: ReviewStatus,
    pub implementation: ImplementationMethod,
    pub spec_ref: String,
    pub description: String,
    pub outcome: Option<Outcome>,
    pub diagnostic: Option<String>,
    pub evidence: Vec<CanonicalId>,
    pub unresolved: Option<UnresolvedReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedEntry {
    pub id: CanonicalId,
    pub group: String,
    pub reason: UnresolvedReason,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportContext {
    pub title: String,
    pub subject_name: String,
    pub timestamp: String,
    #[serde(skip)]
    pub groups: Vec<GroupInfo>,
}

impl ReportContext {
    #[must_use]
    pub fn new(title: &str, subject_name: &str, timestamp: &DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            subject_name: subject_name.to_string(),
            timestamp: format_timestamp(timestamp),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SuiteConfig, timestamp: &DateTime<Utc>) -> Self {
        Self {
            groups: config.groups.clone(),
            ..Self::new(&config.report.title, &config.subject.name, timestamp)
        }
    }
}

/// Value the dashboard is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub context: ReportContext,
    /// Each descriptor counted once.
    pub totals: Breakdown,
    pub levels: Vec<LevelSummary>,
    pub groups: Vec<GroupSummary>,
    pub tests: Vec<TestEntry>,
    pub unresolved: Vec<UnresolvedEntry>,
}

impl AggregateReport {
    #[must_use]
    pub fn level(&self, level: BucketLevel) -> Option<&LevelSummary> {
        self.levels.iter().find(|summary| summary.level == level)
    }

    #[must_use]
    pub fn group(&self, group: &str) -> Option<&GroupSummary> {
        let stem = group_stem(group);
        self.groups.iter().find(|summary| group_stem(&summary.group) == stem)
    }

    #[must_use]
    pub fn bucket(&self, level: BucketLevel, group: &str) -> Option<&AggregateBucket> {
        self.group(group)?
            .buckets
            .iter()
            .find(|bucket| bucket.level == level)
    }

    #[must_use]
    pub fn test(&self, id: &CanonicalId) -> Option<&TestEntry> {
        self.tests.iter().find(|entry| &entry.id == id)
    }
}

/// Outcome a descriptor is reported with: the recorded one for direct
/// tests, the resolved one for indirect tests.
#[must_use]
pub fn final_outcome(
    descriptor: &TestDescriptor,
    outcomes: &ClosedOutcomes,
    resolution: &Resolution,
) -> Option<Outcome> {
    if descriptor.is_indirect() {
        resolution.get(descriptor.id()).map(|r| r.outcome)
    } else {
        outcomes.get(descriptor.id()).map(|o| o.outcome)
    }
}

/// Anchor of a group section in the dashboard.
#[must_use]
pub fn group_anchor(group: &str) -> String {
    format!("group-{}", group_stem(group))
}

pub fn aggregate(
    catalog: &Catalog,
    outcomes: &ClosedOutcomes,
    resolution: &Resolution,
    context: &ReportContext,
) -> AggregateReport {
    let mut totals = Tally::default();
    let mut levels: BTreeMap<BucketLevel, Tally> = BTreeMap::new();
    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut buckets: BTreeMap<(&str, BucketLevel), (Tally, Vec<CanonicalId>)> = BTreeMap::new();
    let mut tests = Vec::with_capacity(catalog.len());
    let mut unresolved = Vec::new();

    for descriptor in catalog.all() {
        let outcome = final_outcome(descriptor, outcomes, resolution);
        totals.add(descriptor, outcome);
        groups.entry(descriptor.group()).or_default().add(descriptor, outcome);
        for level in descriptor.bucket_levels() {
            levels.entry(level).or_default().add(descriptor, outcome);
            let (tally, members) = buckets.entry((descriptor.group(), level)).or_default();
            tally.add(descriptor, outcome);
            members.push(descriptor.id().clone());
        }

        let reason = match (outcome, descriptor.is_indirect()) {
            (Some(_), _) => None,
            (None, true) => Some(UnresolvedReason::NoCoveringEvidence),
            (None, false) => Some(UnresolvedReason::NotExecuted),
        };
        if let Some(reason) = reason {
            let detail = resolution
                .warnings()
                .iter()
                .find(|w| w.id == *descriptor.id())
                .map(ToString::to_string)
                .unwrap_or_else(|| reason.label().to_string());
            unresolved.push(UnresolvedEntry {
                id: descriptor.id().clone(),
                group: descriptor.group().to_string(),
                reason,
                detail,
            });
        }
        tests.push(test_entry(descriptor, outcome, outcomes, resolution, reason));
    }

    let level_summaries = BucketLevel::ALL
        .into_iter()
        .map(|level| LevelSummary {
            level,
            breakdown: levels.get(&level).map(Tally::finish).unwrap_or_default(),
            groups: catalog
                .groups()
                .into_iter()
                .filter(|group| buckets.contains_key(&(*group, level)))
                .map(str::to_string)
                .collect(),
        })
        .collect();

    let group_summaries = catalog
        .groups()
        .into_iter()
        .map(|group| {
            let info = lookup_group_info(&context.groups, group);
            GroupSummary {
                group: group.to_string(),
                title: info.title,
                description: info.description,
                anchor: group_anchor(group),
                breakdown: groups.get(group).map(Tally::finish).unwrap_or_default(),
                buckets: BucketLevel::ALL
                    .into_iter()
                    .filter_map(|level| {
                        let (tally, members) = buckets.get(&(group, level))?;
                        Some(AggregateBucket {
                            level,
                            group: group.to_string(),
                            breakdown: tally.finish(),
                            tests: members.clone(),
                        })
                    })
                    .collect(),
            }
        })
        .collect();

    AggregateReport {
        context: context.clone(),
        totals: totals.finish(),
        levels: level_summaries,
        groups: group_summaries,
        tests,
        unresolved,
    }
}

fn test_entry(
    descriptor: &TestDescriptor,
    outcome: Option<Outcome>,
    outcomes: &ClosedOutcomes,
    resolution: &Resolution,
    unresolved: Option<UnresolvedReason>,
) -> TestEntry {
    let (diagnostic, evidence) = if descriptor.is_indirect() {
        (
            None,
            resolution
                .get(descriptor.id())
                .map(|r| r.evidence.clone())
                .unwrap_or_default(),
        )
    } else {
        (
            outcomes
                .get(descriptor.id())
                .and_then(|o| o.diagnostic.clone()),
            Vec::new(),
        )
    };
    TestEntry {
        id: descriptor.id().clone(),
        group: descriptor.group().to_string(),
        method: descriptor.method().to_string(),
        levels: descriptor.levels().iter().copied().collect(),
        status: descriptor.status(),
        implementation: descriptor.implementation(),
        spec_ref: descriptor.spec_ref().to_string(),
        description: descriptor.description().to_string(),
        outcome,
        diagnostic,
        evidence,
        unresolved,
    }
}
