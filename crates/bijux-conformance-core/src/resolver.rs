// SPDX-License-Identifier: Apache-2.0

//! Derived outcomes for indirect tests.
//!
//! An indirect test stands for the tests its coverage selects: every test of
//! a named group whose levels meet the covering levels, plus the tests named
//! explicitly. Only outcomes recorded directly count as evidence, so one
//! indirect test never feeds another.

use std::collections::BTreeMap;
use std::fmt;

use bijux_conformance_model::{group_stem, CanonicalId, Outcome, TestDescriptor};
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::collector::ClosedOutcomes;

/// Methods carrying this marker check the suite itself and never stand in
/// for a requirement.
pub const RESERVED_METHOD_MARKER: &str = "Conforms";

/// Highest-precedence outcome of `outcomes`: fail beats pass, pass beats
/// skip. `None` when nothing was supplied.
pub fn resolve_outcome(outcomes: impl IntoIterator<Item = Outcome>) -> Option<Outcome> {
    outcomes.into_iter().max_by_key(|o| o.precedence())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOutcome {
    pub outcome: Outcome,
    /// Covering tests whose outcomes were consulted, in catalog order.
    pub evidence: Vec<CanonicalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedCoverageWarning {
    pub id: CanonicalId,
    pub groups: Vec<String>,
    pub levels: Vec<String>,
    pub tests: Vec<CanonicalId>,
}

impl fmt::Display for UnresolvedCoverageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no covering outcome for `{}` (groups: [{}], levels: [{}], tests: [{}])",
            self.id,
            self.groups.join(", "),
            self.levels.join(", "),
            self.tests
                .iter()
                .map(CanonicalId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    resolved: BTreeMap<CanonicalId, ResolvedOutcome>,
    warnings: Vec<UnresolvedCoverageWarning>,
}

impl Resolution {
    #[must_use]
    pub fn get(&self, id: &CanonicalId) -> Option<&ResolvedOutcome> {
        self.resolved.get(id)
    }

    #[must_use]
    pub fn warnings(&self) -> &[UnresolvedCoverageWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

fn covers(indirect: &TestDescriptor, candidate: &TestDescriptor) -> bool {
    let Some(coverage) = indirect.coverage() else {
        return false;
    };
    if candidate.id() == indirect.id() {
        return false;
    }
    if coverage.tests.contains(candidate.id()) {
        return true;
    }
    let in_group = coverage
        .groups
        .iter()
        .any(|group| group_stem(group) == group_stem(candidate.group()));
    in_group
        && !candidate.method().contains(RESERVED_METHOD_MARKER)
        && candidate
            .levels()
            .iter()
            .any(|level| coverage.levels.contains(level))
}

/// Resolves every indirect descriptor of `catalog` against the closed
/// outcome set.
pub fn resolve(catalog: &Catalog, outcomes: &ClosedOutcomes) -> Resolution {
    let mut resolution = Resolution::default();
    for indirect in catalog.all().filter(|d| d.is_indirect()) {
        let mut evidence = Vec::new();
        let mut found = Vec::new();
        for candidate in catalog.all().filter(|c| covers(indirect, c)) {
            if let Some(recorded) = outcomes.get(candidate.id()) {
                evidence.push(candidate.id().clone());
                found.push(recorded.outcome);
            }
        }
        match resolve_outcome(found) {
            Some(outcome) => {
                debug!(id = %indirect.id(), outcome = %outcome, evidence = evidence.len(), "indirect outcome resolved");
                resolution
                    .resolved
                    .insert(indirect.id().clone(), ResolvedOutcome { outcome, evidence });
            }
            None => {
                let warning = unresolved_warning(indirect);
                warn!(id = %indirect.id(), "{warning}");
                resolution.warnings.push(warning);
            }
        }
    }
    resolution
}

fn unresolved_warning(indirect: &TestDescriptor) -> UnresolvedCoverageWarning {
    let coverage = indirect.coverage();
    UnresolvedCoverageWarning {
        id: indirect.id().clone(),
        groups: coverage
            .map(|c| c.groups.iter().cloned().collect())
            .unwrap_or_default(),
        levels: coverage
            .map(|c| c.levels.iter().map(|l| l.as_str().to_string()).collect())
            .unwrap_or_default(),
        tests: coverage
            .map(|c| c.tests.iter().cloned().collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::collector::OutcomeCollector;
    use bijux_conformance_model::{
        canonical_id, CoverageSpec, ExecutionOutcome, RequirementLevel,
    };

    fn descriptor(group: &str, method: &str, level: Option<RequirementLevel>) -> TestDescriptor {
        let mut builder =
            TestDescriptor::builder(group, method).spec_ref(format!("urn:req:{method}"));
        if let Some(level) = level {
            builder = builder.level(level);
        }
        builder.build().expect("descriptor")
    }

    fn indirect(coverage: CoverageSpec) -> TestDescriptor {
        TestDescriptor::builder("GroupCTest", "testBaz")
            .spec_ref("urn:req:baz")
            .covered_by(coverage)
            .build()
            .expect("descriptor")
    }

    #[test]
    fn precedence_is_fail_pass_skip() {
        assert_eq!(resolve_outcome([Outcome::Pass, Outcome::Fail]), Some(Outcome::Fail));
        assert_eq!(resolve_outcome([Outcome::Skip, Outcome::Pass]), Some(Outcome::Pass));
        assert_eq!(resolve_outcome([Outcome::Skip]), Some(Outcome::Skip));
        assert_eq!(resolve_outcome(Vec::new()), None);
    }

    #[test]
    fn level_filter_and_reserved_marker_limit_the_evidence() {
        let mut builder = CatalogBuilder::new();
        builder
            .register(descriptor("GroupATest", "testFoo", Some(RequirementLevel::Must)))
            .expect("foo")
            .register(descriptor("GroupATest", "testOptional", Some(RequirementLevel::May)))
            .expect("optional")
            .register(descriptor("GroupATest", "testConformsToSuite", Some(RequirementLevel::Must)))
            .expect("conforms")
            .register(indirect(CoverageSpec::new(["GroupA"], [RequirementLevel::Must])))
            .expect("baz");
        let catalog = builder.build().expect("catalog");

        let mut collector = OutcomeCollector::new(&catalog);
        collector
            .record(canonical_id("GroupATest", "testFoo"), ExecutionOutcome::pass())
            .expect("foo");
        collector
            .record(canonical_id("GroupATest", "testOptional"), ExecutionOutcome::fail("x"))
            .expect("optional");
        collector
            .record(canonical_id("GroupATest", "testConformsToSuite"), ExecutionOutcome::fail("x"))
            .expect("conforms");
        let resolution = resolve(&catalog, &collector.close());

        let resolved = resolution
            .get(&canonical_id("GroupCTest", "testBaz"))
            .expect("resolved");
        assert_eq!(resolved.outcome, Outcome::Pass);
        assert_eq!(resolved.evidence, vec![canonical_id("GroupATest", "testFoo")]);
        assert!(resolution.warnings().is_empty());
    }

    #[test]
    fn explicit_tests_cover_regardless_of_level() {
        let mut builder = CatalogBuilder::new();
        builder
            .register(descriptor("GroupBTest", "testBar", None))
            .expect("bar")
            .register(indirect(
                CoverageSpec::new(Vec::<String>::new(), Vec::new())
                    .with_tests([canonical_id("GroupBTest", "testBar")]),
            ))
            .expect("baz");
        let catalog = builder.build().expect("catalog");
        let mut collector = OutcomeCollector::new(&catalog);
        collector
            .record(canonical_id("GroupB", "Bar"), ExecutionOutcome::skip("server lacks PATCH"))
            .expect("bar");
        let resolution = resolve(&catalog, &collector.close());
        assert_eq!(
            resolution
                .get(&canonical_id("GroupC", "Baz"))
                .map(|r| r.outcome),
            Some(Outcome::Skip)
        );
    }

    #[test]
    fn missing_evidence_yields_a_warning_and_no_outcome() {
        let mut builder = CatalogBuilder::new();
        builder
            .register(descriptor("GroupATest", "testFoo", Some(RequirementLevel::Must)))
            .expect("foo")
            .register(indirect(CoverageSpec::new(["GroupA"], [RequirementLevel::Must])))
            .expect("baz");
        let catalog = builder.build().expect("catalog");
        let resolution = resolve(&catalog, &OutcomeCollector::new(&catalog).close());
        assert_eq!(resolution.resolved_count(), 0);
        let warning = &resolution.warnings()[0];
        assert_eq!(warning.id.as_str(), "GroupC-Baz");
        assert!(warning.to_string().contains("groups: [GroupA]"));
    }
}
