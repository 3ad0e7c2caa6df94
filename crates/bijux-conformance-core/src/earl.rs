// SPDX-License-Identifier: Apache-2.0

//! Assertion graph of a run: descriptive nodes, manifests, test cases and one
//! EARL assertion per test with a final outcome.

use bijux_conformance_model::{
    group_stem, BucketLevel, CanonicalId, EarlOutcome, ExecutionMode, ReviewStatus,
    TestDescriptor,
};
use chrono::{DateTime, Utc};

use crate::aggregate::final_outcome;
use crate::catalog::Catalog;
use crate::collector::ClosedOutcomes;
use crate::config::{format_timestamp, SuiteConfig};
use crate::graph::{Graph, Literal, Node, Term};
use crate::resolver::Resolution;
use crate::vocab::{dcterms, doap, earl, foaf, mf, rdfs, standard_prefixes, suite_terms, td, xsd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionRecord {
    pub id: CanonicalId,
    pub outcome: EarlOutcome,
    pub mode: ExecutionMode,
    pub subject: String,
    pub assertor: String,
    pub diagnostic: Option<String>,
}

/// One record per test with a recorded or resolved outcome, in catalog
/// order.
#[must_use]
pub fn assertion_records(
    catalog: &Catalog,
    outcomes: &ClosedOutcomes,
    resolution: &Resolution,
    config: &SuiteConfig,
) -> Vec<AssertionRecord> {
    catalog
        .all()
        .filter_map(|descriptor| {
            let outcome = final_outcome(descriptor, outcomes, resolution)?;
            let diagnostic = if descriptor.is_indirect() {
                resolution.get(descriptor.id()).map(|r| {
                    let evidence = r
                        .evidence
                        .iter()
                        .map(CanonicalId::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("resolved from {evidence}")
                })
            } else {
                outcomes
                    .get(descriptor.id())
                    .and_then(|o| o.diagnostic.clone())
            };
            Some(AssertionRecord {
                id: descriptor.id().clone(),
                outcome: outcome.earl(),
                mode: ExecutionMode::from(descriptor.implementation()),
                subject: config.subject.iri.clone(),
                assertor: config.assertor.iri.clone(),
                diagnostic,
            })
        })
        .collect()
}

/// IRI of the manifest listing the `level` tests of `group`.
#[must_use]
pub fn manifest_iri(namespace: &str, group: &str, level: BucketLevel) -> String {
    format!("{namespace}manifest-{}-{}", group_stem(group), level.as_str())
}

fn suite_term(config: &SuiteConfig, local: &str) -> String {
    format!("{}{local}", config.namespace)
}

fn review_status_iri(config: &SuiteConfig, status: ReviewStatus) -> String {
    match status {
        ReviewStatus::Approved => td::APPROVED.to_string(),
        ReviewStatus::Pending => td::UNREVIEWED.to_string(),
        ReviewStatus::Extension => suite_term(config, suite_terms::EXTENSION),
        ReviewStatus::Deprecated => td::REJECTED.to_string(),
        ReviewStatus::NeedsClarification => td::ON_HOLD.to_string(),
    }
}

fn reference_term(spec_ref: &str) -> Term {
    if spec_ref.contains(':') && !spec_ref.chars().any(char::is_whitespace) {
        Term::Node(Node::iri(spec_ref))
    } else {
        Term::Literal(Literal::plain(spec_ref))
    }
}

pub fn build_graph(
    catalog: &Catalog,
    outcomes: &ClosedOutcomes,
    resolution: &Resolution,
    config: &SuiteConfig,
    timestamp: &DateTime<Utc>,
) -> Graph {
    let mut graph = Graph::new(standard_prefixes(&config.namespace));
    describe_subject(&mut graph, config);
    describe_assertor(&mut graph, config);
    add_manifests(&mut graph, catalog, config);
    for descriptor in catalog.all() {
        add_test_case(&mut graph, descriptor, config);
    }
    let date = Literal::typed(format_timestamp(timestamp), xsd::DATE_TIME);
    for record in assertion_records(catalog, outcomes, resolution, config) {
        add_assertion(&mut graph, &record, config, &date);
    }
    graph
}

fn describe_subject(graph: &mut Graph, config: &SuiteConfig) {
    let info = &config.subject;
    let subject = Node::iri(&info.iri);
    graph.add_type(&subject, earl::TEST_SUBJECT);
    graph.add_type(&subject, doap::PROJECT);
    graph.add_literal(&subject, doap::NAME, &info.name);
    graph.add_optional_iri(&subject, doap::HOMEPAGE, info.homepage.as_deref());
    graph.add_optional_literal(&subject, doap::DESCRIPTION, info.description.as_deref());
    graph.add_optional_literal(&subject, doap::PROGRAMMING_LANGUAGE, info.language.as_deref());

    let Some(dev) = &info.developer else {
        return;
    };
    let developer = match dev.iri.as_deref() {
        Some(iri) => Node::iri(iri),
        None => graph.blank(),
    };
    graph.add(&subject, doap::DEVELOPER, &developer);
    graph.add_type(&developer, foaf::PERSON);
    graph.add_optional_literal(&developer, foaf::NAME, dev.name.as_deref());
    graph.add_optional_iri(&developer, foaf::MBOX, dev.mbox.as_deref());
    graph.add_optional_iri(&developer, foaf::HOMEPAGE, dev.homepage.as_deref());
}

fn describe_assertor(graph: &mut Graph, config: &SuiteConfig) {
    let info = &config.assertor;
    let assertor = Node::iri(&info.iri);
    graph.add_type(&assertor, earl::SOFTWARE);
    graph.add_type(&assertor, foaf::AGENT);
    graph.add_literal(&assertor, foaf::NAME, &info.name);
    graph.add_optional_iri(&assertor, foaf::HOMEPAGE, info.homepage.as_deref());
    graph.add_optional_literal(&assertor, dcterms::DESCRIPTION, info.description.as_deref());
}

fn add_manifests(graph: &mut Graph, catalog: &Catalog, config: &SuiteConfig) {
    let mut manifests: Vec<(Node, String, BucketLevel, Vec<Node>)> = Vec::new();
    for level in BucketLevel::ALL {
        for group in catalog.groups() {
            let entries: Vec<Node> = catalog
                .all()
                .filter(|d| d.group() == group && d.bucket_levels().contains(&level))
                .map(|d| Node::iri(d.id().iri(&config.namespace)))
                .collect();
            if entries.is_empty() {
                continue;
            }
            manifests.push((
                Node::iri(manifest_iri(&config.namespace, group, level)),
                group.to_string(),
                level,
                entries,
            ));
        }
    }

    let root = Node::iri(suite_term(config, "manifest"));
    graph.add_type(&root, mf::MANIFEST);
    graph.add_literal(&root, rdfs::LABEL, &config.report.title);
    let included: Vec<Node> = manifests.iter().map(|(node, ..)| node.clone()).collect();
    graph.add_list(&root, mf::INCLUDE, &included);

    for (node, group, level, entries) in manifests {
        let info = config.group_info(&group);
        graph.add_type(&node, mf::MANIFEST);
        graph.add_literal(&node, rdfs::LABEL, &format!("{} ({})", info.title, level.as_str()));
        graph.add_optional_literal(&node, rdfs::COMMENT, Some(info.description.as_str()));
        graph.add_literal(&node, mf::NAME, &format!("{}-{}", group_stem(&group), level.as_str()));
        graph.add_list(&node, mf::ENTRIES, &entries);
    }
}

fn add_test_case(graph: &mut Graph, descriptor: &TestDescriptor, config: &SuiteConfig) {
    let node = Node::iri(descriptor.id().iri(&config.namespace));
    graph.add_type(&node, earl::TEST_CASE);
    graph.add_type(&node, td::TEST_CASE);
    graph.add_literal(&node, mf::NAME, descriptor.id().as_str());
    graph.add_literal(
        &node,
        rdfs::LABEL,
        &format!("{}.{}", group_stem(descriptor.group()), descriptor.method()),
    );
    graph.add_optional_literal(&node, rdfs::COMMENT, Some(descriptor.description()));
    graph.add(&node, rdfs::SEE_ALSO, reference_term(descriptor.spec_ref()));
    graph.add(
        &node,
        td::REVIEW_STATUS,
        Node::iri(review_status_iri(config, descriptor.status())),
    );
    for level in descriptor.levels() {
        graph.add(
            &node,
            &suite_term(config, suite_terms::CONFORMANCE_LEVEL),
            Node::iri(suite_term(config, level.as_str())),
        );
    }
    graph.add(
        &node,
        &suite_term(config, suite_terms::TEST_METHOD),
        Node::iri(suite_term(config, descriptor.implementation().vocabulary_term())),
    );
    graph.add_literal(
        &node,
        &suite_term(config, suite_terms::DECLARED_IN_GROUP),
        descriptor.group(),
    );

    let Some(coverage) = descriptor.coverage() else {
        return;
    };
    for group in &coverage.groups {
        graph.add_literal(&node, &suite_term(config, suite_terms::COVERED_BY_GROUP), group);
    }
    for level in &coverage.levels {
        graph.add(
            &node,
            &suite_term(config, suite_terms::COVERING_LEVEL),
            Node::iri(suite_term(config, level.as_str())),
        );
    }
    for test in &coverage.tests {
        graph.add(
            &node,
            &suite_term(config, suite_terms::COVERED_BY_TEST),
            Node::iri(test.iri(&config.namespace)),
        );
    }
}

fn add_assertion(graph: &mut Graph, record: &AssertionRecord, config: &SuiteConfig, date: &Literal) {
    let assertion = graph.blank();
    let result = graph.blank();
    graph.add_type(&assertion, earl::ASSERTION);
    graph.add(&assertion, earl::SUBJECT, Node::iri(&record.subject));
    graph.add(&assertion, earl::ASSERTED_BY, Node::iri(&record.assertor));
    graph.add(&assertion, earl::TEST, Node::iri(record.id.iri(&config.namespace)));
    graph.add(
        &assertion,
        earl::MODE,
        Node::iri(format!("{}{}", earl::NS, record.mode.local_name())),
    );
    graph.add(&assertion, earl::RESULT, &result);
    graph.add_type(&result, earl::TEST_RESULT);
    graph.add(
        &result,
        earl::OUTCOME,
        Node::iri(format!("{}{}", earl::NS, record.outcome.local_name())),
    );
    graph.add(&result, dcterms::DATE, date.clone());
    graph.add_optional_literal(&result, dcterms::DESCRIPTION, record.diagnostic.as_deref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{parse_catalog, GroupSelection};
    use crate::collector::OutcomeCollector;
    use crate::config::parse_suite_config;
    use crate::graph::Triple;
    use crate::resolver::resolve;
    use crate::vocab::rdf;
    use bijux_conformance_model::{canonical_id, ExecutionOutcome};

    const CONFIG: &str = r#"
[suite]
namespace = "https://example.org/ct#"
[subject]
iri = "https://example.org/server"
name = "Example Server"
[assertor]
iri = "https://example.org/suite"
name = "Example Suite"
"#;

    const CATALOG: &str = r#"
[[tests]]
group = "GroupATest"
method = "testFoo"
levels = ["MUST"]
spec_ref = "https://example.org/spec#r1"
[[tests]]
group = "GroupBTest"
method = "testBar"
levels = ["SHOULD"]
implementation = "client_only"
status = "needs_clarification"
spec_ref = "section 4.2"
"#;

    fn has(graph: &Graph, subject: &Node, predicate: &str, object: Term) -> bool {
        graph.triples().contains(&Triple {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object,
        })
    }

    fn build(record_bar: bool) -> Graph {
        let config = parse_suite_config(CONFIG, "inline").expect("config");
        let catalog = parse_catalog(CATALOG, "inline", GroupSelection::all()).expect("catalog");
        let mut collector = OutcomeCollector::new(&catalog);
        collector
            .record(canonical_id("GroupA", "Foo"), ExecutionOutcome::fail("got 500"))
            .expect("foo");
        if record_bar {
            collector
                .record(canonical_id("GroupB", "Bar"), ExecutionOutcome::skip("client only"))
                .expect("bar");
        }
        let outcomes = collector.close();
        let resolution = resolve(&catalog, &outcomes);
        build_graph(&catalog, &outcomes, &resolution, &config, &DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn absent_optional_descriptions_emit_no_triples() {
        let graph = build(false);
        let subject = Node::iri("https://example.org/server");
        assert!(has(&graph, &subject, doap::NAME, Literal::plain("Example Server").into()));
        assert!(!graph
            .triples()
            .iter()
            .any(|t| t.predicate == doap::HOMEPAGE || t.predicate == doap::DEVELOPER));
    }

    #[test]
    fn assertions_exist_only_for_tests_with_outcomes() {
        let assertions = |graph: &Graph| {
            graph
                .triples()
                .iter()
                .filter(|t| t.predicate == rdf::TYPE && t.object == Term::Node(Node::iri(earl::ASSERTION)))
                .count()
        };
        assert_eq!(assertions(&build(false)), 1);
        assert_eq!(assertions(&build(true)), 2);
    }

    #[test]
    fn test_cases_carry_status_method_and_reference() {
        let graph = build(true);
        let bar = Node::iri("https://example.org/ct#GroupB-Bar");
        assert!(has(&graph, &bar, td::REVIEW_STATUS, Node::iri(td::ON_HOLD).into()));
        assert!(has(
            &graph,
            &bar,
            "https://example.org/ct#testMethod",
            Node::iri("https://example.org/ct#clientOnly").into()
        ));
        assert!(has(&graph, &bar, rdfs::SEE_ALSO, Literal::plain("section 4.2").into()));
    }

    #[test]
    fn client_only_results_are_not_tested_and_untested() {
        let graph = build(true);
        assert!(graph.triples().iter().any(|t| t.predicate == earl::MODE
            && t.object == Term::Node(Node::iri(format!("{}notTested", earl::NS)))));
        assert!(graph.triples().iter().any(|t| t.predicate == earl::OUTCOME
            && t.object == Term::Node(Node::iri(format!("{}untested", earl::NS)))));
    }

    #[test]
    fn manifests_are_emitted_per_non_empty_bucket() {
        let graph = build(false);
        let must_a = Node::iri(manifest_iri("https://example.org/ct#", "GroupATest", BucketLevel::Must));
        assert!(has(&graph, &must_a, rdf::TYPE, Node::iri(mf::MANIFEST).into()));
        let may_a = Node::iri(manifest_iri("https://example.org/ct#", "GroupATest", BucketLevel::May));
        assert_eq!(graph.triples_for(&may_a).count(), 0);
    }
}
