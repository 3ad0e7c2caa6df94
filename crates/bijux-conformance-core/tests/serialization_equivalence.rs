// SPDX-License-Identifier: Apache-2.0

mod support;

use bijux_conformance_core::{prepare_report, ArtifactKind};
use bijux_conformance_model::FeedEntry;
use chrono::{DateTime, Utc};

fn timestamp() -> DateTime<Utc> {
    bijux_conformance_core::config::parse_timestamp("2024-05-01T09:00:00+02:00").expect("timestamp")
}

#[test]
fn turtle_and_jsonld_encode_the_same_graph() {
    let feed = support::feed(
        vec![FeedEntry::new("org.example.GroupATest", "testFoo").with_levels(&["MUST"])],
        vec![FeedEntry::new("org.example.GroupBTest", "testBar")
            .with_message("line one\nline \"two\"\tdone \u{e9}")],
        Vec::new(),
    );
    let prepared = prepare_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed,
        &timestamp(),
    )
    .expect("report");

    let expected = support::graph_triples(&prepared.graph);
    assert_eq!(expected.len(), prepared.graph.len());

    let turtle = &prepared.artifacts.get(ArtifactKind::Turtle).expect("turtle").content;
    let jsonld = &prepared.artifacts.get(ArtifactKind::JsonLd).expect("json-ld").content;
    let parsed = support::turtle_triples(turtle);
    assert_eq!(parsed, expected);
    assert_eq!(support::parse_jsonld(jsonld), parsed);
}

#[test]
fn assertion_dates_are_normalized_to_utc() {
    let prepared = prepare_report(
        &support::config(),
        &support::scenario_catalog(),
        &support::feed(vec![FeedEntry::new("GroupATest", "testFoo")], Vec::new(), Vec::new()),
        &timestamp(),
    )
    .expect("report");
    let turtle = &prepared.artifacts.get(ArtifactKind::Turtle).expect("turtle").content;
    assert!(turtle.contains("\"2024-05-01T07:00:00Z\"^^xsd:dateTime"));
    assert_eq!(prepared.aggregate.context.timestamp, "2024-05-01T07:00:00Z");
}

#[test]
fn an_empty_feed_still_describes_every_test_case() {
    let prepared = prepare_report(
        &support::config(),
        &support::scenario_catalog(),
        &support::feed(Vec::new(), Vec::new(), Vec::new()),
        &timestamp(),
    )
    .expect("report");
    let turtle = &prepared.artifacts.get(ArtifactKind::Turtle).expect("turtle").content;
    let triples = support::turtle_triples(turtle);
    for id in ["GroupA-Foo", "GroupB-Bar", "GroupC-Baz"] {
        let typed = (
            format!("<{}{id}>", support::NAMESPACE),
            "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>".to_string(),
            "<http://www.w3.org/2006/03/test-description#TestCase>".to_string(),
        );
        assert!(triples.contains(&typed), "{id} is not described");
    }
    assert!(!turtle.contains("earl:Assertion"));
    assert_eq!(prepared.aggregate.totals.counts.unresolved, 3);
}

#[test]
fn literals_with_markup_and_escapes_survive_a_standard_turtle_parser() {
    let feed = support::feed(
        Vec::new(),
        vec![FeedEntry::new("org.example.GroupATest", "testFoo")
            .with_message("<a href=\"x\">\\path</a>\r\nend")],
        Vec::new(),
    );
    let prepared = prepare_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed,
        &timestamp(),
    )
    .expect("report");
    let turtle = &prepared.artifacts.get(ArtifactKind::Turtle).expect("turtle").content;
    let triples = support::turtle_triples(turtle);
    let description = "<http://purl.org/dc/terms/description>".to_string();
    let message = triples
        .iter()
        .find(|(_, predicate, object)| *predicate == description && object.contains("path"))
        .map(|(_, _, object)| object.clone())
        .expect("diagnostic triple");
    assert_eq!(message, format!("{:?}", "<a href=\"x\">\\path</a>\r\nend"));
    assert_eq!(triples, support::graph_triples(&prepared.graph));
}
