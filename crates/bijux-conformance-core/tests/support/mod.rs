// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use bijux_conformance_core::graph::{Graph, Literal, Node, Term};
use bijux_conformance_core::{parse_catalog, parse_suite_config, Catalog, GroupSelection, SuiteConfig};
use bijux_conformance_model::{FeedEntry, SuiteResult, SuiteResultsFeed};
use oxttl::TurtleParser;
use serde_json::Value;

pub const NAMESPACE: &str = "https://example.org/ldp/tests#";

pub const CONFIG: &str = r#"
[report]
title = "Example LDP run"
basename = "ldp-earl"

[suite]
namespace = "https://example.org/ldp/tests#"

[subject]
iri = "https://example.org/server"
name = "Example Server"
homepage = "https://example.org/"
language = "Rust"

[subject.developer]
name = "Example Dev"
mbox = "dev@example.org"

[assertor]
iri = "https://example.org/suite"
name = "Example Suite"
description = "Conformance suite for \"LDP\" servers"

[[groups]]
id = "GroupATest"
title = "Group A"
description = "Basic container rules"
"#;

/// GroupA.testFoo (MUST, automated), GroupB.testBar (SHOULD, manual) and
/// GroupC.testBaz (indirect over GroupA MUST).
pub const SCENARIO_CATALOG: &str = r#"
[[tests]]
group = "org.example.GroupATest"
method = "testFoo"
levels = ["MUST"]
spec_ref = "https://example.org/spec#foo"
description = "Foo must work"

[[tests]]
group = "org.example.GroupBTest"
method = "testBar"
levels = ["SHOULD"]
implementation = "manual"
spec_ref = "https://example.org/spec#bar"

[[tests]]
group = "org.example.GroupCTest"
method = "testBaz"
spec_ref = "https://example.org/spec#baz"
description = "Baz follows from Foo"

[tests.coverage]
groups = ["GroupA"]
levels = ["MUST"]
"#;

pub fn config() -> SuiteConfig {
    parse_suite_config(CONFIG, "support").expect("config")
}

pub fn scenario_catalog() -> Catalog {
    parse_catalog(SCENARIO_CATALOG, "support", GroupSelection::all()).expect("catalog")
}

pub fn feed(passed: Vec<FeedEntry>, failed: Vec<FeedEntry>, skipped: Vec<FeedEntry>) -> SuiteResultsFeed {
    SuiteResultsFeed {
        suites: vec![SuiteResult {
            name: "support".to_string(),
            passed,
            failed,
            skipped,
        }],
    }
}

pub type TripleSet = BTreeSet<(String, String, String)>;

fn node_key(node: &Node) -> String {
    match node {
        Node::Iri(iri) => format!("<{iri}>"),
        Node::Blank(label) => format!("_:{label}"),
    }
}

fn literal_key(lexical: &str, datatype: Option<&str>, language: Option<&str>) -> String {
    match (language, datatype) {
        (Some(language), _) => format!("{lexical:?}@{language}"),
        (None, Some(datatype)) => format!("{lexical:?}^^<{datatype}>"),
        (None, None) => format!("{lexical:?}"),
    }
}

pub fn graph_triples(graph: &Graph) -> TripleSet {
    graph
        .triples()
        .iter()
        .map(|t| {
            let object = match &t.object {
                Term::Node(node) => node_key(node),
                Term::Literal(Literal {
                    lexical,
                    datatype,
                    language,
                }) => literal_key(lexical, datatype.as_deref(), language.as_deref()),
            };
            (node_key(&t.subject), format!("<{}>", t.predicate), object)
        })
        .collect()
}

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Parses Turtle with `oxttl` into the same keys as [`graph_triples`].
pub fn turtle_triples(text: &str) -> TripleSet {
    TurtleParser::new()
        .for_slice(text.as_bytes())
        .map(|triple| {
            let triple = triple.expect("valid turtle");
            let object = match &triple.object {
                oxrdf::Term::Literal(literal) => {
                    let datatype = literal.datatype();
                    let datatype = (literal.language().is_none() && datatype.as_str() != XSD_STRING)
                        .then(|| datatype.as_str());
                    literal_key(literal.value(), datatype, literal.language())
                }
                other => other.to_string(),
            };
            (triple.subject.to_string(), triple.predicate.to_string(), object)
        })
        .collect()
}

/// Reads a flattened JSON-LD document whose `@context` only holds prefixes.
pub fn parse_jsonld(text: &str) -> TripleSet {
    let doc: Value = serde_json::from_str(text).expect("json-ld");
    let prefixes: BTreeMap<String, String> = doc["@context"]
        .as_object()
        .expect("context")
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().expect("namespace").to_string()))
        .collect();
    let expand_iri = |value: &str| -> String {
        if let Some((prefix, local)) = value.split_once(':') {
            if let Some(ns) = prefixes.get(prefix) {
                return format!("{ns}{local}");
            }
        }
        value.to_string()
    };
    let node_key = |value: &str| -> String {
        if value.starts_with("_:") {
            value.to_string()
        } else {
            format!("<{}>", expand_iri(value))
        }
    };

    let mut triples = TripleSet::new();
    for node in doc["@graph"].as_array().expect("graph") {
        let object = node.as_object().expect("node object");
        let subject = node_key(object["@id"].as_str().expect("@id"));
        for (key, values) in object {
            if key == "@id" {
                continue;
            }
            for value in values.as_array().expect("value array") {
                if key == "@type" {
                    triples.insert((
                        subject.clone(),
                        format!("<{RDF_TYPE}>"),
                        node_key(value.as_str().expect("type")),
                    ));
                    continue;
                }
                let object = if let Some(id) = value.get("@id").and_then(Value::as_str) {
                    node_key(id)
                } else {
                    let lexical = value["@value"].as_str().expect("@value");
                    let datatype = value.get("@type").and_then(Value::as_str).map(&expand_iri);
                    let language = value.get("@language").and_then(Value::as_str);
                    literal_key(lexical, datatype.as_deref(), language)
                };
                triples.insert((subject.clone(), format!("<{}>", expand_iri(key)), object));
            }
        }
    }
    triples
}
