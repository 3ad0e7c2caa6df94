// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Map, Value};

use crate::graph::{Graph, Literal, Node, Term};
use crate::vocab::rdf;

use super::by_subject;

/// Writes `graph` as flattened JSON-LD: the prefix table as `@context` and
/// one `@graph` node object per subject.
pub fn write(graph: &Graph) -> Result<String, serde_json::Error> {
    let context: Map<String, Value> = graph
        .prefixes()
        .iter()
        .map(|(prefix, ns)| (prefix.clone(), Value::String(ns.clone())))
        .collect();
    let nodes: Vec<Value> = by_subject(graph)
        .into_iter()
        .map(|(subject, triples)| {
            let mut object = Map::new();
            object.insert("@id".to_string(), Value::String(node_id(subject)));
            for triple in triples {
                let (key, value) = match &triple.object {
                    Term::Node(Node::Iri(class)) if triple.predicate == rdf::TYPE => {
                        ("@type".to_string(), Value::String(compact(graph, class)))
                    }
                    other => (compact(graph, &triple.predicate), term(graph, other)),
                };
                if let Value::Array(values) = object
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    values.push(value);
                }
            }
            Value::Object(object)
        })
        .collect();
    let document = json!({
        "@context": Value::Object(context),
        "@graph": nodes,
    });
    let mut text = serde_json::to_string_pretty(&document)?;
    text.push('\n');
    Ok(text)
}

fn compact(graph: &Graph, iri: &str) -> String {
    graph.compact(iri).unwrap_or_else(|| iri.to_string())
}

fn node_id(node: &Node) -> String {
    match node {
        Node::Iri(iri) => iri.clone(),
        Node::Blank(label) => format!("_:{label}"),
    }
}

fn term(graph: &Graph, value: &Term) -> Value {
    match value {
        Term::Node(node) => json!({ "@id": node_id(node) }),
        Term::Literal(literal) => literal_value(graph, literal),
    }
}

fn literal_value(graph: &Graph, literal: &Literal) -> Value {
    let mut object = Map::new();
    object.insert("@value".to_string(), Value::String(literal.lexical.clone()));
    if let Some(language) = &literal.language {
        object.insert("@language".to_string(), Value::String(language.clone()));
    } else if let Some(datatype) = &literal.datatype {
        object.insert("@type".to_string(), Value::String(compact(graph, datatype)));
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_objects_hold_types_ids_and_literals() {
        let mut graph = Graph::new(vec![
            ("ex".to_string(), "http://example.org/".to_string()),
            ("rdf".to_string(), rdf::NS.to_string()),
        ]);
        let a = Node::iri("http://example.org/a");
        let b = graph.blank();
        graph.add_type(&a, "http://example.org/Thing");
        graph.add(&a, "http://example.org/link", &b);
        graph.add(
            &b,
            "http://example.org/at",
            Literal::typed("2024-01-01T00:00:00Z", "http://example.org/dateTime"),
        );
        let text = write(&graph).expect("jsonld");
        let doc: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(doc["@context"]["ex"], "http://example.org/");
        let nodes = doc["@graph"].as_array().expect("graph");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["@id"], "http://example.org/a");
        assert_eq!(nodes[0]["@type"], json!(["ex:Thing"]));
        assert_eq!(nodes[0]["ex:link"], json!([{"@id": "_:b0"}]));
        assert_eq!(
            nodes[1]["ex:at"],
            json!([{"@value": "2024-01-01T00:00:00Z", "@type": "ex:dateTime"}])
        );
    }
}
