// SPDX-License-Identifier: Apache-2.0

use crate::graph::{Graph, Literal, Node, Term};
use crate::vocab::rdf;

use super::by_subject;

/// Writes `graph` as Turtle: the prefix table, then one block per subject
/// with one predicate-object pair per line.
#[must_use]
pub fn write(graph: &Graph) -> String {
    let mut out = String::new();
    for (prefix, ns) in graph.prefixes() {
        out.push_str(&format!("@prefix {prefix}: <{}> .\n", escape_iri(ns)));
    }
    for (subject, triples) in by_subject(graph) {
        out.push('\n');
        out.push_str(&node(graph, subject));
        for (index, triple) in triples.iter().enumerate() {
            out.push_str(if index == 0 { " " } else { " ;\n    " });
            out.push_str(&predicate(graph, &triple.predicate));
            out.push(' ');
            out.push_str(&term(graph, &triple.object));
        }
        out.push_str(" .\n");
    }
    out
}

fn iri(graph: &Graph, value: &str) -> String {
    graph
        .compact(value)
        .unwrap_or_else(|| format!("<{}>", escape_iri(value)))
}

fn predicate(graph: &Graph, value: &str) -> String {
    if value == rdf::TYPE {
        "a".to_string()
    } else {
        iri(graph, value)
    }
}

fn node(graph: &Graph, value: &Node) -> String {
    match value {
        Node::Iri(value) => iri(graph, value),
        Node::Blank(label) => format!("_:{label}"),
    }
}

fn term(graph: &Graph, value: &Term) -> String {
    match value {
        Term::Node(value) => node(graph, value),
        Term::Literal(value) => literal(graph, value),
    }
}

fn literal(graph: &Graph, value: &Literal) -> String {
    let mut out = format!("\"{}\"", escape_string(&value.lexical));
    if let Some(language) = &value.language {
        out.push('@');
        out.push_str(language);
    } else if let Some(datatype) = &value.datatype {
        out.push_str("^^");
        out.push_str(&iri(graph, datatype));
    }
    out
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

fn escape_iri(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') || u32::from(c) <= 0x20 {
            out.push_str(&format!("\\u{:04X}", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Graph {
        Graph::new(vec![
            ("ex".to_string(), "http://example.org/".to_string()),
            ("rdf".to_string(), rdf::NS.to_string()),
        ])
    }

    #[test]
    fn subjects_are_grouped_with_a_for_rdf_type() {
        let mut g = graph();
        let a = Node::iri("http://example.org/a");
        g.add_type(&a, "http://example.org/Thing");
        g.add_literal(&a, "http://example.org/name", "A");
        let text = write(&g);
        assert!(text.starts_with("@prefix ex: <http://example.org/> .\n"));
        assert!(text.contains("\nex:a a ex:Thing ;\n    ex:name \"A\" .\n"));
    }

    #[test]
    fn unsafe_locals_fall_back_to_full_iris() {
        let mut g = graph();
        let a = Node::iri("http://example.org/has space");
        g.add(&a, "http://example.org/p", Node::iri("http://other.org/x"));
        let text = write(&g);
        assert!(text.contains("<http://example.org/has\\u0020space> ex:p <http://other.org/x> ."));
    }

    #[test]
    fn literals_are_escaped_and_typed() {
        let mut g = graph();
        let b = g.blank();
        g.add(&b, "http://example.org/msg", Literal::plain("line1\n\"quoted\""));
        g.add(
            &b,
            "http://example.org/at",
            Literal::typed("2024-01-01T00:00:00Z", "http://example.org/dateTime"),
        );
        let text = write(&g);
        assert!(text.contains("_:b0 ex:msg \"line1\\n\\\"quoted\\\"\""));
        assert!(text.contains("\"2024-01-01T00:00:00Z\"^^ex:dateTime"));
    }
}
