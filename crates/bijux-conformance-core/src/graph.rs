// SPDX-License-Identifier: Apache-2.0

//! In-memory triple set shared by both serializers.

use std::collections::BTreeSet;

use crate::vocab::rdf;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Iri(String),
    /// Blank node label without the `_:` marker.
    Blank(String),
}

impl Node {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: &str) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.to_string()),
            language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Node(Node),
    Literal(Literal),
}

impl From<Node> for Term {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<&Node> for Term {
    fn from(value: &Node) -> Self {
        Self::Node(value.clone())
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Node,
    pub predicate: String,
    pub object: Term,
}

/// Insertion-ordered set of triples plus the prefix table used to write it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    prefixes: Vec<(String, String)>,
    triples: Vec<Triple>,
    seen: BTreeSet<Triple>,
    next_blank: usize,
}

impl Graph {
    #[must_use]
    pub fn new(prefixes: Vec<(String, String)>) -> Self {
        Self {
            prefixes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    #[must_use]
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Allocates the next blank node. Labels are `b0`, `b1`, ... in
    /// allocation order, so identical build sequences give identical labels.
    pub fn blank(&mut self) -> Node {
        let node = Node::Blank(format!("b{}", self.next_blank));
        self.next_blank += 1;
        node
    }

    /// Adds a triple; a triple already in the graph is not added twice.
    pub fn add(&mut self, subject: &Node, predicate: &str, object: impl Into<Term>) {
        let triple = Triple {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object: object.into(),
        };
        if self.seen.insert(triple.clone()) {
            self.triples.push(triple);
        }
    }

    pub fn add_type(&mut self, subject: &Node, class: &str) {
        self.add(subject, rdf::TYPE, Node::iri(class));
    }

    pub fn add_literal(&mut self, subject: &Node, predicate: &str, value: &str) {
        self.add(subject, predicate, Literal::plain(value));
    }

    /// Adds a plain literal only when a non-blank value is present.
    pub fn add_optional_literal(&mut self, subject: &Node, predicate: &str, value: Option<&str>) {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.add_literal(subject, predicate, value);
        }
    }

    pub fn add_optional_iri(&mut self, subject: &Node, predicate: &str, value: Option<&str>) {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.add(subject, predicate, Node::iri(value));
        }
    }

    /// Links `subject` to an RDF collection holding `items` in order.
    pub fn add_list(&mut self, subject: &Node, predicate: &str, items: &[Node]) {
        if items.is_empty() {
            self.add(subject, predicate, Node::iri(rdf::NIL));
            return;
        }
        let cells: Vec<Node> = items.iter().map(|_| self.blank()).collect();
        self.add(subject, predicate, &cells[0]);
        for (index, (cell, item)) in cells.iter().zip(items).enumerate() {
            self.add(cell, rdf::FIRST, item);
            match cells.get(index + 1) {
                Some(next) => self.add(cell, rdf::REST, next),
                None => self.add(cell, rdf::REST, Node::iri(rdf::NIL)),
            }
        }
    }

    /// Distinct subjects in the order they first appear.
    #[must_use]
    pub fn subjects(&self) -> Vec<&Node> {
        let mut seen = BTreeSet::new();
        self.triples
            .iter()
            .filter(|t| seen.insert(&t.subject))
            .map(|t| &t.subject)
            .collect()
    }

    pub fn triples_for<'a>(&'a self, subject: &'a Node) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Compact `prefix:local` form of `iri`, when the local part is safe to
    /// write unescaped.
    #[must_use]
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes.iter().find_map(|(prefix, ns)| {
            let local = iri.strip_prefix(ns.as_str())?;
            is_safe_local(local).then(|| format!("{prefix}:{local}"))
        })
    }
}

fn is_safe_local(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
