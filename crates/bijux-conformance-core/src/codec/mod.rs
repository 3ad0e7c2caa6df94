// SPDX-License-Identifier: Apache-2.0

//! Stateless writers over one [`Graph`](crate::graph::Graph) snapshot.
//!
//! Both writers emit subjects in first-seen order and keep blank node labels
//! as allocated, so the two documents describe the same triple set.

pub mod jsonld;
pub mod turtle;

use std::collections::BTreeMap;

use crate::graph::{Graph, Node, Triple};

/// Triples grouped by subject, subjects in first-seen order.
fn by_subject(graph: &Graph) -> Vec<(&Node, Vec<&Triple>)> {
    let mut order: Vec<&Node> = Vec::new();
    let mut grouped: BTreeMap<&Node, Vec<&Triple>> = BTreeMap::new();
    for triple in graph.triples() {
        let rows = grouped.entry(&triple.subject).or_insert_with(|| {
            order.push(&triple.subject);
            Vec::new()
        });
        rows.push(triple);
    }
    order
        .into_iter()
        .map(|subject| (subject, grouped.remove(subject).unwrap_or_default()))
        .collect()
}
