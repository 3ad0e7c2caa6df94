// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Aggregation and reporting engine for conformance runs: catalog, outcome
//! collection, indirect coverage resolution, aggregation, the EARL assertion
//! graph with its Turtle and JSON-LD writers, and the HTML dashboard.

use sha2::{Digest, Sha256};

pub mod aggregate;
pub mod artifacts;
pub mod catalog;
pub mod codec;
pub mod collector;
pub mod config;
pub mod dashboard;
pub mod earl;
pub mod engine;
pub mod graph;
pub mod resolver;
pub mod summary;
pub mod vocab;

pub use aggregate::{
    aggregate, AggregateBucket, AggregateReport, Breakdown, GroupSummary, LevelSummary,
    OutcomeCounts, ReportContext, RequirementCounts, TestEntry, UnresolvedEntry,
    UnresolvedReason,
};
pub use artifacts::{
    render_artifacts, write_all, ArtifactError, ArtifactKind, RenderedArtifacts, WriteReport,
};
pub use catalog::{load_catalog, parse_catalog, Catalog, CatalogBuilder, CatalogError, GroupSelection};
pub use collector::{
    load_feed, ClosedOutcomes, CollectorError, FeedError, FeedStats, OutcomeCollector,
};
pub use config::{load_suite_config, parse_suite_config, ConfigError, SuiteConfig};
pub use dashboard::render_dashboard;
pub use earl::{build_graph, AssertionRecord};
pub use engine::{
    load_inputs, prepare_report, run_report, EngineError, PreparedReport, ReportInputs, ReportRun,
};
pub use graph::Graph;
pub use resolver::{resolve, resolve_outcome, Resolution, ResolvedOutcome, UnresolvedCoverageWarning};

pub const CRATE_NAME: &str = "bijux-conformance-core";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
