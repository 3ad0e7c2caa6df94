// SPDX-License-Identifier: Apache-2.0

//! One report run: collect, close, resolve, aggregate, render, write.

use std::fmt;
use std::path::Path;

use bijux_conformance_adapters::ArtifactSink;
use bijux_conformance_model::{ExitCode, SuiteResultsFeed};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::aggregate::{aggregate, AggregateReport, ReportContext};
use crate::artifacts::{render_artifacts, write_all, RenderedArtifacts, WriteReport};
use crate::catalog::{load_catalog, Catalog, CatalogError};
use crate::collector::{load_feed, CollectorError, FeedError, FeedStats, OutcomeCollector};
use crate::config::{load_suite_config, ConfigError, SuiteConfig};
use crate::earl::build_graph;
use crate::graph::Graph;
use crate::resolver::{resolve, UnresolvedCoverageWarning};

#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Catalog(CatalogError),
    Feed(FeedError),
    Collector(CollectorError),
    Encode(serde_json::Error),
}

impl EngineError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::Catalog(_) | Self::Feed(_) | Self::Collector(_) => {
                ExitCode::Validation
            }
            Self::Encode(_) => ExitCode::Internal,
        }
    }

    /// Stable machine code for structured error output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Catalog(_) => "catalog_error",
            Self::Feed(_) => "feed_error",
            Self::Collector(_) => "collector_error",
            Self::Encode(_) => "encode_error",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration: {err}"),
            Self::Catalog(err) => write!(f, "catalog: {err}"),
            Self::Feed(err) => write!(f, "results feed: {err}"),
            Self::Collector(err) => write!(f, "outcomes: {err}"),
            Self::Encode(err) => write!(f, "encoding: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Feed(err) => Some(err),
            Self::Collector(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<CatalogError> for EngineError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<FeedError> for EngineError {
    fn from(value: FeedError) -> Self {
        Self::Feed(value)
    }
}

impl From<CollectorError> for EngineError {
    fn from(value: CollectorError) -> Self {
        Self::Collector(value)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub config: SuiteConfig,
    pub catalog: Catalog,
    pub feed: SuiteResultsFeed,
}

/// Loads the configuration first; its group selection applies to the
/// catalog.
pub fn load_inputs(
    config_path: &Path,
    catalog_path: &Path,
    results_path: &Path,
) -> Result<ReportInputs, EngineError> {
    let config = load_suite_config(config_path)?;
    let catalog = load_catalog(catalog_path, config.selection.clone())?;
    let feed = load_feed(results_path)?;
    info!(
        descriptors = catalog.len(),
        suites = feed.suites.len(),
        "report inputs loaded"
    );
    Ok(ReportInputs {
        config,
        catalog,
        feed,
    })
}

#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub aggregate: AggregateReport,
    pub graph: Graph,
    pub artifacts: RenderedArtifacts,
    pub feed: FeedStats,
    pub warnings: Vec<UnresolvedCoverageWarning>,
}

/// Everything up to, but not including, writing artifacts.
pub fn prepare_report(
    config: &SuiteConfig,
    catalog: &Catalog,
    feed: &SuiteResultsFeed,
    timestamp: &DateTime<Utc>,
) -> Result<PreparedReport, EngineError> {
    let mut collector = OutcomeCollector::new(catalog);
    let feed_stats = collector.ingest_feed(feed)?;
    let outcomes = collector.close();
    info!(
        recorded = feed_stats.recorded,
        ignored = feed_stats.ignored,
        level_mismatches = feed_stats.level_mismatches,
        "outcomes collected"
    );

    let resolution = resolve(catalog, &outcomes);
    info!(
        resolved = resolution.resolved_count(),
        unresolved = resolution.warnings().len(),
        "indirect coverage resolved"
    );

    let context = ReportContext::from_config(config, timestamp);
    let report = aggregate(catalog, &outcomes, &resolution, &context);
    info!(
        total = report.totals.counts.total,
        pass = report.totals.counts.pass,
        fail = report.totals.counts.fail,
        skip = report.totals.counts.skip,
        unresolved = report.totals.counts.unresolved,
        "aggregate computed"
    );

    let graph = build_graph(catalog, &outcomes, &resolution, config, timestamp);
    info!(triples = graph.len(), "assertion graph built");

    let artifacts = render_artifacts(&graph, &report, &config.report)?;
    Ok(PreparedReport {
        aggregate: report,
        graph,
        artifacts,
        feed: feed_stats,
        warnings: resolution.warnings().to_vec(),
    })
}

#[derive(Debug, Clone)]
pub struct ReportRun {
    pub prepared: PreparedReport,
    pub writes: WriteReport,
}

impl ReportRun {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.writes.is_success() {
            ExitCode::Success
        } else {
            ExitCode::DependencyFailure
        }
    }
}

/// Runs the whole pipeline once. Integrity errors abort before anything is
/// written; artifact failures are reported in [`ReportRun::writes`].
pub fn run_report(
    config: &SuiteConfig,
    catalog: &Catalog,
    feed: &SuiteResultsFeed,
    timestamp: &DateTime<Utc>,
    sink: &dyn ArtifactSink,
) -> Result<ReportRun, EngineError> {
    let prepared = prepare_report(config, catalog, feed, timestamp)?;
    let writes = write_all(sink, &prepared.artifacts);
    info!(
        written = writes.written.len(),
        failed = writes.failed.len(),
        "report run finished"
    );
    Ok(ReportRun { prepared, writes })
}
