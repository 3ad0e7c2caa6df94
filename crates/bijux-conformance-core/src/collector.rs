// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use bijux_conformance_model::{
    CanonicalId, ExecutionOutcome, FeedEntry, Outcome, RequirementLevel, SuiteResultsFeed,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    UnknownDescriptor { id: CanonicalId },
    DuplicateOutcome { id: CanonicalId },
    IndirectOutcome { id: CanonicalId },
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDescriptor { id } => write!(f, "outcome for unknown test `{id}`"),
            Self::DuplicateOutcome { id } => write!(f, "second outcome recorded for `{id}`"),
            Self::IndirectOutcome { id } => {
                write!(f, "outcome recorded for indirect test `{id}`")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    Io { path: String, detail: String },
    Parse { path: String, detail: String },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, detail } => write!(f, "failed to read {path}: {detail}"),
            Self::Parse { path, detail } => write!(f, "failed to parse {path}: {detail}"),
        }
    }
}

impl std::error::Error for FeedError {}

pub fn load_feed(path: &Path) -> Result<SuiteResultsFeed, FeedError> {
    let text = fs::read_to_string(path).map_err(|err| FeedError::Io {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|err| FeedError::Parse {
        path: path.display().to_string(),
        detail: err.to_string(),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub recorded: usize,
    pub ignored: usize,
    pub level_mismatches: usize,
}

/// Accepts at most one outcome per executed test.
#[derive(Debug)]
pub struct OutcomeCollector<'c> {
    catalog: &'c Catalog,
    outcomes: BTreeMap<CanonicalId, ExecutionOutcome>,
}

impl<'c> OutcomeCollector<'c> {
    #[must_use]
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            outcomes: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, id: CanonicalId, outcome: ExecutionOutcome) -> Result<(), CollectorError> {
        let Some(descriptor) = self.catalog.get(&id) else {
            return Err(CollectorError::UnknownDescriptor { id });
        };
        if descriptor.is_indirect() {
            return Err(CollectorError::IndirectOutcome { id });
        }
        if self.outcomes.contains_key(&id) {
            return Err(CollectorError::DuplicateOutcome { id });
        }
        self.outcomes.insert(id, outcome);
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, id: &CanonicalId) -> Option<&ExecutionOutcome> {
        self.outcomes.get(id)
    }

    /// Records every entry of the feed, suite by suite, in passed, failed,
    /// skipped order. The first integrity error aborts the ingest.
    pub fn ingest_feed(&mut self, feed: &SuiteResultsFeed) -> Result<FeedStats, CollectorError> {
        let mut stats = FeedStats::default();
        for suite in &feed.suites {
            let lists = [
                (Outcome::Pass, &suite.passed),
                (Outcome::Fail, &suite.failed),
                (Outcome::Skip, &suite.skipped),
            ];
            for (outcome, entries) in lists {
                for entry in entries {
                    self.ingest_entry(&suite.name, outcome, entry, &mut stats)?;
                }
            }
        }
        Ok(stats)
    }

    fn ingest_entry(
        &mut self,
        suite: &str,
        outcome: Outcome,
        entry: &FeedEntry,
        stats: &mut FeedStats,
    ) -> Result<(), CollectorError> {
        if !self.catalog.selection().allows(&entry.group) {
            debug!(
                suite,
                group = %entry.group,
                method = %entry.method,
                "feed entry ignored by group selection"
            );
            stats.ignored += 1;
            return Ok(());
        }
        let id = entry.canonical_id();
        let reported = entry.requirement_levels();
        if let Some(descriptor) = self.catalog.get(&id) {
            let declared: Vec<RequirementLevel> = descriptor.levels().iter().copied().collect();
            if !reported.is_empty() && reported != declared {
                warn!(
                    id = %id,
                    reported = ?reported,
                    declared = ?declared,
                    "feed level tags disagree with the catalog"
                );
                stats.level_mismatches += 1;
            }
        }
        self.record(id, ExecutionOutcome::new(outcome, entry.message.clone()))?;
        stats.recorded += 1;
        Ok(())
    }

    /// Ends collection; resolution only accepts the closed set.
    #[must_use]
    pub fn close(self) -> ClosedOutcomes {
        ClosedOutcomes {
            outcomes: self.outcomes,
        }
    }
}

/// Read-only outcome set of a finished run.
#[derive(Debug, Clone, Default)]
pub struct ClosedOutcomes {
    outcomes: BTreeMap<CanonicalId, ExecutionOutcome>,
}

impl ClosedOutcomes {
    #[must_use]
    pub fn get(&self, id: &CanonicalId) -> Option<&ExecutionOutcome> {
        self.outcomes.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalId, &ExecutionOutcome)> {
        self.outcomes.iter()
    }
}
