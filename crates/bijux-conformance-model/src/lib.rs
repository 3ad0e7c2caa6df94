// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Shared vocabulary of the conformance report engine: descriptors, outcomes,
//! the outcome feed, and canonical identity.

mod descriptor;
mod errors;
mod feed;
mod ids;
mod outcome;

pub use descriptor::{
    BucketLevel, CoverageSpec, DescriptorBuilder, ImplementationMethod, RequirementLevel,
    ReviewStatus, TestDescriptor,
};
pub use errors::{Error, ExitCode, MachineError, Result};
pub use feed::{suite_results_json_schema, FeedEntry, SuiteResult, SuiteResultsFeed};
pub use ids::{
    canonical_id, group_simple_name, group_stem, method_stem, CanonicalId, GROUP_SUFFIX,
    METHOD_PREFIX,
};
pub use outcome::{EarlOutcome, ExecutionMode, ExecutionOutcome, Outcome};

pub const CRATE_NAME: &str = "bijux-conformance-model";
