// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::ImplementationMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
}

impl Outcome {
    pub const ALL: [Self; 3] = [Self::Pass, Self::Fail, Self::Skip];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }

    /// Rank used when several outcomes stand in for one requirement:
    /// fail beats pass, pass beats skip.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Fail => 2,
            Self::Pass => 1,
            Self::Skip => 0,
        }
    }

    #[must_use]
    pub const fn earl(self) -> EarlOutcome {
        match self {
            Self::Pass => EarlOutcome::Passed,
            Self::Fail => EarlOutcome::Failed,
            Self::Skip => EarlOutcome::Untested,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result recorded for a test that actually executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn pass() -> Self {
        Self {
            outcome: Outcome::Pass,
            diagnostic: None,
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail,
            diagnostic: Some(message.into()),
        }
    }

    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Skip,
            diagnostic: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn new(outcome: Outcome, diagnostic: Option<String>) -> Self {
        Self {
            outcome,
            diagnostic: diagnostic.filter(|text| !text.trim().is_empty()),
        }
    }
}

/// Closed EARL outcome set used by the assertion graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EarlOutcome {
    Passed,
    Failed,
    Untested,
}

impl EarlOutcome {
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Untested => "untested",
        }
    }
}

/// Closed EARL mode set used by the assertion graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    Automatic,
    Manual,
    NotTested,
}

impl ExecutionMode {
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
            Self::NotTested => "notTested",
        }
    }
}

impl From<ImplementationMethod> for ExecutionMode {
    fn from(value: ImplementationMethod) -> Self {
        match value {
            ImplementationMethod::Automated | ImplementationMethod::Indirect => Self::Automatic,
            ImplementationMethod::Manual => Self::Manual,
            ImplementationMethod::ClientOnly | ImplementationMethod::NotImplemented => {
                Self::NotTested
            }
        }
    }
}
