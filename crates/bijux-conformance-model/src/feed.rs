// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::descriptor::RequirementLevel;
use crate::ids::{canonical_id, CanonicalId};

/// Read-only outcome feed handed over by the test execution driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteResultsFeed {
    pub suites: Vec<SuiteResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteResult {
    pub name: String,
    #[serde(default)]
    pub passed: Vec<FeedEntry>,
    #[serde(default)]
    pub failed: Vec<FeedEntry>,
    #[serde(default)]
    pub skipped: Vec<FeedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedEntry {
    pub group: String,
    pub method: String,
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeedEntry {
    #[must_use]
    pub fn new(group: &str, method: &str) -> Self {
        Self {
            group: group.to_string(),
            method: method.to_string(),
            levels: Vec::new(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_levels(mut self, levels: &[&str]) -> Self {
        self.levels = levels.iter().map(|v| (*v).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn canonical_id(&self) -> CanonicalId {
        canonical_id(&self.group, &self.method)
    }

    /// Requirement levels among the reported tags; other runner groups are
    /// ignored.
    #[must_use]
    pub fn requirement_levels(&self) -> Vec<RequirementLevel> {
        let mut out: Vec<RequirementLevel> = self
            .levels
            .iter()
            .filter_map(|tag| RequirementLevel::from_tag(tag))
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

pub fn suite_results_json_schema() -> Value {
    let entry = json!({
        "type": "object",
        "required": ["group", "method"],
        "additionalProperties": false,
        "properties": {
            "group": {"type": "string", "minLength": 1},
            "method": {"type": "string", "minLength": 1},
            "levels": {"type": "array", "items": {"type": "string"}},
            "message": {"type": "string"}
        }
    });
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "bijux-conformance suite results feed",
        "type": "object",
        "required": ["suites"],
        "properties": {
            "suites": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "additionalProperties": false,
                    "properties": {
                        "name": {"type": "string"},
                        "passed": {"type": "array", "items": entry.clone()},
                        "failed": {"type": "array", "items": entry.clone()},
                        "skipped": {"type": "array", "items": entry}
                    }
                }
            }
        }
    })
}
