// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bijux_conformance_model::group_stem;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::GroupSelection;

pub const DEFAULT_DASHBOARD: &str = "conformance-report.html";
pub const DEFAULT_BASENAME: &str = "conformance-earl";
pub const DEFAULT_TITLE: &str = "Conformance report";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, detail: String },
    Parse { path: String, detail: String },
    Invalid { field: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, detail } => write!(f, "failed to read {path}: {detail}"),
            Self::Parse { path, detail } => write!(f, "failed to parse {path}: {detail}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSettings {
    pub title: String,
    pub output_dir: PathBuf,
    pub basename: String,
    pub dashboard: String,
}

impl ReportSettings {
    #[must_use]
    pub fn turtle_file(&self) -> String {
        format!("{}.ttl", self.basename)
    }

    #[must_use]
    pub fn jsonld_file(&self) -> String {
        format!("{}.jsonld", self.basename)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeveloperInfo {
    pub iri: Option<String>,
    pub name: Option<String>,
    pub mbox: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectInfo {
    pub iri: String,
    pub name: String,
    pub homepage: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub developer: Option<DeveloperInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertorInfo {
    pub iri: String,
    pub name: String,
    pub homepage: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Everything a run needs besides the catalog and the outcome feed.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub report: ReportSettings,
    pub namespace: String,
    pub subject: SubjectInfo,
    pub assertor: AssertorInfo,
    pub groups: Vec<GroupInfo>,
    pub selection: GroupSelection,
}

impl SuiteConfig {
    #[must_use]
    pub fn group_info(&self, group: &str) -> GroupInfo {
        lookup_group_info(&self.groups, group)
    }
}

/// Title and description for `group`; groups without a configured entry are
/// titled by their stem.
#[must_use]
pub fn lookup_group_info(groups: &[GroupInfo], group: &str) -> GroupInfo {
    let stem = group_stem(group);
    groups
        .iter()
        .find(|info| group_stem(&info.id) == stem)
        .cloned()
        .unwrap_or_else(|| GroupInfo {
            id: group.to_string(),
            title: stem.to_string(),
            description: String::new(),
        })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    report: RawReport,
    suite: RawSuite,
    subject: RawSubject,
    assertor: RawAssertor,
    #[serde(default)]
    groups: Vec<RawGroup>,
    #[serde(default)]
    selection: RawSelection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    title: Option<String>,
    output_dir: Option<PathBuf>,
    basename: Option<String>,
    dashboard: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSuite {
    namespace: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSubject {
    iri: String,
    name: String,
    homepage: Option<String>,
    description: Option<String>,
    language: Option<String>,
    developer: Option<RawDeveloper>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeveloper {
    iri: Option<String>,
    name: Option<String>,
    mbox: Option<String>,
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAssertor {
    iri: String,
    name: String,
    homepage: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSelection {
    #[serde(default)]
    include_groups: Vec<String>,
    #[serde(default)]
    exclude_groups: Vec<String>,
}

fn parse_iri(field: &str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if !value.contains(':') || value.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return Err(invalid(field, format!("`{value}` is not an absolute IRI")));
    }
    Ok(value.to_string())
}

fn parse_optional_iri(field: &str, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_iri(field, value).map(Some),
    }
}

fn parse_optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_required_text(field: &str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(value.to_string())
}

fn parse_file_name(field: &str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    if value.is_empty() || value == "." || value == ".." {
        return Err(invalid(field, "must name a file"));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(invalid(field, "must be a bare file name"));
    }
    Ok(value.to_string())
}

fn parse_mbox(raw: Option<String>) -> Result<Option<String>, ConfigError> {
    match parse_optional_text(raw) {
        None => Ok(None),
        Some(value) if value.starts_with("mailto:") => parse_iri("subject.developer.mbox", &value).map(Some),
        Some(value) if value.contains('@') => Ok(Some(format!("mailto:{value}"))),
        Some(value) => Err(invalid(
            "subject.developer.mbox",
            format!("`{value}` is not a mail address"),
        )),
    }
}

/// Parses a suite configuration; `origin` names the source in error
/// messages.
pub fn parse_suite_config(text: &str, origin: &str) -> Result<SuiteConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(text).map_err(|err| ConfigError::Parse {
        path: origin.to_string(),
        detail: err.to_string(),
    })?;

    let namespace = parse_iri("suite.namespace", &raw.suite.namespace)?;
    if !namespace.ends_with('#') && !namespace.ends_with('/') {
        return Err(invalid("suite.namespace", "must end with `#` or `/`"));
    }

    let report = ReportSettings {
        title: parse_optional_text(raw.report.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        output_dir: raw.report.output_dir.unwrap_or_else(|| PathBuf::from(".")),
        basename: parse_file_name(
            "report.basename",
            raw.report.basename.as_deref().unwrap_or(DEFAULT_BASENAME),
        )?,
        dashboard: parse_file_name(
            "report.dashboard",
            raw.report.dashboard.as_deref().unwrap_or(DEFAULT_DASHBOARD),
        )?,
    };
    if report.dashboard == report.turtle_file() || report.dashboard == report.jsonld_file() {
        return Err(invalid(
            "report.dashboard",
            "must differ from the assertion graph file names",
        ));
    }

    let developer = match raw.subject.developer {
        None => None,
        Some(dev) => Some(DeveloperInfo {
            iri: parse_optional_iri("subject.developer.iri", dev.iri)?,
            name: parse_optional_text(dev.name),
            mbox: parse_mbox(dev.mbox)?,
            homepage: parse_optional_iri("subject.developer.homepage", dev.homepage)?,
        }),
    };
    let subject = SubjectInfo {
        iri: parse_iri("subject.iri", &raw.subject.iri)?,
        name: parse_required_text("subject.name", &raw.subject.name)?,
        homepage: parse_optional_iri("subject.homepage", raw.subject.homepage)?,
        description: parse_optional_text(raw.subject.description),
        language: parse_optional_text(raw.subject.language),
        developer,
    };
    let assertor = AssertorInfo {
        iri: parse_iri("assertor.iri", &raw.assertor.iri)?,
        name: parse_required_text("assertor.name", &raw.assertor.name)?,
        homepage: parse_optional_iri("assertor.homepage", raw.assertor.homepage)?,
        description: parse_optional_text(raw.assertor.description),
    };
    let groups = raw
        .groups
        .into_iter()
        .map(|row| {
            Ok(GroupInfo {
                id: parse_required_text("groups.id", &row.id)?,
                title: parse_required_text("groups.title", &row.title)?,
                description: row.description.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(SuiteConfig {
        report,
        namespace,
        subject,
        assertor,
        groups,
        selection: GroupSelection::new(raw.selection.include_groups, raw.selection.exclude_groups),
    })
}

pub fn load_suite_config(path: &Path) -> Result<SuiteConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    parse_suite_config(&text, &path.display().to_string())
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| invalid("timestamp", format!("`{}`: {err}", raw.trim())))
}

/// RFC 3339 form written into both artifacts.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[suite]
namespace = "https://example.org/ldp/tests#"

[subject]
iri = "https://example.org/server"
name = "Example Server"

[assertor]
iri = "https://example.org/suite"
name = "Example Suite"
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse_suite_config(MINIMAL, "inline").expect("config");
        assert_eq!(config.report.dashboard, DEFAULT_DASHBOARD);
        assert_eq!(config.report.turtle_file(), "conformance-earl.ttl");
        assert_eq!(config.report.output_dir, PathBuf::from("."));
        assert!(config.subject.developer.is_none());
        assert!(config.selection.allows("AnyGroupTest"));
        assert_eq!(config.group_info("org.example.GroupATest").title, "GroupA");
    }

    #[test]
    fn namespace_must_be_a_prefix_iri() {
        let text = MINIMAL.replace("tests#", "tests");
        let err = parse_suite_config(&text, "inline").expect_err("must fail");
        assert!(err.to_string().contains("suite.namespace"));
    }

    #[test]
    fn developer_mbox_gains_mailto() {
        let text = format!(
            "{MINIMAL}\n[subject.developer]\nname = \"Dev\"\nmbox = \"dev@example.org\"\n"
        );
        let config = parse_suite_config(&text, "inline").expect("config");
        let developer = config.subject.developer.expect("developer");
        assert_eq!(developer.mbox.as_deref(), Some("mailto:dev@example.org"));
        assert_eq!(developer.iri, None);
    }

    #[test]
    fn group_titles_match_by_stem() {
        let text = format!(
            "{MINIMAL}\n[[groups]]\nid = \"GroupATest\"\ntitle = \"Basic containers\"\ndescription = \"Container rules\"\n"
        );
        let config = parse_suite_config(&text, "inline").expect("config");
        assert_eq!(config.group_info("GroupA").title, "Basic containers");
    }

    #[test]
    fn artifact_names_are_bare_and_distinct() {
        let text = format!("[report]\nbasename = \"out/earl\"\n{MINIMAL}");
        assert!(parse_suite_config(&text, "inline").is_err());
        let text = format!("[report]\nbasename = \"earl\"\ndashboard = \"earl.ttl\"\n{MINIMAL}");
        assert!(parse_suite_config(&text, "inline").is_err());
    }

    #[test]
    fn timestamps_round_trip_in_utc() {
        let ts = parse_timestamp("2024-03-01T12:30:00+02:00").expect("timestamp");
        assert_eq!(format_timestamp(&ts), "2024-03-01T10:30:00Z");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
