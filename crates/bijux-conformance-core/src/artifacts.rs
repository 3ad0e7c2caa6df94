// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use bijux_conformance_adapters::{AdapterError, ArtifactSink};
use serde::Serialize;
use tracing::{error, info};

use crate::aggregate::AggregateReport;
use crate::codec::{jsonld, turtle};
use crate::config::ReportSettings;
use crate::dashboard::render_dashboard;
use crate::graph::Graph;
use crate::sha256_hex;

pub type ArtifactError = AdapterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Turtle,
    JsonLd,
    Dashboard,
}

impl ArtifactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Turtle => "turtle",
            Self::JsonLd => "json_ld",
            Self::Dashboard => "dashboard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub items: Vec<RenderedArtifact>,
}

impl RenderedArtifacts {
    #[must_use]
    pub fn get(&self, kind: ArtifactKind) -> Option<&RenderedArtifact> {
        self.items.iter().find(|item| item.kind == kind)
    }
}

/// Renders the three artifacts of a run in memory.
pub fn render_artifacts(
    graph: &Graph,
    report: &AggregateReport,
    settings: &ReportSettings,
) -> Result<RenderedArtifacts, serde_json::Error> {
    Ok(RenderedArtifacts {
        items: vec![
            RenderedArtifact {
                kind: ArtifactKind::Turtle,
                file_name: settings.turtle_file(),
                content: turtle::write(graph),
            },
            RenderedArtifact {
                kind: ArtifactKind::JsonLd,
                file_name: settings.jsonld_file(),
                content: jsonld::write(graph)?,
            },
            RenderedArtifact {
                kind: ArtifactKind::Dashboard,
                file_name: settings.dashboard.clone(),
                content: render_dashboard(report),
            },
        ],
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArtifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub error: ArtifactError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<WrittenArtifact>,
    pub failed: Vec<FailedArtifact>,
}

impl WriteReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes every artifact through `sink`. A failed write does not stop the
/// remaining ones.
pub fn write_all(sink: &dyn ArtifactSink, artifacts: &RenderedArtifacts) -> WriteReport {
    let mut report = WriteReport::default();
    for artifact in &artifacts.items {
        match sink.write_artifact(&artifact.file_name, &artifact.content) {
            Ok(path) => {
                info!(kind = artifact.kind.as_str(), path = %path.display(), "artifact written");
                report.written.push(WrittenArtifact {
                    kind: artifact.kind,
                    path,
                    bytes: artifact.content.len(),
                    sha256: sha256_hex(artifact.content.as_bytes()),
                });
            }
            Err(err) => {
                error!(kind = artifact.kind.as_str(), file = %artifact.file_name, error = %err, "artifact write failed");
                report.failed.push(FailedArtifact {
                    kind: artifact.kind,
                    file_name: artifact.file_name.clone(),
                    error: err,
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use bijux_conformance_adapters::MemorySink;
    use std::path::Path;

    struct RejectTurtle(MemorySink);

    impl ArtifactSink for RejectTurtle {
        fn write_artifact(&self, file_name: &str, content: &str) -> Result<PathBuf, AdapterError> {
            if file_name.ends_with(".ttl") {
                return Err(AdapterError::Io {
                    op: "write",
                    path: Path::new(file_name).to_path_buf(),
                    detail: "disk full".to_string(),
                });
            }
            self.0.write_artifact(file_name, content)
        }
    }

    fn artifacts() -> RenderedArtifacts {
        let item = |kind, file_name: &str| RenderedArtifact {
            kind,
            file_name: file_name.to_string(),
            content: format!("{file_name} body"),
        };
        RenderedArtifacts {
            items: vec![
                item(ArtifactKind::Turtle, "r.ttl"),
                item(ArtifactKind::JsonLd, "r.jsonld"),
                item(ArtifactKind::Dashboard, "r.html"),
            ],
        }
    }

    #[test]
    fn one_failed_write_leaves_the_others_written() {
        let sink = RejectTurtle(MemorySink::new());
        let report = write_all(&sink, &artifacts());
        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].kind, ArtifactKind::Turtle);
        assert_eq!(report.written.len(), 2);
        assert_eq!(sink.0.get("r.html").as_deref(), Some("r.html body"));
    }

    #[test]
    fn written_artifacts_carry_their_digest() {
        let sink = MemorySink::new();
        let report = write_all(&sink, &artifacts());
        assert!(report.is_success());
        assert_eq!(report.written[0].sha256, sha256_hex(b"r.ttl body"));
        assert_eq!(report.written[0].bytes, "r.ttl body".len());
    }
}
