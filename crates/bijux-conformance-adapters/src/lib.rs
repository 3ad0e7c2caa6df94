// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    EffectDenied {
        effect: &'static str,
        detail: String,
    },
    PathViolation {
        path: PathBuf,
        detail: String,
    },
    Io {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EffectDenied { effect, detail } => {
                write!(f, "effect denied: {effect} ({detail})")
            }
            Self::PathViolation { path, detail } => {
                write!(f, "path violation: {} ({detail})", path.display())
            }
            Self::Io { op, path, detail } => {
                write!(f, "io error: {op} {} ({detail})", path.display())
            }
        }
    }
}

impl std::error::Error for AdapterError {}

/// Destination for rendered report artifacts.
pub trait ArtifactSink {
    /// Writes `content` as `file_name` and returns where it landed. A failed
    /// write must not leave a complete-looking file behind.
    fn write_artifact(&self, file_name: &str, content: &str) -> Result<PathBuf, AdapterError>;
}

/// Resolves `file_name` under `root`, creating the directories on the way.
/// Absolute names and `..` components are rejected.
pub fn ensure_write_path_under_root(root: &Path, file_name: &Path) -> Result<PathBuf, AdapterError> {
    if file_name.is_absolute()
        || file_name
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
    {
        return Err(AdapterError::PathViolation {
            path: file_name.to_path_buf(),
            detail: format!("writes allowed only under {}", root.display()),
        });
    }
    if normalize_path(file_name).as_os_str().is_empty() {
        return Err(AdapterError::PathViolation {
            path: file_name.to_path_buf(),
            detail: "artifact file name is empty".to_string(),
        });
    }

    let target = root.join(file_name);
    let parent = target.parent().unwrap_or(root).to_path_buf();
    fs::create_dir_all(&parent).map_err(|err| AdapterError::Io {
        op: "create_dir_all",
        path: parent,
        detail: err.to_string(),
    })?;
    Ok(target)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Writes each artifact to a temporary file next to its destination and
/// renames it into place once the content is flushed and synced.
#[derive(Debug, Clone)]
pub struct AtomicFileSink {
    root: PathBuf,
}

impl AtomicFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for AtomicFileSink {
    fn write_artifact(&self, file_name: &str, content: &str) -> Result<PathBuf, AdapterError> {
        let target = ensure_write_path_under_root(&self.root, Path::new(file_name))?;
        let parent = target.parent().unwrap_or(&self.root).to_path_buf();
        let io_err = |op: &'static str, path: &Path, err: std::io::Error| AdapterError::Io {
            op,
            path: path.to_path_buf(),
            detail: err.to_string(),
        };

        // The temp file is deleted on drop, so every early return below
        // cleans up after itself.
        let mut staged = tempfile::Builder::new()
            .prefix(".bijux-conformance-")
            .suffix(".partial")
            .tempfile_in(&parent)
            .map_err(|err| io_err("create_temp", &parent, err))?;
        staged
            .write_all(content.as_bytes())
            .map_err(|err| io_err("write", staged.path(), err))?;
        staged
            .flush()
            .map_err(|err| io_err("flush", staged.path(), err))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|err| io_err("sync", staged.path(), err))?;
        staged
            .persist(&target)
            .map_err(|err| io_err("persist", &target, err.error))?;

        debug!(path = %target.display(), bytes = content.len(), "artifact persisted");
        Ok(target)
    }
}

/// Keeps artifacts in memory, keyed by file name.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: RefCell<BTreeMap<String, String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<String> {
        self.files.borrow().get(file_name).cloned()
    }

    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl ArtifactSink for MemorySink {
    fn write_artifact(&self, file_name: &str, content: &str) -> Result<PathBuf, AdapterError> {
        if file_name.trim().is_empty() {
            return Err(AdapterError::PathViolation {
                path: PathBuf::from(file_name),
                detail: "artifact file name is empty".to_string(),
            });
        }
        self.files
            .borrow_mut()
            .insert(file_name.to_string(), content.to_string());
        Ok(PathBuf::from(file_name))
    }
}

/// Refuses every write; used when artifacts must not touch the filesystem.
#[derive(Debug, Default)]
pub struct DeniedSink;

impl ArtifactSink for DeniedSink {
    fn write_artifact(&self, file_name: &str, _content: &str) -> Result<PathBuf, AdapterError> {
        Err(AdapterError::EffectDenied {
            effect: "fs_write",
            detail: format!("attempted to write `{file_name}`"),
        })
    }
}
