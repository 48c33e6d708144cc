//! On-disk plan document.
//!
//! The document is a single UTF-8 file. Reads return the whole text; writes
//! replace it atomically. [`DocumentStore::modify`] runs read, compute and
//! write while holding the sidecar lock, so concurrent updates never
//! interleave and a failed write leaves the previous text in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::lock::{self, LockedOperation, DEFAULT_LOCK_TIMEOUT_MS};

/// Skeleton written when neither a document nor a template exists.
pub const MINIMAL_DOCUMENT: &str = r#"# MASTER_PLAN

## Active Work

### TASK-001: Getting Started (PLANNED)

**Priority**: P2-MEDIUM

Add your tasks here following this format:
- Use `### TASK-XXX: Title (STATUS)` for task headers
- Status keywords: PLANNED, IN PROGRESS, REVIEW, DONE
- Use `- [x]` checkboxes for subtasks

---

## Ideas

- Add your ideas here

## Roadmap

### Near-term
| ID | Feature | Priority | Status |
|----|---------|----------|--------|
| ROAD-001 | Example feature | P2 | TODO |

### Later
| ID | Feature | Notes |
|----|---------|-------|
| ROAD-002 | Future feature | Long term |
"#;

/// How [`ensure_document`] found or created the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bootstrap {
    Existing,
    FromTemplate,
    Minimal,
}

/// Handle to the plan document on disk.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used to identify the document in change events.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Read the whole document.
    pub fn read(&self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|err| self.map_read_error(err))?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(self.path.clone()))
    }

    /// Read, transform and (if the text changed) write back under the lock.
    ///
    /// `f` returns the new text; returning text equal to the input skips the
    /// write. The returned flag reports whether a write happened.
    pub fn modify<T>(&self, f: impl FnOnce(&str) -> (String, T)) -> Result<(bool, T)> {
        let op = LockedOperation::begin(lock::lock_path_for(&self.path), self.lock_timeout_ms)?;

        let bytes = op.read(&self.path).map_err(|err| match err {
            Error::Io(io_err) => self.map_read_error(io_err),
            other => other,
        })?;
        let current =
            String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(self.path.clone()))?;

        let (next, output) = f(&current);
        if next == current {
            debug!(path = %self.path.display(), "document unchanged; skipping write");
            return Ok((false, output));
        }

        op.write_atomic(&self.path, next.as_bytes())?;
        debug!(path = %self.path.display(), bytes = next.len(), "document written");
        Ok((true, output))
    }

    fn map_read_error(&self, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::DocumentNotFound(self.path.clone())
        } else {
            Error::Io(err)
        }
    }
}

/// Make sure the document exists, creating it from `template` or the
/// built-in skeleton.
pub fn ensure_document(path: &Path, template: Option<&Path>) -> Result<Bootstrap> {
    if path.exists() {
        info!(path = %path.display(), "plan document found");
        return Ok(Bootstrap::Existing);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if let Some(template) = template.filter(|template| template.is_file()) {
        let contents = fs::read(template)?;
        lock::write_atomic(path, &contents)?;
        info!(
            path = %path.display(),
            template = %template.display(),
            "created plan document from template"
        );
        return Ok(Bootstrap::FromTemplate);
    }

    lock::write_atomic_str(path, MINIMAL_DOCUMENT)?;
    info!(path = %path.display(), "created minimal plan document (no template found)");
    Ok(Bootstrap::Minimal)
}
