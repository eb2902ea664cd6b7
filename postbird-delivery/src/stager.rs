//! File stager: copy the document (and optional asset) into the working copy
//! and mark the whole tree for commit.
//!
//! ## Copy protocol
//!
//! 1. Read the source bytes.
//! 2. SHA-256 hash them and the existing destination, if any.
//! 3. Identical → leave the destination alone (`Unchanged`).
//! 4. Otherwise write `<dest>.postbird.tmp` and rename over the destination.
//!
//! Bytes are copied verbatim; no line-ending normalisation.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{stage_io, DeliveryError};
use crate::git::Git;
use crate::runner::CommandRunner;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of copying one file into the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// Destination was created or its content changed.
    Written { path: PathBuf },
    /// Destination already held identical bytes.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }
}

/// What the stager did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub staged: Vec<WriteResult>,
    /// Non-fatal problems, currently only asset copy failures.
    pub warnings: Vec<String>,
}

impl StageReport {
    /// One-line summary for the trace.
    pub fn summary(&self) -> String {
        let written = self
            .staged
            .iter()
            .filter(|r| matches!(r, WriteResult::Written { .. }))
            .count();
        let unchanged = self.staged.len() - written;
        format!("{written} written, {unchanged} unchanged")
    }
}

// ---------------------------------------------------------------------------
// stage
// ---------------------------------------------------------------------------

/// Copy `document` into `content_dir` and `asset` into `asset_dir`, keeping
/// each file's base name, then run `git add -A` in `working_copy`.
///
/// A document failure is fatal. An asset failure is reported as a warning.
pub fn stage<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
    content_dir: &Path,
    asset_dir: &Path,
    document: &Path,
    asset: Option<&Path>,
) -> Result<StageReport, DeliveryError> {
    let mut report = StageReport::default();

    if !document.is_file() {
        return Err(DeliveryError::MissingDocument {
            path: document.to_path_buf(),
        });
    }
    report
        .staged
        .push(copy_into(document, content_dir)?);

    if let Some(asset) = asset {
        match copy_into(asset, asset_dir) {
            Ok(result) => report.staged.push(result),
            Err(e) => {
                tracing::warn!("asset not staged: {e}");
                report.warnings.push(format!("asset not staged: {e}"));
            }
        }
    }

    let out = git.metadata(working_copy, &["add", "-A"])?;
    if !out.success() {
        return Err(DeliveryError::Add(out.detail()));
    }
    Ok(report)
}

/// Copy `source` to `<dir>/<basename(source)>`.
pub(crate) fn copy_into(source: &Path, dir: &Path) -> Result<WriteResult, DeliveryError> {
    let name = source.file_name().ok_or_else(|| {
        stage_io(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let bytes = std::fs::read(source).map_err(|e| stage_io(source, e))?;
    atomic_write(&dir.join(name), &bytes)
}

/// Write `bytes` to `path` unless it already holds exactly those bytes.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<WriteResult, DeliveryError> {
    let tmp = PathBuf::from(format!("{}.postbird.tmp", path.display()));

    if path.is_file() {
        let existing = std::fs::read(path).map_err(|e| stage_io(path, e))?;
        if digest(&existing) == digest(bytes) {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| stage_io(parent, e))?;
    }
    std::fs::write(&tmp, bytes).map_err(|e| stage_io(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(stage_io(path, e));
    }

    tracing::info!("staged: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

fn digest(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
