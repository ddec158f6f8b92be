//! Expansion of staged zip archives into fresh working directories.

use super::error::IngestionError;
use super::staging::{remove_path_now, WORK_DIR_PREFIX};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// A working directory holding an expanded archive.
///
/// The directory is removed when the guard is dropped, unless [`WorkDir::keep`] was called.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    keep: bool,
}

impl WorkDir {
    /// Creates `path`, which must not exist yet.
    fn create(path: PathBuf) -> Result<Self, IngestionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| IngestionError::io("Failed to create work root", e))?;
        }
        // create_dir fails if the directory exists, so a working directory is never shared.
        std::fs::create_dir(&path)
            .map_err(|e| IngestionError::io(format!("Failed to create {:?}", path), e))?;
        Ok(Self { path, keep: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leaves the directory in place and returns its path.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = remove_path_now(&self.path) {
            warn!("Failed to remove working directory {:?}: {}", self.path, e);
        }
    }
}

/// Raises the flag when the expanding call goes away, so the blocking task stops early.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct ArchiveExpander {
    work_root: PathBuf,
}

impl ArchiveExpander {
    /// Working directories are created as `{work_root}/extract-{uuid}`.
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
        }
    }

    /// Expands every entry of `archive` into a new working directory.
    ///
    /// On failure the working directory is removed before returning. If the returned future
    /// is dropped early, the blocking task stops at the next chunk and removes it as well.
    pub async fn expand(&self, archive: &Path) -> Result<WorkDir, IngestionError> {
        let work_dir = self
            .work_root
            .join(format!("{}{}", WORK_DIR_PREFIX, Uuid::new_v4()));
        let archive = archive.to_path_buf();
        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel_on_drop = CancelOnDrop(cancelled.clone());

        // The task owns the guard until its result is received. An abandoned result is
        // dropped by the runtime, which removes the directory.
        tokio::task::spawn_blocking(move || expand_into(&archive, work_dir, &cancelled))
            .await
            .map_err(|e| IngestionError::Io(format!("Expansion task failed: {}", e)))?
    }
}

fn corrupt(err: impl std::fmt::Display) -> IngestionError {
    IngestionError::CorruptArchive(err.to_string())
}

fn check_cancelled(cancelled: &AtomicBool) -> Result<(), IngestionError> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(IngestionError::Io("Expansion cancelled".to_string()));
    }
    Ok(())
}

/// Relative path for an entry name, or `None` if it could land outside the working directory.
///
/// Any `..` segment is refused, even one that would stay inside.
fn safe_entry_path(name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.contains('\0') {
        return None;
    }
    let path = Path::new(name);
    let safe = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| path.to_path_buf())
}

/// Streams one entry to `out` through `buffer`.
///
/// Read failures mean the archive is damaged, write failures are I/O failures.
fn copy_entry(
    entry: &mut impl Read,
    out: &mut impl Write,
    buffer: &mut [u8],
    output_path: &Path,
    cancelled: &AtomicBool,
) -> Result<u64, IngestionError> {
    let mut total = 0u64;
    loop {
        let n = match entry.read(buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(IngestionError::CorruptArchive(format!(
                    "Failed to read entry for {:?}: {}",
                    output_path, e
                )))
            }
        };
        out.write_all(&buffer[..n])
            .map_err(|e| IngestionError::io(format!("Failed to write {:?}", output_path), e))?;
        total += n as u64;
        check_cancelled(cancelled)?;
    }
}

/// Blocking part of the expansion. The returned guard owns the populated directory.
fn expand_into(
    archive_path: &Path,
    work_dir: PathBuf,
    cancelled: &AtomicBool,
) -> Result<WorkDir, IngestionError> {
    let file = File::open(archive_path)
        .map_err(|e| IngestionError::io(format!("Failed to open {:?}", archive_path), e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(corrupt)?;

    check_cancelled(cancelled)?;
    let work_dir = WorkDir::create(work_dir)?;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut bytes = 0u64;

    for i in 0..archive.len() {
        check_cancelled(cancelled)?;
        let mut entry = archive.by_index(i).map_err(corrupt)?;

        let relative = safe_entry_path(entry.name()).ok_or_else(|| {
            IngestionError::CorruptArchive(format!("Unsafe entry name: {}", entry.name()))
        })?;
        let output_path = work_dir.path().join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path)
                .map_err(|e| IngestionError::io(format!("Failed to create {:?}", output_path), e))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| IngestionError::io(format!("Failed to create {:?}", parent), e))?;
        }
        let mut out = File::create(&output_path)
            .map_err(|e| IngestionError::io(format!("Failed to create {:?}", output_path), e))?;
        bytes += copy_entry(&mut entry, &mut out, &mut buffer, &output_path, cancelled)?;
    }

    debug!("Wrote {} entries ({} bytes) to {:?}", archive.len(), bytes, work_dir.path());
    Ok(work_dir)
}
