//! Scratch and permanent storage for playlist uploads.
//!
//! Uploaded archives are written to `{temp_path}/{token}.tmp`; expanded playlists end up in
//! `{root_path}/{playlist_id}/`.

use super::error::IngestionError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Extension a declared upload file name must carry.
pub const ARCHIVE_EXTENSION: &str = "zip";

const STAGED_FILE_EXTENSION: &str = "tmp";

/// Prefix of the working directories created by the archive expander inside the temp path.
pub const WORK_DIR_PREFIX: &str = "extract-";

/// A staged upload. Owned by a single ingestion attempt.
///
/// The staged file is removed when the handle is dropped.
#[derive(Debug)]
pub struct StagingHandle {
    token: Uuid,
    path: PathBuf,
}

impl StagingHandle {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingHandle {
    fn drop(&mut self) {
        if let Err(e) = remove_path_now(&self.path) {
            warn!("Failed to remove staged upload {:?}: {}", self.path, e);
        }
    }
}

/// Blocking removal of a file or directory tree, for use from `Drop`. Missing paths are fine.
pub(crate) fn remove_path_now(path: &Path) -> std::io::Result<()> {
    let result = match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

pub struct StagingStore {
    root_path: PathBuf,
    temp_path: PathBuf,
}

impl StagingStore {
    pub fn new(root_path: impl Into<PathBuf>, temp_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            temp_path: temp_path.into(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Creates the root and temp directories and removes staging leftovers from earlier runs.
    ///
    /// Returns how many leftovers were removed.
    pub async fn init(&self) -> Result<usize, IngestionError> {
        fs::create_dir_all(&self.root_path)
            .await
            .map_err(|e| IngestionError::io("Failed to create root directory", e))?;
        fs::create_dir_all(&self.temp_path)
            .await
            .map_err(|e| IngestionError::io("Failed to create temp directory", e))?;

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.temp_path)
            .await
            .map_err(|e| IngestionError::io("Failed to list temp directory", e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| IngestionError::io("Failed to list temp directory", e))?
        {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let is_staged_file = path
                .extension()
                .is_some_and(|ext| ext == STAGED_FILE_EXTENSION);
            if is_staged_file || name.starts_with(WORK_DIR_PREFIX) {
                match self.delete(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Could not remove staging leftover {:?}: {}", path, e),
                }
            }
        }

        if removed > 0 {
            info!("Removed {} staging leftovers from {:?}", removed, self.temp_path);
        }
        Ok(removed)
    }

    /// Check if a declared file name looks like a supported archive.
    pub fn is_archive(filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
            .unwrap_or(false)
    }

    /// Writes the whole upload stream to a new staging file named after `token`.
    ///
    /// A stream that ends in an error, or a call that is dropped before it finishes, leaves
    /// no file behind.
    pub async fn stage<R>(&self, token: Uuid, reader: &mut R) -> Result<StagingHandle, IngestionError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self
            .temp_path
            .join(format!("{}.{}", token, STAGED_FILE_EXTENSION));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| IngestionError::io(format!("Failed to create {:?}", path), e))?;
        // From here on the handle owns the file, including the partial one.
        let handle = StagingHandle { token, path };

        let written = async {
            let written = tokio::io::copy(reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(written)
        }
        .await;
        drop(file);

        let bytes = written.map_err(|e| IngestionError::io("Failed to stage upload", e))?;
        debug!("Staged {} bytes at {:?}", bytes, handle.path);
        Ok(handle)
    }

    /// Path of the permanent directory for a playlist, whether or not it exists.
    pub fn identifier_directory(&self, id: Uuid) -> PathBuf {
        self.root_path.join(id.to_string())
    }

    /// Returns the permanent directory for `id`, which must not exist yet.
    pub async fn reserve_identifier_directory(&self, id: Uuid) -> Result<PathBuf, IngestionError> {
        let dir = self.identifier_directory(id);
        let exists = fs::try_exists(&dir)
            .await
            .map_err(|e| IngestionError::io(format!("Failed to inspect {:?}", dir), e))?;
        if exists {
            return Err(IngestionError::IdentifierCollision(id.to_string()));
        }
        Ok(dir)
    }

    /// Moves `source` to `dest` with a single rename.
    pub async fn relocate(&self, source: &Path, dest: &Path) -> Result<(), IngestionError> {
        fs::rename(source, dest).await.map_err(|e| {
            IngestionError::io(format!("Failed to move {:?} to {:?}", source, dest), e)
        })
    }

    /// Removes a file or a whole directory tree. Missing paths are not an error.
    pub async fn delete(&self, path: &Path) -> Result<(), IngestionError> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(IngestionError::io(format!("Failed to inspect {:?}", path), e)),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestionError::io(format!("Failed to delete {:?}", path), e)),
        }
    }
}
