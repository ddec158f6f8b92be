use serde::Serialize;
use thiserror::Error;

/// Why a playlist upload was rejected. The message is the human-readable detail.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("{0}")]
    ArgumentInvalid(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Manifest missing: {0}")]
    ManifestMissing(String),

    #[error("Manifest malformed: {0}")]
    ManifestMalformed(String),

    #[error("Files already exist for identifier {0}")]
    IdentifierCollision(String),

    #[error("Failed to persist playlist: {0}")]
    Persistence(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IngestionErrorKind {
    ArgumentInvalid,
    IoFailure,
    CorruptArchive,
    ManifestMissing,
    ManifestMalformed,
    IdentifierCollision,
    Persistence,
}

impl IngestionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionErrorKind::ArgumentInvalid => "argument_invalid",
            IngestionErrorKind::IoFailure => "io_failure",
            IngestionErrorKind::CorruptArchive => "corrupt_archive",
            IngestionErrorKind::ManifestMissing => "manifest_missing",
            IngestionErrorKind::ManifestMalformed => "manifest_malformed",
            IngestionErrorKind::IdentifierCollision => "identifier_collision",
            IngestionErrorKind::Persistence => "persistence",
        }
    }

    /// True when resubmitting a corrected upload can succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestionErrorKind::ArgumentInvalid
                | IngestionErrorKind::CorruptArchive
                | IngestionErrorKind::ManifestMissing
                | IngestionErrorKind::ManifestMalformed
        )
    }
}

impl IngestionError {
    pub fn kind(&self) -> IngestionErrorKind {
        match self {
            IngestionError::ArgumentInvalid(_) => IngestionErrorKind::ArgumentInvalid,
            IngestionError::Io(_) => IngestionErrorKind::IoFailure,
            IngestionError::CorruptArchive(_) => IngestionErrorKind::CorruptArchive,
            IngestionError::ManifestMissing(_) => IngestionErrorKind::ManifestMissing,
            IngestionError::ManifestMalformed(_) => IngestionErrorKind::ManifestMalformed,
            IngestionError::IdentifierCollision(_) => IngestionErrorKind::IdentifierCollision,
            IngestionError::Persistence(_) => IngestionErrorKind::Persistence,
        }
    }

    pub(crate) fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        IngestionError::Io(format!("{}: {}", context, err))
    }
}
