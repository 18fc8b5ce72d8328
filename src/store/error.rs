//! Storage error types

use super::record::Version;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by record store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No record exists for the key (or, in compatible mode, the
    /// expected version of an update did not match)
    #[error("storage entry not found")]
    EntryNotFound,

    /// A record already exists for the key
    #[error("storage entry already exists")]
    EntryAlreadyExists,

    /// The record exists but its version differs from the one the caller
    /// presented. Only produced in strict mode.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version the caller last observed
        expected: Version,
        /// Version currently stored
        actual: Version,
    },
}

impl StorageError {
    /// True for every error the storage contract classifies as "not found",
    /// which includes a stale-version update.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::EntryNotFound | StorageError::VersionConflict { .. }
        )
    }

    /// True if the error is `EntryAlreadyExists`
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StorageError::EntryAlreadyExists)
    }
}

/// How an update with a stale expected version is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictReporting {
    /// Stale versions surface as `EntryNotFound`, indistinguishable from
    /// a missing key
    #[default]
    Compatible,

    /// Stale versions surface as `VersionConflict`
    Strict,
}

impl ConflictReporting {
    /// Build the error for an update whose expected version is stale
    pub(crate) fn conflict(self, expected: Version, actual: Version) -> StorageError {
        match self {
            ConflictReporting::Compatible => StorageError::EntryNotFound,
            ConflictReporting::Strict => StorageError::VersionConflict { expected, actual },
        }
    }
}

/// Result alias for record store operations
pub type StorageResult<T> = Result<T, StorageError>;
