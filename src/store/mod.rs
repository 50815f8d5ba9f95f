// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted-file store boundary.
//!
//! The workspace never touches the filesystem directly; everything goes
//! through [`FileStore`]. Paths are store-relative, `/`-separated strings.

pub mod dir_store;
pub mod memory;

use std::fmt;
use std::io;

use tokio::sync::broadcast;

pub use dir_store::{DirStore, WriteDurability};
pub use memory::MemoryStore;

#[derive(Debug)]
pub enum StoreError {
    NotFound {
        path: String,
    },
    ReadFailed {
        path: String,
        source: io::Error,
    },
    WriteFailed {
        path: String,
        source: io::Error,
    },
    InvalidPath {
        path: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "no file at {path:?}"),
            Self::ReadFailed { path, source } => write!(f, "read failed at {path:?}: {source}"),
            Self::WriteFailed { path, source } => write!(f, "write failed at {path:?}: {source}"),
            Self::InvalidPath { path } => {
                write!(f, "path must be store-relative without '..': {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } | Self::WriteFailed { source, .. } => Some(source),
            Self::NotFound { .. } | Self::InvalidPath { .. } => None,
        }
    }
}

/// Metadata for one stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMeta {
    pub path: String,
    pub last_modified_ms: u64,
    pub size: u64,
}

/// Who replaced the path's content.
///
/// Subscribers that only care about edits made behind the workspace's back
/// (conflict detection) filter on [`External`] and ignore the echoes of their
/// own saves.
///
/// [`External`]: ChangeOrigin::External
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A write issued through this store's [`FileStore::write`].
    OwnWrite,
    /// A write by some other party against the same backing storage.
    External,
}

/// Emitted on the change channel whenever a path's content is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: String,
    pub last_modified_ms: u64,
    pub origin: ChangeOrigin,
}

/// The store contract: read/write/list plus a broadcast channel of change
/// events. The async methods are the only suspension points of the editing
/// core; all graph work runs to completion between them.
#[allow(async_fn_in_trait)]
pub trait FileStore {
    async fn read(&self, path: &str) -> Result<String, StoreError>;

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError>;

    async fn list(&self, prefix: &str) -> Result<Vec<PathMeta>, StoreError>;

    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// Store-relative paths only: non-empty, no leading `/`, no `.`/`..`
/// segments, no backslashes.
pub(crate) fn validate_store_path(path: &str) -> Result<(), StoreError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.ends_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if invalid {
        return Err(StoreError::InvalidPath {
            path: path.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_store_path;

    #[test]
    fn accepts_relative_slash_paths() {
        assert!(validate_store_path("personas/reviewer.md").is_ok());
        assert!(validate_store_path("build.puml").is_ok());
    }

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        for path in ["", "/etc/passwd", "a//b", "../escape", "a/./b", "a\\b", "dir/"] {
            assert!(validate_store_path(path).is_err(), "accepted {path:?}");
        }
    }
}
