// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::broadcast;

use super::{validate_store_path, ChangeEvent, ChangeOrigin, FileStore, PathMeta, StoreError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents to stable storage before the
    /// rename. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Filesystem-backed store rooted at a workspace directory.
///
/// Writes are atomic (temp file + rename), so a crashed save never leaves a
/// half-written file behind. Change events are emitted for this process's own
/// writes; external edits are the host's to report.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    durability: WriteDurability,
    changes: broadcast::Sender<ChangeEvent>,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
            changes,
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        validate_store_path(path)?;
        Ok(self.root.join(path))
    }

    fn write_atomic(&self, path: &str, full_path: &Path, content: &str) -> Result<(), StoreError> {
        let parent = full_path
            .parent()
            .ok_or_else(|| StoreError::InvalidPath {
                path: path.to_owned(),
            })?;
        fs::create_dir_all(parent).map_err(|source| StoreError::WriteFailed {
            path: path.to_owned(),
            source,
        })?;

        let file_name = full_path
            .file_name()
            .ok_or_else(|| StoreError::InvalidPath {
                path: path.to_owned(),
            })?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tmp_path = parent.join(format!(
            ".triton.tmp.{}.{}",
            file_name.to_string_lossy(),
            nanos
        ));

        let result = (|| {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            if self.durability == WriteDurability::Durable {
                file.sync_all()?;
            }
            drop(file);
            fs::rename(&tmp_path, full_path)
        })();

        if let Err(source) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::WriteFailed {
                path: path.to_owned(),
                source,
            });
        }
        Ok(())
    }

    fn collect_files(
        &self,
        dir: &Path,
        out: &mut Vec<PathMeta>,
    ) -> Result<(), io::Error> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };
        for entry in entries {
            let entry = entry?;
            let entry_path = entry.path();
            let meta = entry.metadata()?;
            if meta.is_dir() {
                self.collect_files(&entry_path, out)?;
                continue;
            }
            let Ok(relative) = entry_path.strip_prefix(&self.root) else {
                continue;
            };
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if path.contains("/.triton.tmp.") || path.starts_with(".triton.tmp.") {
                continue;
            }
            out.push(PathMeta {
                path,
                last_modified_ms: modified_ms(&meta),
                size: meta.len(),
            });
        }
        Ok(())
    }
}

fn modified_ms(meta: &fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

impl FileStore for DirStore {
    async fn read(&self, path: &str) -> Result<String, StoreError> {
        let full_path = self.resolve(path)?;
        match fs::read_to_string(&full_path) {
            Ok(content) => Ok(content),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                path: path.to_owned(),
            }),
            Err(source) => Err(StoreError::ReadFailed {
                path: path.to_owned(),
                source,
            }),
        }
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full_path = self.resolve(path)?;
        self.write_atomic(path, &full_path, content)?;
        let _ = self.changes.send(ChangeEvent {
            path: path.to_owned(),
            last_modified_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            origin: ChangeOrigin::OwnWrite,
        });
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<PathMeta>, StoreError> {
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix)?
        };
        let mut out = Vec::new();
        self.collect_files(&dir, &mut out)
            .map_err(|source| StoreError::ReadFailed {
                path: prefix.to_owned(),
                source,
            })?;
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
