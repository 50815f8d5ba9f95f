// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::broadcast;

use super::{validate_store_path, ChangeEvent, ChangeOrigin, FileStore, PathMeta, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    content: String,
    last_modified_ms: u64,
}

/// In-memory store for tests and ephemeral workspaces.
///
/// Timestamps are a monotonic counter rather than wall-clock time, so test
/// assertions stay deterministic. [`write_external`] simulates a third party
/// editing the backing file: it updates content and emits a change event
/// without going through the workspace.
///
/// [`write_external`]: MemoryStore::write_external
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
    clock: AtomicU64,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            entries: Mutex::new(BTreeMap::new()),
            clock: AtomicU64::new(1),
            changes,
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn insert(&self, path: &str, content: &str) -> u64 {
        let last_modified_ms = self.tick();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            path.to_owned(),
            Entry {
                content: content.to_owned(),
                last_modified_ms,
            },
        );
        last_modified_ms
    }

    /// Replace a path's content as an outside writer would.
    pub fn write_external(&self, path: &str, content: &str) -> ChangeEvent {
        let last_modified_ms = self.insert(path, content);
        let event = ChangeEvent {
            path: path.to_owned(),
            last_modified_ms,
            origin: ChangeOrigin::External,
        };
        let _ = self.changes.send(event.clone());
        event
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(path).map(|entry| entry.content.clone())
    }
}

impl FileStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<String, StoreError> {
        validate_store_path(path)?;
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(path)
            .map(|entry| entry.content.clone())
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_owned(),
            })
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        validate_store_path(path)?;
        let last_modified_ms = self.insert(path, content);
        let _ = self.changes.send(ChangeEvent {
            path: path.to_owned(),
            last_modified_ms,
            origin: ChangeOrigin::OwnWrite,
        });
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<PathMeta>, StoreError> {
        if !prefix.is_empty() {
            validate_store_path(prefix)?;
        }
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .iter()
            .filter(|(path, _)| {
                prefix.is_empty()
                    || path.as_str() == prefix
                    || path.starts_with(&format!("{prefix}/"))
            })
            .map(|(path, entry)| PathMeta {
                path: path.clone(),
                last_modified_ms: entry.last_modified_ms,
                size: entry.content.len() as u64,
            })
            .collect())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
