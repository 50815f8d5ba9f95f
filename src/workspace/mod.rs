// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Multi-document synchronizer.
//!
//! The workspace owns every open tab and every state transition between the
//! in-memory documents and the persisted store. Saving is gated (structural
//! errors and recorded conflicts block it), snapshot-based (edits submitted
//! after a save started land in the next snapshot), and serialized per
//! document (a second save request queues behind the in-flight one).

use std::collections::BTreeMap;
use std::fmt;

use crate::format::plantuml::{export_workflow, parse_workflow};
use crate::model::document::{Conflict, Document, DocumentState, FileKind};
use crate::model::ids::DocumentId;
use crate::ops::{apply_ops, ApplyError, ApplyResult, GraphOp};
use crate::store::{FileStore, StoreError};
use crate::validate::{has_errors, validate_diagram, Violation};

#[derive(Debug)]
pub enum WorkspaceError {
    DocumentNotFound { document_id: DocumentId },
    AlreadyOpen { path: String },
    NotADiagram { document_id: DocumentId },
    ReadOnly { document_id: DocumentId },
    ValidationFailed { violations: Vec<Violation> },
    ConflictDetected { document_id: DocumentId },
    NoConflict { document_id: DocumentId },
    UnsavedChanges { document_id: DocumentId },
    NotSaving { document_id: DocumentId },
    Apply(ApplyError),
    Store(StoreError),
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentNotFound { document_id } => {
                write!(f, "no open document {document_id}")
            }
            Self::AlreadyOpen { path } => {
                write!(f, "a document for {path:?} is already open")
            }
            Self::NotADiagram { document_id } => {
                write!(f, "document {document_id} has no diagram to edit")
            }
            Self::ReadOnly { document_id } => {
                write!(f, "document {document_id} is read-only")
            }
            Self::ValidationFailed { violations } => {
                write!(f, "save blocked by {} violation(s)", violations.len())
            }
            Self::ConflictDetected { document_id } => {
                write!(
                    f,
                    "document {document_id} has an unresolved external change"
                )
            }
            Self::NoConflict { document_id } => {
                write!(f, "document {document_id} has no conflict to resolve")
            }
            Self::UnsavedChanges { document_id } => {
                write!(f, "document {document_id} has unsaved changes")
            }
            Self::NotSaving { document_id } => {
                write!(f, "document {document_id} has no save in flight")
            }
            Self::Apply(err) => write!(f, "edit rejected: {err}"),
            Self::Store(err) => write!(f, "store operation failed: {err}"),
        }
    }
}

impl std::error::Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apply(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApplyError> for WorkspaceError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(err)
    }
}

impl From<StoreError> for WorkspaceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// How the caller wants a recorded external change settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Keep the in-memory edits; the next save overwrites the external write.
    KeepLocal,
    /// Discard local edits and reload the stored content.
    TakeExternal,
    /// Replace the document text with caller-merged content; stays dirty.
    Merge { content: String },
}

/// Outcome of [`Workspace::begin_save`] for callback-driven hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStart {
    /// A snapshot was captured; persist it, then call `complete_save`.
    Started { path: String, content: String },
    /// A save is already in flight; this request was queued behind it.
    Queued,
    /// Nothing to persist.
    Clean,
}

/// The set of open documents over one shared [`FileStore`].
#[derive(Debug)]
pub struct Workspace<S: FileStore> {
    store: S,
    documents: BTreeMap<DocumentId, Document>,
    open_order: Vec<DocumentId>,
    by_path: BTreeMap<String, DocumentId>,
    next_document: u64,
}

impl<S: FileStore> Workspace<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            documents: BTreeMap::new(),
            open_order: Vec::new(),
            by_path: BTreeMap::new(),
            next_document: 1,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn document(&self, document_id: &DocumentId) -> Option<&Document> {
        self.documents.get(document_id)
    }

    /// Open documents in tab order.
    pub fn documents(&self) -> Vec<&Document> {
        self.open_order
            .iter()
            .filter_map(|id| self.documents.get(id))
            .collect()
    }

    /// Open the file at `path` as a new tab.
    ///
    /// PlantUML files are parsed into a live diagram; a parse failure still
    /// opens the tab, in read-only broken raw-text mode, so the user can see
    /// and repair the content.
    pub async fn open(&mut self, path: &str) -> Result<DocumentId, WorkspaceError> {
        if self.by_path.contains_key(path) {
            return Err(WorkspaceError::AlreadyOpen {
                path: path.to_owned(),
            });
        }
        let content = self.store.read(path).await?;
        Ok(self.materialize(path, content))
    }

    /// Create a fresh file with the kind's starter content and open it.
    pub async fn create(&mut self, path: &str) -> Result<DocumentId, WorkspaceError> {
        if self.by_path.contains_key(path) {
            return Err(WorkspaceError::AlreadyOpen {
                path: path.to_owned(),
            });
        }
        let kind = FileKind::from_path(path);
        let content = kind.default_content(&title_from_path(path));
        self.store.write(path, &content).await?;
        Ok(self.materialize(path, content))
    }

    fn materialize(&mut self, path: &str, content: String) -> DocumentId {
        let document_id = self.next_document_id();
        let kind = FileKind::from_path(path);
        let mut document = Document::new(
            document_id.clone(),
            path,
            kind,
            title_from_path(path),
            content,
        );
        reparse(&mut document);
        self.by_path.insert(path.to_owned(), document_id.clone());
        self.open_order.push(document_id.clone());
        self.documents.insert(document_id.clone(), document);
        document_id
    }

    fn next_document_id(&mut self) -> DocumentId {
        let id = DocumentId::from_suffix(self.next_document)
            .unwrap_or_else(|_| unreachable!("counter ids contain no '/'"));
        self.next_document += 1;
        id
    }

    fn document_mut(
        &mut self,
        document_id: &DocumentId,
    ) -> Result<&mut Document, WorkspaceError> {
        self.documents
            .get_mut(document_id)
            .ok_or_else(|| WorkspaceError::DocumentNotFound {
                document_id: document_id.clone(),
            })
    }

    /// Apply graph operations to a diagram document.
    ///
    /// On success the document re-exports its text from the new snapshot,
    /// turns dirty, and carries the bumped revision in the result.
    pub fn edit(
        &mut self,
        document_id: &DocumentId,
        base_rev: u64,
        ops: &[GraphOp],
    ) -> Result<ApplyResult, WorkspaceError> {
        let document = self.document_mut(document_id)?;
        if document.is_read_only() {
            return Err(WorkspaceError::ReadOnly {
                document_id: document_id.clone(),
            });
        }
        let Some(diagram) = document.diagram_mut() else {
            return Err(WorkspaceError::NotADiagram {
                document_id: document_id.clone(),
            });
        };

        let result = apply_ops(diagram, base_rev, ops)?;
        if result.applied > 0 {
            let (text, title) = {
                let diagram = document
                    .diagram()
                    .unwrap_or_else(|| unreachable!("diagram present above"));
                (export_workflow(diagram), diagram.title().to_owned())
            };
            document.set_title(title);
            document.set_text(text);
            if document.state() != DocumentState::Saving {
                document.set_state(DocumentState::Dirty);
            }
        }
        Ok(result)
    }

    /// Replace the raw text of any open document. For PlantUML documents the
    /// text is re-parsed; a failure flips the tab into broken mode, a success
    /// repairs a previously broken tab.
    pub fn edit_text(
        &mut self,
        document_id: &DocumentId,
        text: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        let document = self.document_mut(document_id)?;
        document.set_text(text.into());
        reparse(document);
        let state = if document.text() == document.last_saved_content() {
            DocumentState::Clean
        } else {
            DocumentState::Dirty
        };
        if document.state() != DocumentState::Saving {
            document.set_state(state);
        }
        Ok(())
    }

    /// Current structural findings for a document. Non-diagram documents have
    /// none.
    pub fn violations(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<Violation>, WorkspaceError> {
        let document =
            self.document(document_id)
                .ok_or_else(|| WorkspaceError::DocumentNotFound {
                    document_id: document_id.clone(),
                })?;
        Ok(document
            .diagram()
            .map(validate_diagram)
            .unwrap_or_default())
    }

    pub fn conflict(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<&Conflict>, WorkspaceError> {
        self.document(document_id)
            .map(Document::conflict)
            .ok_or_else(|| WorkspaceError::DocumentNotFound {
                document_id: document_id.clone(),
            })
    }

    /// Gate and start a save: capture the snapshot and flip to `Saving`.
    ///
    /// Error-severity violations and recorded conflicts block here, before
    /// anything touches the store.
    pub fn begin_save(
        &mut self,
        document_id: &DocumentId,
    ) -> Result<SaveStart, WorkspaceError> {
        let violations = self.violations(document_id)?;
        let document = self.document_mut(document_id)?;
        match document.state() {
            DocumentState::Clean | DocumentState::Closed => return Ok(SaveStart::Clean),
            DocumentState::Saving => {
                document.set_save_queued(true);
                return Ok(SaveStart::Queued);
            }
            DocumentState::Dirty => {}
        }
        if document.conflict().is_some() {
            return Err(WorkspaceError::ConflictDetected {
                document_id: document_id.clone(),
            });
        }
        if has_errors(&violations) {
            return Err(WorkspaceError::ValidationFailed { violations });
        }

        let content = document.take_save_snapshot();
        document.set_state(DocumentState::Saving);
        Ok(SaveStart::Started {
            path: document.path().to_owned(),
            content,
        })
    }

    /// Settle an in-flight save. Returns `true` when a queued save request is
    /// pending and should run next.
    pub fn complete_save(
        &mut self,
        document_id: &DocumentId,
        persisted: bool,
    ) -> Result<bool, WorkspaceError> {
        let document = self.document_mut(document_id)?;
        let Some(snapshot) = document.clear_save_snapshot() else {
            return Err(WorkspaceError::NotSaving {
                document_id: document_id.clone(),
            });
        };
        let queued = document.save_queued();
        document.set_save_queued(false);
        if persisted {
            let up_to_date = document.text() == snapshot;
            document.set_last_saved_content(snapshot);
            document.set_state(if up_to_date {
                DocumentState::Clean
            } else {
                DocumentState::Dirty
            });
        } else {
            // Failed persist: edits stay, the document goes back to dirty.
            document.set_state(DocumentState::Dirty);
        }
        Ok(queued)
    }

    /// Persist a document, driving the begin/complete pair and any queued
    /// follow-up save.
    pub async fn save(&mut self, document_id: &DocumentId) -> Result<(), WorkspaceError> {
        loop {
            let (path, content) = match self.begin_save(document_id)? {
                SaveStart::Clean | SaveStart::Queued => return Ok(()),
                SaveStart::Started { path, content } => (path, content),
            };
            let result = self.store.write(&path, &content).await;
            let run_again = self.complete_save(document_id, result.is_ok())?;
            result?;
            if !run_again {
                return Ok(());
            }
        }
    }

    /// Record that the backing file changed underneath an open document.
    ///
    /// Only documents with unsaved edits conflict; a clean document's host can
    /// simply re-open. Unknown paths are ignored.
    pub fn note_external_change(&mut self, path: &str, last_modified_ms: u64) {
        let Some(document_id) = self.by_path.get(path) else {
            return;
        };
        let Some(document) = self.documents.get_mut(document_id) else {
            return;
        };
        match document.state() {
            DocumentState::Dirty | DocumentState::Saving => {
                document.set_conflict(Some(Conflict::new(last_modified_ms)));
            }
            DocumentState::Clean | DocumentState::Closed => {}
        }
    }

    /// Settle a recorded conflict with the caller's chosen strategy.
    pub async fn resolve_conflict(
        &mut self,
        document_id: &DocumentId,
        strategy: ResolveStrategy,
    ) -> Result<(), WorkspaceError> {
        let document = self.document_mut(document_id)?;
        if document.conflict().is_none() {
            return Err(WorkspaceError::NoConflict {
                document_id: document_id.clone(),
            });
        }
        match strategy {
            ResolveStrategy::KeepLocal => {
                document.set_conflict(None);
            }
            ResolveStrategy::TakeExternal => {
                let path = document.path().to_owned();
                let content = self.store.read(&path).await?;
                let document = self.document_mut(document_id)?;
                document.set_text(content.clone());
                document.set_last_saved_content(content);
                reparse(document);
                document.set_state(DocumentState::Clean);
                document.set_conflict(None);
            }
            ResolveStrategy::Merge { content } => {
                document.set_text(content);
                reparse(document);
                document.set_state(DocumentState::Dirty);
                document.set_conflict(None);
            }
        }
        Ok(())
    }

    /// Close a tab. Unsaved edits require an explicit discard.
    pub fn close(
        &mut self,
        document_id: &DocumentId,
        discard_unsaved: bool,
    ) -> Result<(), WorkspaceError> {
        let document = self.document_mut(document_id)?;
        let dirty = matches!(
            document.state(),
            DocumentState::Dirty | DocumentState::Saving
        );
        if dirty && !discard_unsaved {
            return Err(WorkspaceError::UnsavedChanges {
                document_id: document_id.clone(),
            });
        }
        document.set_state(DocumentState::Closed);
        let path = document.path().to_owned();
        self.by_path.remove(&path);
        self.open_order.retain(|id| id != document_id);
        self.documents.remove(document_id);
        Ok(())
    }
}

/// Re-derive the diagram from the document's text. Only PlantUML documents
/// carry a diagram; parse failures flip the tab into broken mode and a later
/// successful parse repairs it.
fn reparse(document: &mut Document) {
    if document.kind() != FileKind::Plantuml {
        return;
    }
    match parse_workflow(document.text()) {
        Ok(mut diagram) => {
            if let Some(previous) = document.diagram() {
                diagram.set_rev(previous.rev().saturating_add(1));
            }
            if !diagram.title().is_empty() {
                document.set_title(diagram.title().to_owned());
            }
            document.set_parse_failure(None);
            document.set_read_only(false);
            document.set_diagram(Some(diagram));
        }
        Err(err) => {
            document.set_diagram(None);
            document.set_parse_failure(Some(err.to_string()));
        }
    }
}

fn title_from_path(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    if stem.is_empty() {
        file_name.to_owned()
    } else {
        stem.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{ResolveStrategy, SaveStart, Workspace, WorkspaceError};
    use crate::model::document::DocumentState;
    use crate::model::graph::NodeKind;
    use crate::model::ids::NodeId;
    use crate::ops::{GraphOp, NodePatch};
    use crate::store::MemoryStore;

    const PIPELINE: &str = "@startuml Data Pipeline\n\
        !theme plain\n\
        \n\
        title Data Pipeline\n\
        \n\
        rectangle \"Ingest\" as ingest\n\
        database \"Warehouse\" as warehouse\n\
        \n\
        ingest --> warehouse : \"raw\"\n\
        @enduml\n";

    async fn pipeline_workspace() -> (Workspace<MemoryStore>, crate::model::ids::DocumentId) {
        let store = MemoryStore::new();
        store.write_external("flows/pipeline.puml", PIPELINE);
        let mut workspace = Workspace::new(store);
        let id = workspace.open("flows/pipeline.puml").await.expect("open");
        (workspace, id)
    }

    fn nid(raw: &str) -> NodeId {
        NodeId::new(raw).expect("node id")
    }

    #[tokio::test]
    async fn open_parses_and_titles_the_tab() {
        let (workspace, id) = pipeline_workspace().await;
        let document = workspace.document(&id).expect("document");
        assert_eq!(document.title(), "Data Pipeline");
        assert_eq!(document.state(), DocumentState::Clean);
        let diagram = document.diagram().expect("diagram");
        assert_eq!(diagram.graph().node_count(), 2);
        assert!(workspace.violations(&id).expect("violations").is_empty());
    }

    #[tokio::test]
    async fn open_same_path_twice_is_rejected() {
        let (mut workspace, _) = pipeline_workspace().await;
        let err = workspace.open("flows/pipeline.puml").await.unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyOpen { .. }));
    }

    #[tokio::test]
    async fn unparsable_file_opens_broken_not_refused() {
        let store = MemoryStore::new();
        store.write_external("flows/bad.puml", "rectangle \"No Header\"\n");
        let mut workspace = Workspace::new(store);
        let id = workspace.open("flows/bad.puml").await.expect("open");

        let document = workspace.document(&id).expect("document");
        assert!(document.is_broken());
        assert!(document.is_read_only());
        assert_eq!(document.text(), "rectangle \"No Header\"\n");
        assert!(document.diagram().is_none());

        let err = workspace
            .edit(
                &id,
                0,
                &[GraphOp::SetTitle {
                    title: "X".to_owned(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::ReadOnly { .. }));
    }

    #[tokio::test]
    async fn edit_text_repairs_a_broken_document() {
        let store = MemoryStore::new();
        store.write_external("flows/bad.puml", "not plantuml");
        let mut workspace = Workspace::new(store);
        let id = workspace.open("flows/bad.puml").await.expect("open");
        assert!(workspace.document(&id).expect("document").is_broken());

        workspace.edit_text(&id, PIPELINE).expect("edit_text");
        let document = workspace.document(&id).expect("document");
        assert!(!document.is_broken());
        assert!(!document.is_read_only());
        assert_eq!(document.state(), DocumentState::Dirty);
        assert!(document.diagram().is_some());
    }

    #[tokio::test]
    async fn edit_marks_dirty_and_reexports_text() {
        let (mut workspace, id) = pipeline_workspace().await;
        let result = workspace
            .edit(
                &id,
                0,
                &[GraphOp::UpdateNode {
                    node_id: nid("n:ingest"),
                    patch: NodePatch {
                        label: Some("Ingest v2".to_owned()),
                        ..NodePatch::default()
                    },
                }],
            )
            .expect("edit");
        assert_eq!(result.new_rev, 1);

        let document = workspace.document(&id).expect("document");
        assert_eq!(document.state(), DocumentState::Dirty);
        assert!(document.text().contains("rectangle \"Ingest v2\" as ingest"));
    }

    #[tokio::test]
    async fn save_persists_and_returns_to_clean() {
        let (mut workspace, id) = pipeline_workspace().await;
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::SetTitle {
                    title: "Pipeline v2".to_owned(),
                }],
            )
            .expect("edit");
        workspace.save(&id).await.expect("save");

        let document = workspace.document(&id).expect("document");
        assert_eq!(document.state(), DocumentState::Clean);
        let stored = workspace
            .store()
            .contents("flows/pipeline.puml")
            .expect("stored");
        assert!(stored.contains("title Pipeline v2"));
        assert_eq!(stored, document.text());
    }

    #[tokio::test]
    async fn save_of_a_clean_document_is_a_noop() {
        let (mut workspace, id) = pipeline_workspace().await;
        assert_eq!(workspace.begin_save(&id).expect("gate"), SaveStart::Clean);
        workspace.save(&id).await.expect("save");
    }

    #[tokio::test]
    async fn save_is_blocked_by_error_violations() {
        let (mut workspace, id) = pipeline_workspace().await;
        // A second node exporting under the alias "ingest" collides with the
        // existing one.
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::AddNode {
                    node_id: nid("n:ingest2"),
                    kind: NodeKind::Process,
                    label: "Shadow".to_owned(),
                    alias: Some("ingest".to_owned()),
                }],
            )
            .expect("edit");

        let err = workspace.save(&id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::ValidationFailed { .. }));
        assert_eq!(
            workspace.document(&id).expect("document").state(),
            DocumentState::Dirty
        );
    }

    #[tokio::test]
    async fn save_is_blocked_when_a_label_would_not_reparse() {
        let (mut workspace, id) = pipeline_workspace().await;
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::UpdateNode {
                    node_id: nid("n:ingest"),
                    patch: NodePatch {
                        label: Some("Say \"hi\"".to_owned()),
                        ..NodePatch::default()
                    },
                }],
            )
            .expect("edit");

        let err = workspace.save(&id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::ValidationFailed { .. }));
        // The quoted label never reaches the store.
        assert_eq!(
            workspace.store().contents("flows/pipeline.puml").as_deref(),
            Some(PIPELINE)
        );
        assert_eq!(
            workspace.document(&id).expect("document").state(),
            DocumentState::Dirty
        );
    }

    #[tokio::test]
    async fn edits_during_a_save_land_in_the_next_snapshot() {
        let (mut workspace, id) = pipeline_workspace().await;
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::SetTitle {
                    title: "First".to_owned(),
                }],
            )
            .expect("edit");

        let SaveStart::Started { path, content } =
            workspace.begin_save(&id).expect("begin")
        else {
            panic!("expected a started save");
        };
        assert!(content.contains("title First"));

        // Edit while the save is in flight, then ask for another save.
        workspace
            .edit(
                &id,
                1,
                &[GraphOp::SetTitle {
                    title: "Second".to_owned(),
                }],
            )
            .expect("edit");
        assert_eq!(workspace.begin_save(&id).expect("queue"), SaveStart::Queued);

        workspace.store().write_external(&path, &content);
        let run_again = workspace.complete_save(&id, true).expect("complete");
        assert!(run_again);

        // The queued save picks up the newer snapshot.
        let SaveStart::Started { content, .. } = workspace.begin_save(&id).expect("begin")
        else {
            panic!("expected the queued save to start");
        };
        assert!(content.contains("title Second"));
        workspace.complete_save(&id, true).expect("complete");
        assert_eq!(
            workspace.document(&id).expect("document").state(),
            DocumentState::Clean
        );
    }

    #[tokio::test]
    async fn external_change_on_dirty_document_blocks_save_until_resolved() {
        let (mut workspace, id) = pipeline_workspace().await;
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::SetTitle {
                    title: "Local".to_owned(),
                }],
            )
            .expect("edit");

        let event = workspace
            .store()
            .write_external("flows/pipeline.puml", "@startuml\ntitle External\n@enduml\n");
        workspace.note_external_change(&event.path, event.last_modified_ms);
        assert!(workspace.conflict(&id).expect("conflict").is_some());

        let err = workspace.save(&id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::ConflictDetected { .. }));

        workspace
            .resolve_conflict(&id, ResolveStrategy::TakeExternal)
            .await
            .expect("resolve");
        let document = workspace.document(&id).expect("document");
        assert_eq!(document.state(), DocumentState::Clean);
        assert_eq!(document.title(), "External");
        assert!(workspace.conflict(&id).expect("conflict").is_none());
    }

    #[tokio::test]
    async fn external_change_on_clean_document_is_ignored() {
        let (mut workspace, id) = pipeline_workspace().await;
        let event = workspace
            .store()
            .write_external("flows/pipeline.puml", "@startuml\n@enduml\n");
        workspace.note_external_change(&event.path, event.last_modified_ms);
        assert!(workspace.conflict(&id).expect("conflict").is_none());
    }

    #[tokio::test]
    async fn keep_local_resolution_lets_the_next_save_win() {
        let (mut workspace, id) = pipeline_workspace().await;
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::SetTitle {
                    title: "Local".to_owned(),
                }],
            )
            .expect("edit");
        let event = workspace
            .store()
            .write_external("flows/pipeline.puml", "external text");
        workspace.note_external_change(&event.path, event.last_modified_ms);

        workspace
            .resolve_conflict(&id, ResolveStrategy::KeepLocal)
            .await
            .expect("resolve");
        workspace.save(&id).await.expect("save");
        let stored = workspace
            .store()
            .contents("flows/pipeline.puml")
            .expect("stored");
        assert!(stored.contains("title Local"));
    }

    #[tokio::test]
    async fn close_requires_explicit_discard_of_unsaved_edits() {
        let (mut workspace, id) = pipeline_workspace().await;
        workspace
            .edit(
                &id,
                0,
                &[GraphOp::SetTitle {
                    title: "Unsaved".to_owned(),
                }],
            )
            .expect("edit");

        let err = workspace.close(&id, false).unwrap_err();
        assert!(matches!(err, WorkspaceError::UnsavedChanges { .. }));

        workspace.close(&id, true).expect("close");
        assert!(workspace.document(&id).is_none());
        // The path is free again.
        workspace.open("flows/pipeline.puml").await.expect("reopen");
    }

    #[tokio::test]
    async fn create_writes_starter_content_and_opens_clean() {
        let mut workspace = Workspace::new(MemoryStore::new());
        let id = workspace.create("flows/fresh.puml").await.expect("create");

        let document = workspace.document(&id).expect("document");
        assert_eq!(document.state(), DocumentState::Clean);
        assert!(!document.is_broken());
        assert_eq!(document.title(), "fresh");
        assert!(workspace
            .store()
            .contents("flows/fresh.puml")
            .expect("stored")
            .starts_with("@startuml fresh\n"));
    }

    #[tokio::test]
    async fn non_diagram_documents_edit_as_text_only() {
        let store = MemoryStore::new();
        store.write_external("personas/reviewer.md", "# Reviewer\n");
        let mut workspace = Workspace::new(store);
        let id = workspace.open("personas/reviewer.md").await.expect("open");

        let err = workspace.edit(&id, 0, &[]).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotADiagram { .. }));

        workspace.edit_text(&id, "# Reviewer v2\n").expect("edit_text");
        workspace.save(&id).await.expect("save");
        assert_eq!(
            workspace.store().contents("personas/reviewer.md").as_deref(),
            Some("# Reviewer v2\n")
        );
    }
}
