// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::diagram::Diagram;
use super::ids::DocumentId;

/// The kinds of files the editor opens as tabs. Only [`Plantuml`] documents
/// carry a live diagram; all other kinds are edited as raw text.
///
/// [`Plantuml`]: FileKind::Plantuml
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    Plantuml,
    Persona,
    Instruction,
    GlobalInstruction,
    CommandPrompt,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plantuml => "plantuml",
            Self::Persona => "persona",
            Self::Instruction => "instruction",
            Self::GlobalInstruction => "global-instruction",
            Self::CommandPrompt => "command-prompt",
        }
    }

    /// Infer the kind from a store path. Extension wins over path segments;
    /// the fallback for unrecognized markdown-ish paths is `Instruction`.
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        let file_name = lower.rsplit('/').next().unwrap_or(lower.as_str());

        if lower.ends_with(".puml") || lower.ends_with(".plantuml") || lower.ends_with(".uml") {
            return Self::Plantuml;
        }
        if lower.contains("persona") {
            return Self::Persona;
        }
        if lower.contains("global-instruction") || file_name == "global-instructions.md" {
            return Self::GlobalInstruction;
        }
        if lower.contains("instruction") {
            return Self::Instruction;
        }
        if lower.contains("prompt") || lower.contains("command") {
            return Self::CommandPrompt;
        }
        Self::Instruction
    }

    pub fn default_title(self) -> &'static str {
        match self {
            Self::Plantuml => "New Workflow",
            Self::Persona => "New Persona",
            Self::Instruction => "New Instruction",
            Self::GlobalInstruction => "Global Instructions",
            Self::CommandPrompt => "New Command",
        }
    }

    /// Starter content for a freshly created tab of this kind.
    pub fn default_content(self, title: &str) -> String {
        match self {
            Self::Plantuml => format!(
                "@startuml {title}\n!theme plain\n\ntitle {title}\n\n@enduml\n"
            ),
            Self::Persona => format!(
                "---\nname: {title}\ntype: Expert Assistant\ntone: professional\n---\n\n# {title} Persona\n\nYou are a {title} - an expert assistant specialized in [domain].\n"
            ),
            Self::Instruction => format!(
                "---\nname: {title}\ntype: instruction\npriority: medium\n---\n\n# {title} Instructions\n\n## Overview\n[Description of what this instruction covers]\n"
            ),
            Self::GlobalInstruction => "# Universal Project Guidelines\n\n## Core Principles\n[Universal guidelines that apply to all projects]\n".to_owned(),
            Self::CommandPrompt => format!(
                "---\ntitle: {title}\n---\n\n# Command: {title}\n\n## Goal\n[Description of what this command accomplishes]\n"
            ),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFileKind {
    found: String,
}

impl fmt::Display for UnknownFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown file kind: {}", self.found)
    }
}

impl std::error::Error for UnknownFileKind {}

impl FromStr for FileKind {
    type Err = UnknownFileKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plantuml" => Ok(Self::Plantuml),
            "persona" => Ok(Self::Persona),
            "instruction" => Ok(Self::Instruction),
            "global-instruction" => Ok(Self::GlobalInstruction),
            "command-prompt" => Ok(Self::CommandPrompt),
            other => Err(UnknownFileKind {
                found: other.to_owned(),
            }),
        }
    }
}

/// Lifecycle of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Clean,
    Dirty,
    Saving,
    Closed,
}

/// A recorded external change to a document's backing path, observed while
/// the document had unsaved edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    external_modified_ms: u64,
}

impl Conflict {
    pub fn new(external_modified_ms: u64) -> Self {
        Self {
            external_modified_ms,
        }
    }

    pub fn external_modified_ms(&self) -> u64 {
        self.external_modified_ms
    }
}

/// One open tab: a store-backed file, its in-memory content, and its sync
/// state. The workspace owns every transition; this type only holds the data
/// and keeps the flags consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    document_id: DocumentId,
    path: String,
    kind: FileKind,
    title: String,
    state: DocumentState,
    read_only: bool,
    parse_failure: Option<String>,
    text: String,
    last_saved_content: String,
    diagram: Option<Diagram>,
    conflict: Option<Conflict>,
    save_snapshot: Option<String>,
    save_queued: bool,
}

impl Document {
    pub fn new(
        document_id: DocumentId,
        path: impl Into<String>,
        kind: FileKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            document_id,
            path: path.into(),
            kind,
            title: title.into(),
            state: DocumentState::Clean,
            read_only: false,
            parse_failure: None,
            last_saved_content: content.clone(),
            text: content,
            diagram: None,
            conflict: None,
            save_snapshot: None,
            save_queued: false,
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The parse error that forced this document into broken raw-text mode,
    /// if any. A broken document is always read-only for graph edits.
    pub fn parse_failure(&self) -> Option<&str> {
        self.parse_failure.as_deref()
    }

    pub fn is_broken(&self) -> bool {
        self.parse_failure.is_some()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn last_saved_content(&self) -> &str {
        &self.last_saved_content
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub fn conflict(&self) -> Option<&Conflict> {
        self.conflict.as_ref()
    }

    pub fn save_queued(&self) -> bool {
        self.save_queued
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn set_state(&mut self, state: DocumentState) {
        self.state = state;
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub(crate) fn set_parse_failure(&mut self, failure: Option<String>) {
        self.read_only = failure.is_some() || self.read_only;
        self.parse_failure = failure;
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn set_last_saved_content(&mut self, content: impl Into<String>) {
        self.last_saved_content = content.into();
    }

    pub(crate) fn set_diagram(&mut self, diagram: Option<Diagram>) {
        self.diagram = diagram;
    }

    pub(crate) fn diagram_mut(&mut self) -> Option<&mut Diagram> {
        self.diagram.as_mut()
    }

    pub(crate) fn set_conflict(&mut self, conflict: Option<Conflict>) {
        self.conflict = conflict;
    }

    pub(crate) fn set_save_queued(&mut self, queued: bool) {
        self.save_queued = queued;
    }

    /// Capture the content snapshot for an in-flight save.
    pub(crate) fn take_save_snapshot(&mut self) -> String {
        let snapshot = self.text.clone();
        self.save_snapshot = Some(snapshot.clone());
        snapshot
    }

    pub(crate) fn clear_save_snapshot(&mut self) -> Option<String> {
        self.save_snapshot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::FileKind;

    #[test]
    fn kind_inference_prefers_extension() {
        assert_eq!(FileKind::from_path("shared/uml-flows/build.puml"), FileKind::Plantuml);
        assert_eq!(
            FileKind::from_path("personas/workflow.plantuml"),
            FileKind::Plantuml
        );
    }

    #[test]
    fn kind_inference_uses_path_segments() {
        assert_eq!(FileKind::from_path("personas/reviewer.md"), FileKind::Persona);
        assert_eq!(
            FileKind::from_path("shared/global-instructions.md"),
            FileKind::GlobalInstruction
        );
        assert_eq!(
            FileKind::from_path("instructions/analyze.md"),
            FileKind::Instruction
        );
        assert_eq!(FileKind::from_path("prompts/deploy.md"), FileKind::CommandPrompt);
        assert_eq!(FileKind::from_path("notes.md"), FileKind::Instruction);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            FileKind::Plantuml,
            FileKind::Persona,
            FileKind::Instruction,
            FileKind::GlobalInstruction,
            FileKind::CommandPrompt,
        ] {
            assert_eq!(kind.as_str().parse::<FileKind>(), Ok(kind));
        }
    }

    #[test]
    fn default_content_mentions_the_title() {
        let content = FileKind::Plantuml.default_content("Build Pipeline");
        assert!(content.starts_with("@startuml Build Pipeline\n"));
        assert!(content.contains("title Build Pipeline"));
        assert!(content.trim_end().ends_with("@enduml"));
    }
}
