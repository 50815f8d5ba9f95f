// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Documents (tabs) wrap diagrams; diagrams wrap the workflow graph of nodes,
//! edges, and nested groups.

pub mod diagram;
pub mod document;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod graph;
pub mod ids;

pub use diagram::Diagram;
pub use document::{Conflict, Document, DocumentState, FileKind, UnknownFileKind};
pub use graph::{
    ArrowKind, GraphMutationError, NodeKind, WorkflowEdge, WorkflowGraph, WorkflowGroup,
    WorkflowNode,
};
pub use ids::{DocumentId, EdgeId, GroupId, Id, IdError, IdTag, NodeId};
