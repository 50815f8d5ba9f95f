// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::document::{Document, DocumentState};
use crate::model::graph::{ArrowKind, NodeKind};
use crate::model::ids::{EdgeId, GroupId, NodeId};
use crate::ops::{
    ApplyResult, EdgePatch, EntityRef, GraphOp, GroupPatch, NodePatch,
};
use crate::render::RenderRequest;
use crate::validate::Violation;
use crate::workspace::ResolveStrategy;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenDocumentParams {
    pub path: String,
    /// Create the file with starter content instead of reading it.
    pub create: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub path: String,
    pub kind: String,
    pub title: String,
    pub state: String,
    pub read_only: bool,
    pub broken: bool,
    pub rev: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub document_id: String,
    pub path: String,
    pub kind: String,
    pub title: String,
    pub state: String,
    pub read_only: bool,
    pub broken: bool,
    pub parse_failure: Option<String>,
    pub rev: Option<u64>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDocumentsResponse {
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditParams {
    pub base_rev: u64,
    pub ops: Vec<ApiOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    pub new_rev: u64,
    pub applied: u64,
    pub delta: DeltaSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloseParams {
    pub discard_unsaved: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationJson {
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub entity_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationsResponse {
    pub violations: Vec<ViolationJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictJson {
    pub external_modified_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictResponse {
    pub conflict: Option<ConflictJson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveParams {
    pub strategy: ApiResolveStrategy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiResolveStrategy {
    KeepLocal,
    TakeExternal,
    Merge { content: String },
}

impl From<ApiResolveStrategy> for ResolveStrategy {
    fn from(strategy: ApiResolveStrategy) -> Self {
        match strategy {
            ApiResolveStrategy::KeepLocal => Self::KeepLocal,
            ApiResolveStrategy::TakeExternal => Self::TakeExternal,
            ApiResolveStrategy::Merge { content } => Self::Merge { content },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl From<RenderRequest> for RenderResponse {
    fn from(request: RenderRequest) -> Self {
        Self {
            method: request.method.as_str().to_owned(),
            url: request.url,
            content_type: request.content_type.map(str::to_owned),
            body: request.body,
        }
    }
}

/// Wire form of [`GraphOp`]: string ids and string vocabularies, validated on
/// conversion.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiOp {
    AddNode {
        node_id: String,
        kind: Option<String>,
        label: String,
        alias: Option<String>,
    },
    UpdateNode {
        node_id: String,
        kind: Option<String>,
        label: Option<String>,
        stereotype: Option<Option<String>>,
    },
    RemoveNode {
        node_id: String,
    },
    AddEdge {
        edge_id: String,
        from_node_id: String,
        to_node_id: String,
        label: Option<String>,
        arrow: Option<String>,
    },
    UpdateEdge {
        edge_id: String,
        from_node_id: Option<String>,
        to_node_id: Option<String>,
        label: Option<Option<String>>,
        arrow: Option<String>,
    },
    RemoveEdge {
        edge_id: String,
    },
    AddGroup {
        group_id: String,
        label: String,
        alias: Option<String>,
        nodes: Option<Vec<String>>,
        groups: Option<Vec<String>>,
    },
    UpdateGroup {
        group_id: String,
        label: Option<String>,
        nodes: Option<Vec<String>>,
        groups: Option<Vec<String>>,
    },
    RemoveGroup {
        group_id: String,
    },
    SetTitle {
        title: String,
    },
    SetTheme {
        theme: Option<String>,
    },
}

impl ApiOp {
    /// Validate ids and vocabularies and produce the model-level op.
    pub fn into_graph_op(self) -> Result<GraphOp, String> {
        Ok(match self {
            Self::AddNode {
                node_id,
                kind,
                label,
                alias,
            } => GraphOp::AddNode {
                node_id: parse_node_id(&node_id)?,
                kind: kind.as_deref().map(parse_kind).transpose()?.unwrap_or_default(),
                label,
                alias,
            },
            Self::UpdateNode {
                node_id,
                kind,
                label,
                stereotype,
            } => GraphOp::UpdateNode {
                node_id: parse_node_id(&node_id)?,
                patch: NodePatch {
                    kind: kind.as_deref().map(parse_kind).transpose()?,
                    label,
                    stereotype,
                },
            },
            Self::RemoveNode { node_id } => GraphOp::RemoveNode {
                node_id: parse_node_id(&node_id)?,
            },
            Self::AddEdge {
                edge_id,
                from_node_id,
                to_node_id,
                label,
                arrow,
            } => GraphOp::AddEdge {
                edge_id: parse_edge_id(&edge_id)?,
                from_node_id: parse_node_id(&from_node_id)?,
                to_node_id: parse_node_id(&to_node_id)?,
                label,
                arrow: arrow.as_deref().map(parse_arrow).transpose()?.unwrap_or_default(),
            },
            Self::UpdateEdge {
                edge_id,
                from_node_id,
                to_node_id,
                label,
                arrow,
            } => GraphOp::UpdateEdge {
                edge_id: parse_edge_id(&edge_id)?,
                patch: EdgePatch {
                    from_node_id: from_node_id
                        .as_deref()
                        .map(parse_node_id)
                        .transpose()?,
                    to_node_id: to_node_id.as_deref().map(parse_node_id).transpose()?,
                    label,
                    arrow: arrow.as_deref().map(parse_arrow).transpose()?,
                },
            },
            Self::RemoveEdge { edge_id } => GraphOp::RemoveEdge {
                edge_id: parse_edge_id(&edge_id)?,
            },
            Self::AddGroup {
                group_id,
                label,
                alias,
                nodes,
                groups,
            } => GraphOp::AddGroup {
                group_id: parse_group_id(&group_id)?,
                label,
                alias,
                nodes: parse_node_ids(nodes.unwrap_or_default())?,
                groups: parse_group_ids(groups.unwrap_or_default())?,
            },
            Self::UpdateGroup {
                group_id,
                label,
                nodes,
                groups,
            } => GraphOp::UpdateGroup {
                group_id: parse_group_id(&group_id)?,
                patch: GroupPatch {
                    label,
                    nodes: nodes.map(parse_node_ids).transpose()?,
                    groups: groups.map(parse_group_ids).transpose()?,
                },
            },
            Self::RemoveGroup { group_id } => GraphOp::RemoveGroup {
                group_id: parse_group_id(&group_id)?,
            },
            Self::SetTitle { title } => GraphOp::SetTitle { title },
            Self::SetTheme { theme } => GraphOp::SetTheme { theme },
        })
    }
}

fn parse_node_id(raw: &str) -> Result<NodeId, String> {
    NodeId::new(raw).map_err(|err| format!("invalid node_id {raw:?}: {err}"))
}

fn parse_edge_id(raw: &str) -> Result<EdgeId, String> {
    EdgeId::new(raw).map_err(|err| format!("invalid edge_id {raw:?}: {err}"))
}

fn parse_group_id(raw: &str) -> Result<GroupId, String> {
    GroupId::new(raw).map_err(|err| format!("invalid group_id {raw:?}: {err}"))
}

fn parse_node_ids(raw: Vec<String>) -> Result<BTreeSet<NodeId>, String> {
    raw.iter().map(|id| parse_node_id(id)).collect()
}

fn parse_group_ids(raw: Vec<String>) -> Result<BTreeSet<GroupId>, String> {
    raw.iter().map(|id| parse_group_id(id)).collect()
}

fn parse_kind(raw: &str) -> Result<NodeKind, String> {
    kind_from_label(raw).ok_or_else(|| {
        format!("invalid kind {raw:?} (expected process|database|actor|component|cloud|folder|container)")
    })
}

fn parse_arrow(raw: &str) -> Result<ArrowKind, String> {
    match raw {
        "simple" => Ok(ArrowKind::Simple),
        "conditional" => Ok(ArrowKind::Conditional),
        "bidirectional" => Ok(ArrowKind::Bidirectional),
        other => Err(format!(
            "invalid arrow {other:?} (expected simple|conditional|bidirectional)"
        )),
    }
}

fn kind_from_label(raw: &str) -> Option<NodeKind> {
    match raw {
        "process" => Some(NodeKind::Process),
        "database" => Some(NodeKind::Database),
        "actor" => Some(NodeKind::Actor),
        "component" => Some(NodeKind::Component),
        "cloud" => Some(NodeKind::Cloud),
        "folder" => Some(NodeKind::Folder),
        "container" => Some(NodeKind::Container),
        _ => None,
    }
}

fn state_label(state: DocumentState) -> &'static str {
    match state {
        DocumentState::Clean => "clean",
        DocumentState::Dirty => "dirty",
        DocumentState::Saving => "saving",
        DocumentState::Closed => "closed",
    }
}

fn entity_ref_label(entity: &EntityRef) -> String {
    match entity {
        EntityRef::Node(node_id) => node_id.as_str().to_owned(),
        EntityRef::Edge(edge_id) => edge_id.as_str().to_owned(),
        EntityRef::Group(group_id) => group_id.as_str().to_owned(),
        EntityRef::Header => "header".to_owned(),
    }
}

pub fn document_summary(document: &Document) -> DocumentSummary {
    DocumentSummary {
        document_id: document.document_id().as_str().to_owned(),
        path: document.path().to_owned(),
        kind: document.kind().as_str().to_owned(),
        title: document.title().to_owned(),
        state: state_label(document.state()).to_owned(),
        read_only: document.is_read_only(),
        broken: document.is_broken(),
        rev: document.diagram().map(|diagram| diagram.rev()),
    }
}

pub fn document_detail(document: &Document) -> DocumentDetail {
    DocumentDetail {
        document_id: document.document_id().as_str().to_owned(),
        path: document.path().to_owned(),
        kind: document.kind().as_str().to_owned(),
        title: document.title().to_owned(),
        state: state_label(document.state()).to_owned(),
        read_only: document.is_read_only(),
        broken: document.is_broken(),
        parse_failure: document.parse_failure().map(str::to_owned),
        rev: document.diagram().map(|diagram| diagram.rev()),
        text: document.text().to_owned(),
    }
}

pub fn edit_response(result: &ApplyResult) -> EditResponse {
    EditResponse {
        new_rev: result.new_rev,
        applied: result.applied as u64,
        delta: DeltaSummary {
            added: result.delta.added.iter().map(entity_ref_label).collect(),
            removed: result.delta.removed.iter().map(entity_ref_label).collect(),
            updated: result.delta.updated.iter().map(entity_ref_label).collect(),
        },
    }
}

pub fn violation_json(violation: &Violation) -> ViolationJson {
    ViolationJson {
        kind: violation_kind_label(violation).to_owned(),
        severity: violation.severity().to_string(),
        message: violation.message().to_owned(),
        entity_ids: violation.entity_ids().to_vec(),
    }
}

fn violation_kind_label(violation: &Violation) -> &'static str {
    use crate::validate::ViolationKind;
    match violation.kind() {
        ViolationKind::DanglingEdge => "dangling_edge",
        ViolationKind::DuplicateNodeId => "duplicate_node_id",
        ViolationKind::CyclicGroup => "cyclic_group",
        ViolationKind::UnknownGroupMember => "unknown_group_member",
        ViolationKind::UnserializableText => "unserializable_text",
        ViolationKind::EmptyDiagram => "empty_diagram",
    }
}
