// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for diagrams.
//!
//! Operations are applied with optimistic concurrency (revision checks)
//! against a clone of the graph; the clone is swapped in whole on success, so
//! a failed batch leaves the diagram untouched and readers never observe a
//! torn intermediate state. Application produces a minimal delta the host can
//! use to refresh derived state.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::model::diagram::Diagram;
use crate::model::graph::{
    ArrowKind, GraphMutationError, NodeKind, WorkflowEdge, WorkflowGraph, WorkflowGroup,
    WorkflowNode,
};
use crate::model::ids::{EdgeId, GroupId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphOp {
    AddNode {
        node_id: NodeId,
        kind: NodeKind,
        label: String,
        alias: Option<String>,
    },
    UpdateNode {
        node_id: NodeId,
        patch: NodePatch,
    },
    /// Removes the node and every edge attached to it.
    RemoveNode {
        node_id: NodeId,
    },
    AddEdge {
        edge_id: EdgeId,
        from_node_id: NodeId,
        to_node_id: NodeId,
        label: Option<String>,
        arrow: ArrowKind,
    },
    UpdateEdge {
        edge_id: EdgeId,
        patch: EdgePatch,
    },
    RemoveEdge {
        edge_id: EdgeId,
    },
    AddGroup {
        group_id: GroupId,
        label: String,
        alias: Option<String>,
        nodes: BTreeSet<NodeId>,
        groups: BTreeSet<GroupId>,
    },
    UpdateGroup {
        group_id: GroupId,
        patch: GroupPatch,
    },
    RemoveGroup {
        group_id: GroupId,
    },
    SetTitle {
        title: String,
    },
    SetTheme {
        theme: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub kind: Option<NodeKind>,
    pub label: Option<String>,
    pub stereotype: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgePatch {
    pub from_node_id: Option<NodeId>,
    pub to_node_id: Option<NodeId>,
    pub label: Option<Option<String>>,
    pub arrow: Option<ArrowKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub label: Option<String>,
    pub nodes: Option<BTreeSet<NodeId>>,
    pub groups: Option<BTreeSet<GroupId>>,
}

/// What a delta entry points at. `Header` covers title/theme changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Node(NodeId),
    Edge(EdgeId),
    Group(GroupId),
    Header,
}

/// Minimal delta describing which entities changed as the result of applying
/// ops. Intentionally coarse: added/removed/updated refs only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<EntityRef>,
    pub removed: Vec<EntityRef>,
    pub updated: Vec<EntityRef>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<EntityRef>,
    removed: HashSet<EntityRef>,
    updated: HashSet<EntityRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, entity: EntityRef) {
        self.removed.remove(&entity);
        self.updated.remove(&entity);
        self.added.insert(entity);
    }

    fn record_removed(&mut self, entity: EntityRef) {
        self.added.remove(&entity);
        self.updated.remove(&entity);
        self.removed.insert(entity);
    }

    fn record_updated(&mut self, entity: EntityRef) {
        if self.added.contains(&entity) || self.removed.contains(&entity) {
            return;
        }
        self.updated.insert(entity);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();
        added.sort();
        removed.sort();
        updated.sort();
        Delta {
            added,
            removed,
            updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    Conflict { base_rev: u64, current_rev: u64 },
    Graph(GraphMutationError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                base_rev,
                current_rev,
            } => {
                write!(
                    f,
                    "stale base_rev (base_rev={base_rev}, current_rev={current_rev})"
                )
            }
            Self::Graph(err) => write!(f, "graph mutation rejected: {err}"),
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conflict { .. } => None,
            Self::Graph(err) => Some(err),
        }
    }
}

impl From<GraphMutationError> for ApplyError {
    fn from(err: GraphMutationError) -> Self {
        Self::Graph(err)
    }
}

pub fn apply_ops(
    diagram: &mut Diagram,
    base_rev: u64,
    ops: &[GraphOp],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = diagram.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict {
            base_rev,
            current_rev,
        });
    }

    if ops.is_empty() {
        return Ok(ApplyResult {
            new_rev: current_rev,
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut new_graph = diagram.graph().clone();
    let mut new_title: Option<String> = None;
    let mut new_theme: Option<Option<String>> = None;
    let mut delta = DeltaBuilder::default();

    for op in ops {
        apply_graph_op(&mut new_graph, &mut new_title, &mut new_theme, op, &mut delta)?;
    }

    diagram.set_graph(new_graph);
    if let Some(title) = new_title {
        diagram.set_title(title);
    }
    if let Some(theme) = new_theme {
        diagram.set_theme(theme);
    }
    diagram.bump_rev();

    Ok(ApplyResult {
        new_rev: diagram.rev(),
        applied: ops.len(),
        delta: delta.finish(),
    })
}

fn apply_graph_op(
    graph: &mut WorkflowGraph,
    new_title: &mut Option<String>,
    new_theme: &mut Option<Option<String>>,
    op: &GraphOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        GraphOp::AddNode {
            node_id,
            kind,
            label,
            alias,
        } => {
            let node = WorkflowNode::new_with(label.clone(), *kind, alias.clone());
            graph.insert_node(node_id.clone(), node)?;
            delta.record_added(EntityRef::Node(node_id.clone()));
        }
        GraphOp::UpdateNode { node_id, patch } => {
            graph.update_node(node_id, patch.kind, patch.label.clone())?;
            if let Some(stereotype) = &patch.stereotype {
                graph.set_node_stereotype(node_id, stereotype.clone())?;
            }
            delta.record_updated(EntityRef::Node(node_id.clone()));
        }
        GraphOp::RemoveNode { node_id } => {
            for edge_id in graph.edges_touching(node_id) {
                graph.remove_edge(&edge_id)?;
                delta.record_removed(EntityRef::Edge(edge_id));
            }
            graph.remove_node(node_id)?;
            delta.record_removed(EntityRef::Node(node_id.clone()));
        }
        GraphOp::AddEdge {
            edge_id,
            from_node_id,
            to_node_id,
            label,
            arrow,
        } => {
            let edge = WorkflowEdge::new_with(
                from_node_id.clone(),
                to_node_id.clone(),
                label.clone(),
                *arrow,
            );
            graph.insert_edge(edge_id.clone(), edge)?;
            delta.record_added(EntityRef::Edge(edge_id.clone()));
        }
        GraphOp::UpdateEdge { edge_id, patch } => {
            if patch.from_node_id.is_some() || patch.to_node_id.is_some() {
                let current = graph
                    .edge(edge_id)
                    .ok_or(GraphMutationError::EdgeNotFound {
                        edge_id: edge_id.clone(),
                    })?;
                let from = patch
                    .from_node_id
                    .clone()
                    .unwrap_or_else(|| current.from_node_id().clone());
                let to = patch
                    .to_node_id
                    .clone()
                    .unwrap_or_else(|| current.to_node_id().clone());
                graph.reattach_edge(edge_id, from, to)?;
            }
            graph.update_edge(edge_id, patch.label.clone(), patch.arrow)?;
            delta.record_updated(EntityRef::Edge(edge_id.clone()));
        }
        GraphOp::RemoveEdge { edge_id } => {
            graph.remove_edge(edge_id)?;
            delta.record_removed(EntityRef::Edge(edge_id.clone()));
        }
        GraphOp::AddGroup {
            group_id,
            label,
            alias,
            nodes,
            groups,
        } => {
            let group = WorkflowGroup::new_with(
                label.clone(),
                alias.clone(),
                nodes.clone(),
                groups.clone(),
            );
            graph.insert_group(group_id.clone(), group)?;
            delta.record_added(EntityRef::Group(group_id.clone()));
        }
        GraphOp::UpdateGroup { group_id, patch } => {
            if let Some(label) = &patch.label {
                graph.set_group_label(group_id, label.clone())?;
            }
            if patch.nodes.is_some() || patch.groups.is_some() {
                let current = graph
                    .group(group_id)
                    .ok_or(GraphMutationError::GroupNotFound {
                        group_id: group_id.clone(),
                    })?;
                let nodes = patch
                    .nodes
                    .clone()
                    .unwrap_or_else(|| current.nodes().clone());
                let groups = patch
                    .groups
                    .clone()
                    .unwrap_or_else(|| current.groups().clone());
                graph.set_group_members(group_id, nodes, groups)?;
            }
            delta.record_updated(EntityRef::Group(group_id.clone()));
        }
        GraphOp::RemoveGroup { group_id } => {
            graph.remove_group(group_id)?;
            delta.record_removed(EntityRef::Group(group_id.clone()));
        }
        GraphOp::SetTitle { title } => {
            *new_title = Some(title.clone());
            delta.record_updated(EntityRef::Header);
        }
        GraphOp::SetTheme { theme } => {
            *new_theme = Some(theme.clone());
            delta.record_updated(EntityRef::Header);
        }
    }
    Ok(())
}
