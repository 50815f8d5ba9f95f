// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::ids::{EdgeId, GroupId, NodeId};

/// The element vocabulary of a workflow diagram.
///
/// PlantUML keywords `frame`, `package` and `node` all map to [`Container`];
/// the other variants map 1:1 to their keyword.
///
/// [`Container`]: NodeKind::Container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Process,
    Database,
    Actor,
    Component,
    Cloud,
    Folder,
    Container,
}

impl NodeKind {
    /// The canonical PlantUML keyword emitted on export.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Process => "rectangle",
            Self::Database => "database",
            Self::Actor => "actor",
            Self::Component => "component",
            Self::Cloud => "cloud",
            Self::Folder => "folder",
            Self::Container => "node",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "rectangle" => Some(Self::Process),
            "database" => Some(Self::Database),
            "actor" => Some(Self::Actor),
            "component" => Some(Self::Component),
            "cloud" => Some(Self::Cloud),
            "folder" => Some(Self::Folder),
            "frame" | "package" | "node" => Some(Self::Container),
            _ => None,
        }
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::Process
    }
}

/// Relationship arrow vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrowKind {
    Simple,
    Conditional,
    Bidirectional,
}

impl ArrowKind {
    /// The canonical arrow token emitted on export.
    pub fn token(self) -> &'static str {
        match self {
            Self::Simple => "-->",
            Self::Conditional => "..>",
            Self::Bidirectional => "<-->",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "->" | "-->" => Some(Self::Simple),
            "..>" | "...>" => Some(Self::Conditional),
            "<->" | "<-->" => Some(Self::Bidirectional),
            _ => None,
        }
    }
}

impl Default for ArrowKind {
    fn default() -> Self {
        Self::Simple
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowNode {
    alias: Option<String>,
    kind: NodeKind,
    label: String,
    stereotype: Option<String>,
}

impl WorkflowNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            alias: None,
            kind: NodeKind::default(),
            label: label.into(),
            stereotype: None,
        }
    }

    pub fn new_with(label: impl Into<String>, kind: NodeKind, alias: Option<String>) -> Self {
        Self {
            alias,
            kind,
            label: label.into(),
            stereotype: None,
        }
    }

    pub fn set_alias<T: Into<String>>(&mut self, alias: Option<T>) {
        self.alias = alias.map(Into::into);
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_stereotype<T: Into<String>>(&mut self, stereotype: Option<T>) {
        self.stereotype = stereotype.map(Into::into);
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stereotype(&self) -> Option<&str> {
        self.stereotype.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowEdge {
    from_node_id: NodeId,
    to_node_id: NodeId,
    label: Option<String>,
    arrow: ArrowKind,
}

impl WorkflowEdge {
    pub fn new(from_node_id: NodeId, to_node_id: NodeId) -> Self {
        Self {
            from_node_id,
            to_node_id,
            label: None,
            arrow: ArrowKind::default(),
        }
    }

    pub fn new_with(
        from_node_id: NodeId,
        to_node_id: NodeId,
        label: Option<String>,
        arrow: ArrowKind,
    ) -> Self {
        Self {
            from_node_id,
            to_node_id,
            label,
            arrow,
        }
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn set_arrow(&mut self, arrow: ArrowKind) {
        self.arrow = arrow;
    }

    pub fn from_node_id(&self) -> &NodeId {
        &self.from_node_id
    }

    pub fn to_node_id(&self) -> &NodeId {
        &self.to_node_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn arrow(&self) -> ArrowKind {
        self.arrow
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowGroup {
    alias: Option<String>,
    label: String,
    nodes: BTreeSet<NodeId>,
    groups: BTreeSet<GroupId>,
}

impl WorkflowGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            alias: None,
            label: label.into(),
            nodes: BTreeSet::new(),
            groups: BTreeSet::new(),
        }
    }

    pub fn new_with(
        label: impl Into<String>,
        alias: Option<String>,
        nodes: BTreeSet<NodeId>,
        groups: BTreeSet<GroupId>,
    ) -> Self {
        Self {
            alias,
            label: label.into(),
            nodes,
            groups,
        }
    }

    pub fn set_alias<T: Into<String>>(&mut self, alias: Option<T>) {
        self.alias = alias.map(Into::into);
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    pub fn groups(&self) -> &BTreeSet<GroupId> {
        &self.groups
    }
}

/// A mutation rejected by [`WorkflowGraph`].
///
/// Every mutation is atomic: a rejected operation leaves the graph exactly as
/// it was, with no partial application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphMutationError {
    NodeNotFound { node_id: NodeId },
    EdgeNotFound { edge_id: EdgeId },
    GroupNotFound { group_id: GroupId },
    DuplicateId { id: String },
    DanglingEdge { edge_id: EdgeId, node_id: NodeId },
    CyclicGroup { group_id: GroupId },
}

impl fmt::Display for GraphMutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found (id={node_id})"),
            Self::EdgeNotFound { edge_id } => write!(f, "edge not found (id={edge_id})"),
            Self::GroupNotFound { group_id } => write!(f, "group not found (id={group_id})"),
            Self::DuplicateId { id } => write!(f, "id is already in use (id={id})"),
            Self::DanglingEdge { edge_id, node_id } => {
                write!(f, "edge {edge_id} would dangle on missing node {node_id}")
            }
            Self::CyclicGroup { group_id } => {
                write!(f, "group {group_id} would contain itself")
            }
        }
    }
}

impl std::error::Error for GraphMutationError {}

/// The canonical in-memory representation of one workflow diagram.
///
/// Nodes and edges keep their authored order (it is layout-significant on
/// export); lookups go through the id maps. Groups may nest but must never
/// contain themselves transitively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowGraph {
    nodes: BTreeMap<NodeId, WorkflowNode>,
    node_order: Vec<NodeId>,
    edges: BTreeMap<EdgeId, WorkflowEdge>,
    edge_order: Vec<EdgeId>,
    groups: BTreeMap<GroupId, WorkflowGroup>,
    group_order: Vec<GroupId>,
}

impl WorkflowGraph {
    pub fn node(&self, node_id: &NodeId) -> Option<&WorkflowNode> {
        self.nodes.get(node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&WorkflowEdge> {
        self.edges.get(edge_id)
    }

    pub fn group(&self, group_id: &GroupId) -> Option<&WorkflowGroup> {
        self.groups.get(group_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Nodes in authored order.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = (&NodeId, &WorkflowNode)> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// Edges in authored order.
    pub fn edges_in_order(&self) -> impl Iterator<Item = (&EdgeId, &WorkflowEdge)> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id).map(|edge| (id, edge)))
    }

    /// Groups in authored order.
    pub fn groups_in_order(&self) -> impl Iterator<Item = (&GroupId, &WorkflowGroup)> {
        self.group_order.iter().filter_map(|id| self.groups.get(id).map(|group| (id, group)))
    }

    /// The group a node is a direct member of, if any.
    pub fn node_group(&self, node_id: &NodeId) -> Option<&GroupId> {
        self.group_order
            .iter()
            .find(|group_id| {
                self.groups
                    .get(*group_id)
                    .is_some_and(|group| group.nodes().contains(node_id))
            })
    }

    /// The group a group is a direct child of, if any.
    pub fn parent_group(&self, group_id: &GroupId) -> Option<&GroupId> {
        self.group_order
            .iter()
            .find(|candidate| {
                self.groups
                    .get(*candidate)
                    .is_some_and(|group| group.groups().contains(group_id))
            })
    }

    /// Edges touching a node, in authored order.
    pub fn edges_touching(&self, node_id: &NodeId) -> Vec<EdgeId> {
        self.edges_in_order()
            .filter(|(_, edge)| edge.from_node_id() == node_id || edge.to_node_id() == node_id)
            .map(|(edge_id, _)| edge_id.clone())
            .collect()
    }

    pub fn insert_node(
        &mut self,
        node_id: NodeId,
        node: WorkflowNode,
    ) -> Result<(), GraphMutationError> {
        if self.nodes.contains_key(&node_id) {
            return Err(GraphMutationError::DuplicateId {
                id: node_id.into_string(),
            });
        }
        self.node_order.push(node_id.clone());
        self.nodes.insert(node_id, node);
        Ok(())
    }

    pub fn update_node(
        &mut self,
        node_id: &NodeId,
        kind: Option<NodeKind>,
        label: Option<String>,
    ) -> Result<(), GraphMutationError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphMutationError::NodeNotFound {
                node_id: node_id.clone(),
            })?;
        if let Some(kind) = kind {
            node.set_kind(kind);
        }
        if let Some(label) = label {
            node.set_label(label);
        }
        Ok(())
    }

    pub fn set_node_stereotype(
        &mut self,
        node_id: &NodeId,
        stereotype: Option<String>,
    ) -> Result<(), GraphMutationError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphMutationError::NodeNotFound {
                node_id: node_id.clone(),
            })?;
        node.set_stereotype(stereotype);
        Ok(())
    }

    /// Remove a node. Rejected with [`DanglingEdge`] while any edge still
    /// references it; group memberships are detached as part of the removal.
    ///
    /// [`DanglingEdge`]: GraphMutationError::DanglingEdge
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<WorkflowNode, GraphMutationError> {
        if !self.nodes.contains_key(node_id) {
            return Err(GraphMutationError::NodeNotFound {
                node_id: node_id.clone(),
            });
        }
        if let Some((edge_id, _)) = self
            .edges_in_order()
            .find(|(_, edge)| edge.from_node_id() == node_id || edge.to_node_id() == node_id)
        {
            return Err(GraphMutationError::DanglingEdge {
                edge_id: edge_id.clone(),
                node_id: node_id.clone(),
            });
        }

        for group in self.groups.values_mut() {
            group.nodes.remove(node_id);
        }
        self.node_order.retain(|id| id != node_id);
        let node = self
            .nodes
            .remove(node_id)
            .unwrap_or_else(|| unreachable!("presence checked above"));
        Ok(node)
    }

    pub fn insert_edge(
        &mut self,
        edge_id: EdgeId,
        edge: WorkflowEdge,
    ) -> Result<(), GraphMutationError> {
        if self.edges.contains_key(&edge_id) {
            return Err(GraphMutationError::DuplicateId {
                id: edge_id.into_string(),
            });
        }
        for node_id in [edge.from_node_id(), edge.to_node_id()] {
            if !self.nodes.contains_key(node_id) {
                return Err(GraphMutationError::DanglingEdge {
                    edge_id,
                    node_id: node_id.clone(),
                });
            }
        }
        self.edge_order.push(edge_id.clone());
        self.edges.insert(edge_id, edge);
        Ok(())
    }

    pub fn update_edge(
        &mut self,
        edge_id: &EdgeId,
        label: Option<Option<String>>,
        arrow: Option<ArrowKind>,
    ) -> Result<(), GraphMutationError> {
        let edge = self
            .edges
            .get_mut(edge_id)
            .ok_or_else(|| GraphMutationError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })?;
        if let Some(label) = label {
            edge.set_label(label);
        }
        if let Some(arrow) = arrow {
            edge.set_arrow(arrow);
        }
        Ok(())
    }

    /// Re-point an edge at new endpoints; both must exist before the swap.
    pub fn reattach_edge(
        &mut self,
        edge_id: &EdgeId,
        from_node_id: NodeId,
        to_node_id: NodeId,
    ) -> Result<(), GraphMutationError> {
        if !self.edges.contains_key(edge_id) {
            return Err(GraphMutationError::EdgeNotFound {
                edge_id: edge_id.clone(),
            });
        }
        for node_id in [&from_node_id, &to_node_id] {
            if !self.nodes.contains_key(node_id) {
                return Err(GraphMutationError::DanglingEdge {
                    edge_id: edge_id.clone(),
                    node_id: node_id.clone(),
                });
            }
        }
        let edge = self
            .edges
            .get_mut(edge_id)
            .unwrap_or_else(|| unreachable!("presence checked above"));
        edge.from_node_id = from_node_id;
        edge.to_node_id = to_node_id;
        Ok(())
    }

    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> Result<WorkflowEdge, GraphMutationError> {
        let edge = self
            .edges
            .remove(edge_id)
            .ok_or_else(|| GraphMutationError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })?;
        self.edge_order.retain(|id| id != edge_id);
        Ok(edge)
    }

    pub fn insert_group(
        &mut self,
        group_id: GroupId,
        group: WorkflowGroup,
    ) -> Result<(), GraphMutationError> {
        if self.groups.contains_key(&group_id) {
            return Err(GraphMutationError::DuplicateId {
                id: group_id.into_string(),
            });
        }
        for node_id in group.nodes() {
            if !self.nodes.contains_key(node_id) {
                return Err(GraphMutationError::NodeNotFound {
                    node_id: node_id.clone(),
                });
            }
        }
        for child_id in group.groups() {
            if child_id == &group_id {
                return Err(GraphMutationError::CyclicGroup { group_id });
            }
            if !self.groups.contains_key(child_id) {
                return Err(GraphMutationError::GroupNotFound {
                    group_id: child_id.clone(),
                });
            }
        }
        // A new group cannot be reachable from its children yet, so listing
        // existing groups as children cannot close a cycle here.
        self.group_order.push(group_id.clone());
        self.groups.insert(group_id, group);
        Ok(())
    }

    pub fn set_group_label(
        &mut self,
        group_id: &GroupId,
        label: String,
    ) -> Result<(), GraphMutationError> {
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| GraphMutationError::GroupNotFound {
                group_id: group_id.clone(),
            })?;
        group.set_label(label);
        Ok(())
    }

    /// Replace a group's membership. Rejected if any member is missing or if
    /// the proposed children would make the group contain itself, directly or
    /// transitively.
    pub fn set_group_members(
        &mut self,
        group_id: &GroupId,
        nodes: BTreeSet<NodeId>,
        groups: BTreeSet<GroupId>,
    ) -> Result<(), GraphMutationError> {
        if !self.groups.contains_key(group_id) {
            return Err(GraphMutationError::GroupNotFound {
                group_id: group_id.clone(),
            });
        }
        for node_id in &nodes {
            if !self.nodes.contains_key(node_id) {
                return Err(GraphMutationError::NodeNotFound {
                    node_id: node_id.clone(),
                });
            }
        }
        for child_id in &groups {
            if !self.groups.contains_key(child_id) {
                return Err(GraphMutationError::GroupNotFound {
                    group_id: child_id.clone(),
                });
            }
        }
        if self.would_contain_itself(group_id, &groups) {
            return Err(GraphMutationError::CyclicGroup {
                group_id: group_id.clone(),
            });
        }

        let group = self
            .groups
            .get_mut(group_id)
            .unwrap_or_else(|| unreachable!("presence checked above"));
        group.nodes = nodes;
        group.groups = groups;
        Ok(())
    }

    pub fn remove_group(&mut self, group_id: &GroupId) -> Result<WorkflowGroup, GraphMutationError> {
        let group = self
            .groups
            .remove(group_id)
            .ok_or_else(|| GraphMutationError::GroupNotFound {
                group_id: group_id.clone(),
            })?;
        self.group_order.retain(|id| id != group_id);
        for other in self.groups.values_mut() {
            other.groups.remove(group_id);
        }
        Ok(group)
    }

    /// Depth-first reachability over the proposed child set: the mutation is
    /// cyclic if `group_id` is reachable from any proposed child through the
    /// existing containment edges.
    fn would_contain_itself(&self, group_id: &GroupId, children: &BTreeSet<GroupId>) -> bool {
        let mut stack: Vec<&GroupId> = children.iter().collect();
        let mut visited = BTreeSet::<&GroupId>::new();

        while let Some(current) = stack.pop() {
            if current == group_id {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(group) = self.groups.get(current) {
                stack.extend(group.groups().iter());
            }
        }
        false
    }
}

/// Test-only escape hatches. The public mutations refuse referentially broken
/// state, but the validator rules for exactly that state still need graphs to
/// run against.
#[cfg(test)]
impl WorkflowGraph {
    pub(crate) fn insert_edge_unchecked(&mut self, edge_id: EdgeId, edge: WorkflowEdge) {
        self.edge_order.push(edge_id.clone());
        self.edges.insert(edge_id, edge);
    }

    pub(crate) fn insert_group_unchecked(&mut self, group_id: GroupId, group: WorkflowGroup) {
        self.group_order.push(group_id.clone());
        self.groups.insert(group_id, group);
    }
}
