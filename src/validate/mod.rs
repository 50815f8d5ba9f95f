// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural validation.
//!
//! Rules run in a fixed order and each rule is independently checkable.
//! Error-severity violations block saving; warnings never do.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::diagram::Diagram;
use crate::model::graph::WorkflowGraph;
use crate::model::ids::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    DanglingEdge,
    DuplicateNodeId,
    CyclicGroup,
    UnknownGroupMember,
    UnserializableText,
    EmptyDiagram,
}

impl ViolationKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::DanglingEdge
            | Self::DuplicateNodeId
            | Self::CyclicGroup
            | Self::UnknownGroupMember
            | Self::UnserializableText => Severity::Error,
            Self::EmptyDiagram => Severity::Warning,
        }
    }
}

/// One finding of [`validate_diagram`]: the rule that fired, its severity,
/// a human-readable message, and the ids of the offending entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    kind: ViolationKind,
    message: String,
    entity_ids: Vec<String>,
}

impl Violation {
    fn new(kind: ViolationKind, message: String, entity_ids: Vec<String>) -> Self {
        Self {
            kind,
            message,
            entity_ids,
        }
    }

    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entity_ids(&self) -> &[String] {
        &self.entity_ids
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity(), self.message)
    }
}

pub fn has_errors(violations: &[Violation]) -> bool {
    violations.iter().any(|v| v.severity().is_error())
}

/// Run every structural rule against the diagram.
pub fn validate_diagram(diagram: &Diagram) -> Vec<Violation> {
    let graph = diagram.graph();
    let mut violations = Vec::new();

    check_dangling_edges(graph, &mut violations);
    check_duplicate_node_ids(graph, &mut violations);
    check_cyclic_groups(graph, &mut violations);
    check_group_members(graph, &mut violations);
    check_serializable_text(diagram, &mut violations);
    check_non_empty(graph, &mut violations);

    violations
}

fn check_dangling_edges(graph: &WorkflowGraph, violations: &mut Vec<Violation>) {
    for (edge_id, edge) in graph.edges_in_order() {
        for node_id in [edge.from_node_id(), edge.to_node_id()] {
            if graph.node(node_id).is_none() {
                violations.push(Violation::new(
                    ViolationKind::DanglingEdge,
                    format!("edge {edge_id} references missing node {node_id}"),
                    vec![edge_id.as_str().to_owned(), node_id.as_str().to_owned()],
                ));
            }
        }
    }
}

/// Two distinct nodes exporting under the same alias would merge into one on
/// the next parse, so alias collisions count as duplicate identity.
fn check_duplicate_node_ids(graph: &WorkflowGraph, violations: &mut Vec<Violation>) {
    let mut by_alias: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (node_id, node) in graph.nodes_in_order() {
        let alias = node.alias().unwrap_or_else(|| node_id.suffix()).to_owned();
        by_alias.entry(alias).or_default().push(node_id.as_str().to_owned());
    }
    for (alias, node_ids) in by_alias {
        if node_ids.len() > 1 {
            violations.push(Violation::new(
                ViolationKind::DuplicateNodeId,
                format!("{} nodes share the identity '{alias}'", node_ids.len()),
                node_ids,
            ));
        }
    }
}

fn check_cyclic_groups(graph: &WorkflowGraph, violations: &mut Vec<Violation>) {
    for (group_id, _) in graph.groups_in_order() {
        if group_reaches_itself(graph, group_id) {
            violations.push(Violation::new(
                ViolationKind::CyclicGroup,
                format!("group {group_id} contains itself"),
                vec![group_id.as_str().to_owned()],
            ));
        }
    }
}

fn group_reaches_itself(graph: &WorkflowGraph, group_id: &GroupId) -> bool {
    let Some(group) = graph.group(group_id) else {
        return false;
    };
    let mut stack: Vec<&GroupId> = group.groups().iter().collect();
    let mut visited = BTreeSet::<&GroupId>::new();
    while let Some(current) = stack.pop() {
        if current == group_id {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(child) = graph.group(current) {
            stack.extend(child.groups().iter());
        }
    }
    false
}

fn check_group_members(graph: &WorkflowGraph, violations: &mut Vec<Violation>) {
    for (group_id, group) in graph.groups_in_order() {
        for node_id in group.nodes() {
            if graph.node(node_id).is_none() {
                violations.push(Violation::new(
                    ViolationKind::UnknownGroupMember,
                    format!("group {group_id} lists missing node {node_id}"),
                    vec![group_id.as_str().to_owned(), node_id.as_str().to_owned()],
                ));
            }
        }
        for child_id in group.groups() {
            if graph.group(child_id).is_none() {
                violations.push(Violation::new(
                    ViolationKind::UnknownGroupMember,
                    format!("group {group_id} lists missing group {child_id}"),
                    vec![group_id.as_str().to_owned(), child_id.as_str().to_owned()],
                ));
            }
        }
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains('\n') || text.contains('\r')
}

fn breaks_quoted_label(text: &str) -> bool {
    text.is_empty() || text.contains('"') || has_line_break(text)
}

/// Every label, title, and theme must survive export and reparse. The parser
/// can never produce text that fails here; edits can, and letting such a
/// snapshot persist would reopen as a broken tab.
fn check_serializable_text(diagram: &Diagram, violations: &mut Vec<Violation>) {
    if has_line_break(diagram.title())
        || (!diagram.title().is_empty() && diagram.title().trim().is_empty())
    {
        violations.push(Violation::new(
            ViolationKind::UnserializableText,
            "title must be a single non-blank line".to_owned(),
            Vec::new(),
        ));
    }
    if let Some(theme) = diagram.theme() {
        if theme.is_empty() || theme.chars().any(char::is_whitespace) {
            violations.push(Violation::new(
                ViolationKind::UnserializableText,
                "theme must be a single word".to_owned(),
                Vec::new(),
            ));
        }
    }

    let graph = diagram.graph();
    for (node_id, node) in graph.nodes_in_order() {
        if breaks_quoted_label(node.label()) {
            violations.push(Violation::new(
                ViolationKind::UnserializableText,
                format!("label of node {node_id} is empty or contains '\"' or a line break"),
                vec![node_id.as_str().to_owned()],
            ));
        }
        if let Some(stereotype) = node.stereotype() {
            if stereotype.is_empty()
                || stereotype.contains('<')
                || stereotype.contains('>')
                || has_line_break(stereotype)
            {
                violations.push(Violation::new(
                    ViolationKind::UnserializableText,
                    format!(
                        "stereotype of node {node_id} is empty or contains '<', '>', or a line break"
                    ),
                    vec![node_id.as_str().to_owned()],
                ));
            }
        }
    }
    for (group_id, group) in graph.groups_in_order() {
        if breaks_quoted_label(group.label()) {
            violations.push(Violation::new(
                ViolationKind::UnserializableText,
                format!("label of group {group_id} is empty or contains '\"' or a line break"),
                vec![group_id.as_str().to_owned()],
            ));
        }
    }
    for (edge_id, edge) in graph.edges_in_order() {
        if let Some(label) = edge.label() {
            if label.contains('"') || has_line_break(label) {
                violations.push(Violation::new(
                    ViolationKind::UnserializableText,
                    format!("label of edge {edge_id} contains '\"' or a line break"),
                    vec![edge_id.as_str().to_owned()],
                ));
            }
        }
    }
}

fn check_non_empty(graph: &WorkflowGraph, violations: &mut Vec<Violation>) {
    if graph.node_count() == 0 {
        violations.push(Violation::new(
            ViolationKind::EmptyDiagram,
            "diagram has no nodes".to_owned(),
            Vec::new(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{has_errors, validate_diagram, Severity, ViolationKind};
    use crate::model::diagram::Diagram;
    use crate::model::fixtures;
    use crate::model::graph::{WorkflowEdge, WorkflowGraph, WorkflowGroup, WorkflowNode};
    use crate::model::ids::{EdgeId, GroupId, NodeId};

    #[test]
    fn fixture_is_structurally_valid() {
        let violations = validate_diagram(&fixtures::data_pipeline());
        assert!(violations.is_empty(), "unexpected violations: {violations:?}");
    }

    #[test]
    fn empty_diagram_is_a_warning_not_an_error() {
        let diagram = Diagram::new("Empty", WorkflowGraph::default());
        let violations = validate_diagram(&diagram);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind(), ViolationKind::EmptyDiagram);
        assert_eq!(violations[0].severity(), Severity::Warning);
        assert!(!has_errors(&violations));
    }

    #[test]
    fn alias_collision_is_reported_as_duplicate_identity() {
        let mut graph = WorkflowGraph::default();
        let mut first = WorkflowNode::new("First");
        first.set_alias(Some("shared"));
        let mut second = WorkflowNode::new("Second");
        second.set_alias(Some("shared"));
        graph
            .insert_node(NodeId::new("n:first").expect("id"), first)
            .expect("insert");
        graph
            .insert_node(NodeId::new("n:second").expect("id"), second)
            .expect("insert");

        let violations = validate_diagram(&Diagram::new("X", graph));
        assert!(violations
            .iter()
            .any(|v| v.kind() == ViolationKind::DuplicateNodeId));
        assert!(has_errors(&violations));
    }

    #[test]
    fn dangling_edge_yields_exactly_one_error_naming_the_edge() {
        let mut graph = WorkflowGraph::default();
        graph
            .insert_node(NodeId::new("n:a").expect("id"), WorkflowNode::new("A"))
            .expect("insert");
        graph.insert_edge_unchecked(
            EdgeId::new("e:0").expect("id"),
            WorkflowEdge::new(
                NodeId::new("n:a").expect("id"),
                NodeId::new("n:gone").expect("id"),
            ),
        );

        let violations = validate_diagram(&Diagram::new("X", graph));
        assert_eq!(violations.len(), 1, "unexpected violations: {violations:?}");
        assert_eq!(violations[0].kind(), ViolationKind::DanglingEdge);
        assert_eq!(violations[0].severity(), Severity::Error);
        assert!(violations[0].entity_ids().contains(&"e:0".to_owned()));
        assert!(has_errors(&violations));
    }

    #[test]
    fn mutually_nested_groups_are_flagged_as_cyclic() {
        let mut graph = WorkflowGraph::default();
        graph
            .insert_node(NodeId::new("n:a").expect("id"), WorkflowNode::new("A"))
            .expect("insert");
        let outer = GroupId::new("g:outer").expect("id");
        let inner = GroupId::new("g:inner").expect("id");
        graph.insert_group_unchecked(
            outer.clone(),
            WorkflowGroup::new_with(
                "Outer",
                None,
                BTreeSet::new(),
                [inner.clone()].into_iter().collect(),
            ),
        );
        graph.insert_group_unchecked(
            inner,
            WorkflowGroup::new_with(
                "Inner",
                None,
                BTreeSet::new(),
                [outer].into_iter().collect(),
            ),
        );

        let violations = validate_diagram(&Diagram::new("X", graph));
        let cyclic = violations
            .iter()
            .filter(|v| v.kind() == ViolationKind::CyclicGroup)
            .count();
        assert_eq!(cyclic, 2, "unexpected violations: {violations:?}");
        assert!(has_errors(&violations));
    }

    #[test]
    fn missing_group_members_are_each_reported() {
        let mut graph = WorkflowGraph::default();
        graph
            .insert_node(NodeId::new("n:a").expect("id"), WorkflowNode::new("A"))
            .expect("insert");
        graph.insert_group_unchecked(
            GroupId::new("g:stage").expect("id"),
            WorkflowGroup::new_with(
                "Stage",
                None,
                [NodeId::new("n:gone").expect("id")].into_iter().collect(),
                [GroupId::new("g:gone").expect("id")].into_iter().collect(),
            ),
        );

        let violations = validate_diagram(&Diagram::new("X", graph));
        let unknown = violations
            .iter()
            .filter(|v| v.kind() == ViolationKind::UnknownGroupMember)
            .collect::<Vec<_>>();
        assert_eq!(unknown.len(), 2, "unexpected violations: {violations:?}");
        assert!(unknown
            .iter()
            .all(|v| v.entity_ids().contains(&"g:stage".to_owned())));
    }

    #[test]
    fn quoted_node_label_is_rejected_as_unserializable() {
        let mut graph = WorkflowGraph::default();
        graph
            .insert_node(
                NodeId::new("n:x").expect("id"),
                WorkflowNode::new("Say \"hi\""),
            )
            .expect("insert");

        let violations = validate_diagram(&Diagram::new("X", graph));
        assert_eq!(violations.len(), 1, "unexpected violations: {violations:?}");
        assert_eq!(violations[0].kind(), ViolationKind::UnserializableText);
        assert_eq!(violations[0].severity(), Severity::Error);
        assert!(violations[0].entity_ids().contains(&"n:x".to_owned()));
    }

    #[test]
    fn multiline_title_and_wordy_theme_are_both_flagged() {
        let mut graph = WorkflowGraph::default();
        graph
            .insert_node(NodeId::new("n:a").expect("id"), WorkflowNode::new("A"))
            .expect("insert");
        let mut diagram = Diagram::new("Line one\nline two", graph);
        diagram.set_theme(Some("two words"));

        let violations = validate_diagram(&diagram);
        let unserializable = violations
            .iter()
            .filter(|v| v.kind() == ViolationKind::UnserializableText)
            .count();
        assert_eq!(unserializable, 2, "unexpected violations: {violations:?}");
    }

    #[test]
    fn quoted_edge_label_is_rejected_as_unserializable() {
        let mut graph = WorkflowGraph::default();
        graph
            .insert_node(NodeId::new("n:a").expect("id"), WorkflowNode::new("A"))
            .expect("insert");
        graph
            .insert_node(NodeId::new("n:b").expect("id"), WorkflowNode::new("B"))
            .expect("insert");
        let mut edge = WorkflowEdge::new(
            NodeId::new("n:a").expect("id"),
            NodeId::new("n:b").expect("id"),
        );
        edge.set_label(Some("say \"go\""));
        graph
            .insert_edge(EdgeId::new("e:0").expect("id"), edge)
            .expect("insert");

        let violations = validate_diagram(&Diagram::new("X", graph));
        assert_eq!(violations.len(), 1, "unexpected violations: {violations:?}");
        assert_eq!(violations[0].kind(), ViolationKind::UnserializableText);
        assert!(violations[0].entity_ids().contains(&"e:0".to_owned()));
    }
}
