// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::ident::{alias_from_label, sanitize_alias, validate_alias};
pub use super::ident::AliasError;

use crate::model::diagram::Diagram;
use crate::model::graph::{
    ArrowKind, NodeKind, WorkflowEdge, WorkflowGraph, WorkflowGroup, WorkflowNode,
};
use crate::model::ids::{EdgeId, GroupId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowParseError {
    MissingHeader,
    UnsupportedSyntax {
        line_no: usize,
        line: String,
    },
    InvalidAlias {
        line_no: usize,
        name: String,
        reason: AliasError,
    },
    DuplicateGroupAlias {
        line_no: usize,
        alias: String,
    },
    UnclosedGroup {
        label: String,
    },
    UnexpectedGroupEnd {
        line_no: usize,
    },
}

impl fmt::Display for WorkflowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => {
                f.write_str("expected '@startuml' as the first non-comment line")
            }
            Self::UnsupportedSyntax { line_no, line } => {
                write!(f, "unsupported PlantUML syntax on line {line_no}: {line}")
            }
            Self::InvalidAlias {
                line_no,
                name,
                reason,
            } => write!(f, "invalid alias on line {line_no}: {name:?} ({reason})"),
            Self::DuplicateGroupAlias { line_no, alias } => {
                write!(f, "duplicate group alias on line {line_no}: {alias}")
            }
            Self::UnclosedGroup { label } => {
                write!(f, "group block {label:?} is never closed")
            }
            Self::UnexpectedGroupEnd { line_no } => {
                write!(f, "'}}' on line {line_no} closes no open group block")
            }
        }
    }
}

impl std::error::Error for WorkflowParseError {}

fn node_id_from_alias(alias: &str) -> NodeId {
    NodeId::from_suffix(alias).expect("valid node id")
}

fn group_id_from_alias(alias: &str) -> GroupId {
    GroupId::from_suffix(alias).expect("valid group id")
}

fn edge_id_from_index(index: usize) -> EdgeId {
    EdgeId::from_suffix(index).expect("valid edge id")
}

const DECL_KEYWORDS: &str = "rectangle|component|actor|database|cloud|folder|frame|package|node";

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@startuml(?:\s+(.+))?$").expect("header regex"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^title\s+(.+)$").expect("title regex"))
}

fn theme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^!theme\s+(\S+)$").expect("theme regex"))
}

fn group_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r#"^({DECL_KEYWORDS})\s+"([^"]+)"(?:\s+as\s+(\w+))?\s*\{{$"#
        ))
        .expect("group open regex")
    })
}

fn decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r#"^({DECL_KEYWORDS})\s+"([^"]+)"(?:\s+as\s+(\w+))?(?:\s*<<([^<>]+)>>)?$"#
        ))
        .expect("declaration regex")
    })
}

fn rel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\w+)\s*(<-->|<->|\.\.\.>|\.\.>|-->|->)\s*(\w+)(?:\s*:\s*(?:"([^"]*)"|(\S.*?))\s*)?$"#)
            .expect("relationship regex")
    })
}

fn bare_node_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)$").expect("bare node regex"))
}

/// A relationship statement collected in pass 1 and resolved in pass 2.
#[derive(Debug, Clone)]
struct RelStmt {
    from: String,
    to: String,
    arrow: ArrowKind,
    label: Option<String>,
}

#[derive(Debug)]
struct OpenGroup {
    alias: String,
    label: String,
    nodes: BTreeSet<NodeId>,
    children: BTreeSet<GroupId>,
}

/// Overwrite-on-redeclaration: a second declaration of the same alias updates
/// kind, label, and stereotype but keeps the node's id and position.
fn ensure_declared(
    graph: &mut WorkflowGraph,
    alias: &str,
    kind: NodeKind,
    label: &str,
    stereotype: Option<&str>,
) -> NodeId {
    let node_id = node_id_from_alias(alias);
    if graph.node(&node_id).is_some() {
        graph
            .update_node(&node_id, Some(kind), Some(label.to_owned()))
            .expect("node exists");
        graph
            .set_node_stereotype(&node_id, stereotype.map(str::to_owned))
            .expect("node exists");
    } else {
        let mut node = WorkflowNode::new_with(label, kind, Some(alias.to_owned()));
        node.set_stereotype(stereotype);
        graph
            .insert_node(node_id.clone(), node)
            .expect("fresh node id");
    }
    node_id
}

/// Parse the supported PlantUML workflow subset into a [`Diagram`].
///
/// Supported:
/// - `@startuml [name]` header (required), `@enduml` footer (optional)
/// - `title` and `!theme` lines
/// - element declarations: `rectangle "Label" as alias <<stereotype>>`, with
///   keyword, alias, and stereotype each optional where the grammar allows
/// - group blocks: `package "Label" as alias { ... }`, nestable
/// - relationships: `a --> b : "label"` with arrows `->`/`-->`, `..>`/`...>`,
///   `<->`/`<-->`
/// - comment lines (`'...`) and non-theme directives (`!...`, `@...`) are
///   skipped
///
/// Two passes: declarations and groups first, edges second, so relationships
/// may reference aliases declared later (or never — those become default
/// `rectangle` nodes). Anything else fails closed with a line-numbered error.
pub fn parse_workflow(input: &str) -> Result<Diagram, WorkflowParseError> {
    let mut graph = WorkflowGraph::default();
    let mut saw_header = false;
    let mut ended = false;
    let mut title: Option<String> = None;
    let mut theme: Option<String> = None;
    let mut rels: Vec<RelStmt> = Vec::new();
    let mut open_groups: Vec<OpenGroup> = Vec::new();
    let mut finished_groups: Vec<(GroupId, WorkflowGroup)> = Vec::new();
    let mut group_aliases: BTreeSet<String> = BTreeSet::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if ended || trimmed.is_empty() || trimmed.starts_with('\'') {
            continue;
        }

        if !saw_header {
            let Some(caps) = header_re().captures(trimmed) else {
                return Err(WorkflowParseError::MissingHeader);
            };
            if let Some(name) = caps.get(1) {
                title = Some(name.as_str().trim().to_owned());
            }
            saw_header = true;
            continue;
        }

        if trimmed == "@enduml" {
            ended = true;
            continue;
        }

        if let Some(caps) = theme_re().captures(trimmed) {
            theme = Some(caps[1].to_owned());
            continue;
        }

        // Remaining directives and preprocessor lines carry no graph content.
        if trimmed.starts_with('!') || trimmed.starts_with('@') {
            continue;
        }

        if let Some(caps) = title_re().captures(trimmed) {
            title = Some(caps[1].trim().to_owned());
            continue;
        }

        if let Some(caps) = group_open_re().captures(trimmed) {
            let label = caps[2].to_owned();
            let alias = match caps.get(3) {
                Some(explicit) => explicit.as_str().to_owned(),
                None => alias_from_label(&label).map_err(|reason| {
                    WorkflowParseError::InvalidAlias {
                        line_no,
                        name: label.clone(),
                        reason,
                    }
                })?,
            };
            if !group_aliases.insert(alias.clone()) {
                return Err(WorkflowParseError::DuplicateGroupAlias { line_no, alias });
            }
            open_groups.push(OpenGroup {
                alias,
                label,
                nodes: BTreeSet::new(),
                children: BTreeSet::new(),
            });
            continue;
        }

        if trimmed == "}" {
            let Some(closed) = open_groups.pop() else {
                return Err(WorkflowParseError::UnexpectedGroupEnd { line_no });
            };
            let group_id = group_id_from_alias(&closed.alias);
            if let Some(parent) = open_groups.last_mut() {
                parent.children.insert(group_id.clone());
            }
            finished_groups.push((
                group_id,
                WorkflowGroup::new_with(
                    closed.label,
                    Some(closed.alias),
                    closed.nodes,
                    closed.children,
                ),
            ));
            continue;
        }

        if let Some(caps) = decl_re().captures(trimmed) {
            let kind = NodeKind::from_keyword(&caps[1]).expect("keyword alternation");
            let label = caps[2].to_owned();
            let stereotype = caps.get(4).map(|m| m.as_str().trim());
            let alias = match caps.get(3) {
                Some(explicit) => explicit.as_str().to_owned(),
                None => alias_from_label(&label).map_err(|reason| {
                    WorkflowParseError::InvalidAlias {
                        line_no,
                        name: label.clone(),
                        reason,
                    }
                })?,
            };
            let node_id = ensure_declared(&mut graph, &alias, kind, &label, stereotype);
            if let Some(group) = open_groups.last_mut() {
                group.nodes.insert(node_id);
            }
            continue;
        }

        if let Some(caps) = rel_re().captures(trimmed) {
            let arrow = ArrowKind::from_token(&caps[2]).expect("arrow alternation");
            let label = caps
                .get(4)
                .or(caps.get(5))
                .map(|m| m.as_str().to_owned());
            rels.push(RelStmt {
                from: caps[1].to_owned(),
                to: caps[3].to_owned(),
                arrow,
                label,
            });
            continue;
        }

        if let Some(caps) = bare_node_re().captures(trimmed) {
            let alias = caps[1].to_owned();
            let node_id = node_id_from_alias(&alias);
            if graph.node(&node_id).is_none() {
                ensure_declared(&mut graph, &alias, NodeKind::default(), &alias, None);
                if let Some(group) = open_groups.last_mut() {
                    group.nodes.insert(node_id);
                }
            }
            continue;
        }

        return Err(WorkflowParseError::UnsupportedSyntax {
            line_no,
            line: trimmed.to_owned(),
        });
    }

    if !saw_header {
        return Err(WorkflowParseError::MissingHeader);
    }
    if let Some(open) = open_groups.first() {
        return Err(WorkflowParseError::UnclosedGroup {
            label: open.label.clone(),
        });
    }

    // Pass 2: aliases referenced only by relationships become default nodes,
    // then edges resolve in statement order.
    for rel in &rels {
        for alias in [rel.from.as_str(), rel.to.as_str()] {
            let node_id = node_id_from_alias(alias);
            if graph.node(&node_id).is_none() {
                ensure_declared(&mut graph, alias, NodeKind::default(), alias, None);
            }
        }
    }
    for (index, rel) in rels.into_iter().enumerate() {
        graph
            .insert_edge(
                edge_id_from_index(index),
                WorkflowEdge::new_with(
                    node_id_from_alias(&rel.from),
                    node_id_from_alias(&rel.to),
                    rel.label,
                    rel.arrow,
                ),
            )
            .expect("endpoints ensured above");
    }

    // Close order puts children before their parents, so members always
    // exist by the time a group is inserted.
    for (group_id, group) in finished_groups {
        graph
            .insert_group(group_id, group)
            .expect("members inserted above");
    }

    let mut diagram = Diagram::new(title.unwrap_or_default(), graph);
    diagram.set_theme(theme);
    Ok(diagram)
}

fn export_alias(node_id: &NodeId, node: &WorkflowNode) -> String {
    match node.alias() {
        Some(alias) if validate_alias(alias).is_ok() => alias.to_owned(),
        _ => sanitize_alias(node_id.suffix()),
    }
}

fn push_node_decl(out: &mut String, depth: usize, node_id: &NodeId, node: &WorkflowNode) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(node.kind().keyword());
    out.push_str(" \"");
    out.push_str(node.label());
    out.push_str("\" as ");
    out.push_str(&export_alias(node_id, node));
    if let Some(stereotype) = node.stereotype() {
        out.push_str(" <<");
        out.push_str(stereotype);
        out.push_str(">>");
    }
    out.push('\n');
}

fn push_group_block(out: &mut String, depth: usize, graph: &WorkflowGraph, group_id: &GroupId) {
    let Some(group) = graph.group(group_id) else {
        return;
    };
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("package \"");
    out.push_str(group.label());
    out.push_str("\" as ");
    match group.alias() {
        Some(alias) if validate_alias(alias).is_ok() => out.push_str(alias),
        _ => out.push_str(&sanitize_alias(group_id.suffix())),
    }
    out.push_str(" {\n");

    for (node_id, node) in graph.nodes_in_order() {
        if group.nodes().contains(node_id) {
            push_node_decl(out, depth + 1, node_id, node);
        }
    }
    for (child_id, _) in graph.groups_in_order() {
        if group.groups().contains(child_id) {
            push_group_block(out, depth + 1, graph, child_id);
        }
    }

    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("}\n");
}

/// Export a diagram to canonical PlantUML text.
///
/// Deterministic and total on structurally valid diagrams: header and theme
/// first, then ungrouped nodes in stored order, group blocks (members inside,
/// never repeated at top level), edges in stored order, `@enduml`.
///
/// # Panics
///
/// Panics if an edge references a node that is not in the graph. The graph's
/// mutation layer rejects every path to that state, so reaching it here means
/// a corrupt snapshot and continuing would persist it.
pub fn export_workflow(diagram: &Diagram) -> String {
    let graph = diagram.graph();
    let mut out = String::new();

    out.push_str("@startuml");
    if !diagram.title().is_empty() {
        out.push(' ');
        out.push_str(diagram.title());
    }
    out.push('\n');
    if let Some(theme) = diagram.theme() {
        out.push_str("!theme ");
        out.push_str(theme);
        out.push('\n');
    }
    if !diagram.title().is_empty() {
        out.push_str("title ");
        out.push_str(diagram.title());
        out.push('\n');
    }

    if graph.node_count() > 0 || graph.group_count() > 0 {
        out.push('\n');
    }
    for (node_id, node) in graph.nodes_in_order() {
        if graph.node_group(node_id).is_none() {
            push_node_decl(&mut out, 0, node_id, node);
        }
    }
    for (group_id, _) in graph.groups_in_order() {
        if graph.parent_group(group_id).is_none() {
            push_group_block(&mut out, 0, graph, group_id);
        }
    }

    if graph.edge_count() > 0 {
        out.push('\n');
    }
    for (edge_id, edge) in graph.edges_in_order() {
        let from = graph.node(edge.from_node_id()).unwrap_or_else(|| {
            panic!(
                "corrupt snapshot: edge {edge_id} references missing node {}",
                edge.from_node_id()
            )
        });
        let to = graph.node(edge.to_node_id()).unwrap_or_else(|| {
            panic!(
                "corrupt snapshot: edge {edge_id} references missing node {}",
                edge.to_node_id()
            )
        });

        out.push_str(&export_alias(edge.from_node_id(), from));
        out.push(' ');
        out.push_str(edge.arrow().token());
        out.push(' ');
        out.push_str(&export_alias(edge.to_node_id(), to));
        if let Some(label) = edge.label() {
            out.push_str(" : \"");
            out.push_str(label);
            out.push('"');
        }
        out.push('\n');
    }

    out.push_str("@enduml\n");
    out
}
