// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::diagram::Diagram;
use super::graph::{ArrowKind, NodeKind, WorkflowEdge, WorkflowGraph, WorkflowGroup, WorkflowNode};
use super::ids::{EdgeId, GroupId, NodeId};

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn eid(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

fn gid(value: &str) -> GroupId {
    GroupId::new(value).expect("group id")
}

/// A small data-pipeline workflow: ingest feeds a grouped transform stage
/// that writes to a warehouse, with a conditional alerting hop.
pub(crate) fn data_pipeline() -> Diagram {
    let mut graph = WorkflowGraph::default();

    let n_ingest = nid("n:ingest");
    let n_clean = nid("n:clean");
    let n_enrich = nid("n:enrich");
    let n_warehouse = nid("n:warehouse");
    let n_alerts = nid("n:alerts");

    graph
        .insert_node(
            n_ingest.clone(),
            WorkflowNode::new_with("Ingest", NodeKind::Process, Some("ingest".to_owned())),
        )
        .expect("insert ingest");
    graph
        .insert_node(
            n_clean.clone(),
            WorkflowNode::new_with("Clean", NodeKind::Process, Some("clean".to_owned())),
        )
        .expect("insert clean");
    graph
        .insert_node(
            n_enrich.clone(),
            WorkflowNode::new_with("Enrich", NodeKind::Component, Some("enrich".to_owned())),
        )
        .expect("insert enrich");
    graph
        .insert_node(
            n_warehouse.clone(),
            WorkflowNode::new_with("Warehouse", NodeKind::Database, Some("warehouse".to_owned())),
        )
        .expect("insert warehouse");
    graph
        .insert_node(
            n_alerts.clone(),
            WorkflowNode::new_with("Alerts", NodeKind::Cloud, Some("alerts".to_owned())),
        )
        .expect("insert alerts");

    graph
        .insert_group(
            gid("g:transform"),
            WorkflowGroup::new_with(
                "Transform",
                Some("transform".to_owned()),
                [n_clean.clone(), n_enrich.clone()].into_iter().collect(),
                BTreeSet::new(),
            ),
        )
        .expect("insert transform group");

    graph
        .insert_edge(
            eid("e:0"),
            WorkflowEdge::new_with(
                n_ingest,
                n_clean.clone(),
                Some("raw".to_owned()),
                ArrowKind::Simple,
            ),
        )
        .expect("edge ingest->clean");
    graph
        .insert_edge(eid("e:1"), WorkflowEdge::new(n_clean, n_enrich.clone()))
        .expect("edge clean->enrich");
    graph
        .insert_edge(
            eid("e:2"),
            WorkflowEdge::new_with(
                n_enrich.clone(),
                n_warehouse,
                Some("load".to_owned()),
                ArrowKind::Simple,
            ),
        )
        .expect("edge enrich->warehouse");
    graph
        .insert_edge(
            eid("e:3"),
            WorkflowEdge::new_with(
                n_enrich,
                n_alerts,
                Some("on failure".to_owned()),
                ArrowKind::Conditional,
            ),
        )
        .expect("edge enrich->alerts");

    let mut diagram = Diagram::new("Data Pipeline", graph);
    diagram.set_theme(Some("plain"));
    diagram
}

/// Two-node handshake with a bidirectional arrow, the smallest diagram that
/// exercises every arrow kind mapping.
pub(crate) fn handshake() -> Diagram {
    let mut graph = WorkflowGraph::default();

    let n_client = nid("n:client");
    let n_server = nid("n:server");

    graph
        .insert_node(
            n_client.clone(),
            WorkflowNode::new_with("Client", NodeKind::Actor, Some("client".to_owned())),
        )
        .expect("insert client");
    graph
        .insert_node(
            n_server.clone(),
            WorkflowNode::new_with("Server", NodeKind::Container, Some("server".to_owned())),
        )
        .expect("insert server");

    graph
        .insert_edge(
            eid("e:0"),
            WorkflowEdge::new_with(
                n_client,
                n_server,
                Some("sync".to_owned()),
                ArrowKind::Bidirectional,
            ),
        )
        .expect("edge client<->server");

    Diagram::new("Handshake", graph)
}
