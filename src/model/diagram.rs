// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::graph::WorkflowGraph;

/// A single workflow diagram artifact: the graph plus its PlantUML header
/// metadata and an optimistic-concurrency revision counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    title: String,
    theme: Option<String>,
    graph: WorkflowGraph,
    rev: u64,
}

impl Diagram {
    pub fn new(title: impl Into<String>, graph: WorkflowGraph) -> Self {
        Self {
            title: title.into(),
            theme: None,
            graph,
            rev: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn set_theme<T: Into<String>>(&mut self, theme: Option<T>) {
        self.theme = theme.map(Into::into);
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// Swap in a fully prepared graph snapshot. Compound edits build the
    /// replacement on a clone and commit it here, so readers never observe a
    /// torn intermediate state.
    pub fn replace_graph(&mut self, graph: WorkflowGraph) -> WorkflowGraph {
        std::mem::replace(&mut self.graph, graph)
    }

    pub fn set_graph(&mut self, graph: WorkflowGraph) {
        self.replace_graph(graph);
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}
