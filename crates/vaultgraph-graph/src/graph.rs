//! Frozen link graph on petgraph

use chrono::{DateTime, Utc};
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node index type for graph
pub type NodeIndex = petgraph::graph::NodeIndex;

/// Per-note payload stored on each graph node
#[derive(Debug, Clone)]
pub struct NoteNode {
    pub path: String,
    pub title: String,
    pub tags: Vec<String>,
    pub modified: Option<DateTime<Utc>>,
    pub frontmatter: Option<serde_json::Value>,
    /// Outbound targets in first-seen link order
    pub link_order: Vec<String>,
}

/// Directed graph of surviving notes and their deduplicated links.
///
/// Nodes are inserted in sorted path order, so index order equals path order
/// and sorting indices sorts paths.
#[derive(Debug, Clone)]
pub struct LinkGraph {
    /// Directed graph: nodes are notes, edges are links
    graph: DiGraph<NoteNode, ()>,

    /// Map from normalized path to node index
    path_index: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            path_index: HashMap::new(),
        }
    }

    /// Freeze nodes and their ordered outbound lists.
    ///
    /// Targets that name no other node, self-links and repeats are dropped
    /// from `link_order` before edges are added.
    pub(crate) fn from_nodes(mut nodes: Vec<NoteNode>) -> Self {
        nodes.sort_by(|a, b| a.path.cmp(&b.path));

        let known: HashSet<String> = nodes.iter().map(|n| n.path.clone()).collect();
        for node in &mut nodes {
            let mut seen = HashSet::new();
            let own = node.path.clone();
            node.link_order
                .retain(|t| *t != own && known.contains(t) && seen.insert(t.clone()));
        }

        let mut graph = DiGraph::with_capacity(nodes.len(), 0);
        let mut path_index = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let path = node.path.clone();
            let idx = graph.add_node(node);
            path_index.insert(path, idx);
        }

        let edges: Vec<(NodeIndex, NodeIndex)> = graph
            .node_indices()
            .flat_map(|src| {
                graph[src]
                    .link_order
                    .iter()
                    .filter_map(|target| path_index.get(target).copied())
                    .map(move |dst| (src, dst))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (src, dst) in edges {
            graph.add_edge(src, dst, ());
        }

        Self { graph, path_index }
    }

    /// Look up a node by normalized path
    pub fn index_of(&self, path: &str) -> Option<NodeIndex> {
        self.path_index.get(path).copied()
    }

    /// Node payload
    pub fn node(&self, idx: NodeIndex) -> &NoteNode {
        &self.graph[idx]
    }

    /// Node path
    pub fn path(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].path
    }

    /// All node indices in path order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// All paths in sorted order
    pub fn all_paths(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].path.clone())
            .collect()
    }

    /// Every directed edge as (source, target)
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }

    pub fn has_edge(&self, src: NodeIndex, dst: NodeIndex) -> bool {
        self.graph.contains_edge(src, dst)
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Incoming).count()
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    /// Link targets of `idx`, sorted by path
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<_> = self.graph.neighbors_directed(idx, Outgoing).collect();
        out.sort_unstable();
        out
    }

    /// Notes linking to `idx`, sorted by path
    pub fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<_> = self.graph.neighbors_directed(idx, Incoming).collect();
        out.sort_unstable();
        out
    }

    /// Neighbors in either direction, deduplicated and sorted by path
    pub fn undirected_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<_> = self.graph.neighbors_undirected(idx).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Outbound targets in the order the note first linked them
    pub fn display_neighbors(&self, idx: NodeIndex) -> &[String] {
        &self.graph[idx].link_order
    }

    /// Notes with no incoming or outgoing links, sorted
    pub fn orphaned_notes(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&idx| self.in_degree(idx) == 0 && self.out_degree(idx) == 0)
            .map(|idx| self.graph[idx].path.clone())
            .collect()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Underlying petgraph graph
    pub fn inner(&self) -> &DiGraph<NoteNode, ()> {
        &self.graph
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Node and edge totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}
