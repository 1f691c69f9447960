//! Analysis façade: runs every phase over one snapshot and returns an
//! immutable [`GraphAnalysis`].

use crate::builder::GraphBuilder;
use crate::community::{CommunitySummary, SummaryInputs, propagate_labels, summarize_communities};
use crate::components::{Component, assign_ids, strong_components, weak_components};
use crate::graph::GraphStats;
use crate::hits::compute_hits;
use crate::recency::effective_times;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};
use vaultgraph_core::prelude::*;

/// Phases of one analysis run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisPhase {
    Idle,
    Loaded,
    Built,
    Scored,
    Partitioned,
    Detected,
    Done,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisPhase::Idle => "idle",
            AnalysisPhase::Loaded => "loaded",
            AnalysisPhase::Built => "built",
            AnalysisPhase::Scored => "scored",
            AnalysisPhase::Partitioned => "partitioned",
            AnalysisPhase::Detected => "detected",
            AnalysisPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-note analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub path: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Outbound targets, deduplicated, first-seen order
    pub neighbors: Vec<String>,
    pub inbound: usize,
    pub outbound: usize,
    /// How well the note points at good authorities
    pub hub: f64,
    /// How strongly good hubs point at the note
    pub authority: f64,
    /// None when the note's singleton community was not reported
    pub community: Option<String>,
    pub strong_component: String,
    pub weak_component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<serde_json::Value>,
    /// Notes anywhere in the snapshot linking here, sorted by referrer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backlinks: Vec<Backlink>,
}

/// Wall-clock time per phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphTimings {
    pub load: Duration,
    pub build: Duration,
    pub hits: Duration,
    pub label_propagation: Duration,
    pub recency: Duration,
    pub total: Duration,
}

/// Timings in whole milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphTimingsMillis {
    pub load_ms: u64,
    pub build_ms: u64,
    pub hits_ms: u64,
    pub label_propagation_ms: u64,
    pub recency_ms: u64,
    pub total_ms: u64,
}

impl GraphTimings {
    /// Convert to milliseconds; any non-zero duration reports at least 1 ms
    pub fn to_millis(&self) -> GraphTimingsMillis {
        fn ms(d: Duration) -> u64 {
            if d.is_zero() {
                0
            } else {
                (d.as_millis() as u64).max(1)
            }
        }
        GraphTimingsMillis {
            load_ms: ms(self.load),
            build_ms: ms(self.build),
            hits_ms: ms(self.hits),
            label_propagation_ms: ms(self.label_propagation),
            recency_ms: ms(self.recency),
            total_ms: ms(self.total),
        }
    }
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub nodes: BTreeMap<String, GraphNode>,
    pub communities: Vec<CommunitySummary>,
    /// Full partition, including singletons
    pub strong_components: Vec<Component>,
    pub weak_components: Vec<Component>,
    pub orphans: Vec<String>,
    pub stats: GraphStats,
    /// Effective recency time per note (notes without any time are absent)
    pub effective_times: BTreeMap<String, DateTime<Utc>>,
    /// "Now" used for all ages in this result
    pub reference_time: DateTime<Utc>,
    #[serde(skip)]
    pub timings: GraphTimings,
}

impl GraphAnalysis {
    pub fn node(&self, path: &str) -> Option<&GraphNode> {
        self.nodes.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Community by id
    pub fn community(&self, id: &str) -> Option<&CommunitySummary> {
        self.communities.iter().find(|c| c.id == id)
    }

    /// Community containing `path`
    pub fn community_for_note(&self, path: &str) -> Option<&CommunitySummary> {
        let id = self.nodes.get(path)?.community.as_deref()?;
        self.community(id)
    }

    /// Map from note path to its community
    pub fn membership_lookup(&self) -> HashMap<&str, &CommunitySummary> {
        let mut lookup = HashMap::new();
        for community in &self.communities {
            for member in &community.members {
                lookup.insert(member.as_str(), community);
            }
        }
        lookup
    }

    /// Directed edges with both endpoints in `community`
    pub fn internal_edges(&self, community: &CommunitySummary) -> usize {
        let members: HashSet<&str> = community.members.iter().map(String::as_str).collect();
        community
            .members
            .iter()
            .filter_map(|m| self.nodes.get(m))
            .map(|node| {
                node.neighbors
                    .iter()
                    .filter(|n| members.contains(n.as_str()))
                    .count()
            })
            .sum()
    }

    /// Strong components with more than one member
    pub fn clusters(&self) -> Vec<&Component> {
        self.strong_components
            .iter()
            .filter(|c| c.len() > 1)
            .collect()
    }

    /// Typed backlinks of `path`; empty when the note is not in the graph
    pub fn backlinks(&self, path: &str) -> &[Backlink] {
        self.nodes
            .get(path)
            .map(|node| node.backlinks.as_slice())
            .unwrap_or_default()
    }

    /// Notes linking to `path`, sorted
    pub fn reverse_neighbors(&self, path: &str) -> Vec<String> {
        self.nodes
            .values()
            .filter(|node| node.neighbors.iter().any(|n| n == path))
            .map(|node| node.path.clone())
            .collect()
    }

    /// Edges crossing from one community into another, as (source, target)
    pub fn cross_community_edges(&self) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        for node in self.nodes.values() {
            for target in &node.neighbors {
                let other = self.nodes.get(target).and_then(|t| t.community.as_ref());
                if node.community.as_ref() != other {
                    edges.push((node.path.clone(), target.clone()));
                }
            }
        }
        edges
    }

    /// Share of all surviving notes that `community` holds
    pub fn fraction_of_vault(&self, community: &CommunitySummary) -> f64 {
        if self.nodes.is_empty() {
            0.0
        } else {
            community.size() as f64 / self.nodes.len() as f64
        }
    }
}

/// Runs the analysis pipeline under one immutable set of options
#[derive(Debug, Clone, Default)]
pub struct GraphAnalyzer {
    options: AnalysisOptions,
}

impl GraphAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Load from `source`, then analyze
    pub fn analyze(&self, source: &dyn NoteSource) -> Result<GraphAnalysis> {
        let started = Instant::now();
        enter(AnalysisPhase::Idle);
        let notes = source.load_notes()?;
        let load = started.elapsed();
        self.run(notes, load, started)
    }

    /// Analyze an already loaded snapshot
    pub fn analyze_entries(&self, notes: Vec<NoteEntry>) -> Result<GraphAnalysis> {
        self.run(notes, Duration::ZERO, Instant::now())
    }

    fn run(&self, notes: Vec<NoteEntry>, load: Duration, started: Instant) -> Result<GraphAnalysis> {
        let options = &self.options;
        options.validate()?;
        let now = options.now();
        let mut timings = GraphTimings {
            load,
            ..Default::default()
        };
        enter(AnalysisPhase::Loaded);

        let phase = Instant::now();
        let builder = GraphBuilder::new(options)?;
        let graph = builder.build(&notes);
        let mut backlinks = builder.backlinks(&notes);
        timings.build = phase.elapsed();
        enter(AnalysisPhase::Built);

        let phase = Instant::now();
        let hits = compute_hits(&graph, &options.hits);
        timings.hits = phase.elapsed();
        enter(AnalysisPhase::Scored);

        let strong = strong_components(&graph);
        let weak = weak_components(&graph);
        let strong_ids = assign_ids(&strong, "scc");
        let weak_ids = assign_ids(&weak, "comp");
        enter(AnalysisPhase::Partitioned);

        let phase = Instant::now();
        let labels = propagate_labels(&graph, options.max_label_rounds);
        timings.label_propagation = phase.elapsed();

        let phase = Instant::now();
        let times = effective_times(&graph, &options.recency, options.recency_cascade, now);
        timings.recency = phase.elapsed();

        let communities = summarize_communities(&SummaryInputs {
            graph: &graph,
            labels: &labels,
            hits: &hits,
            times: &times,
            options,
            now,
        });
        enter(AnalysisPhase::Detected);

        let mut membership: HashMap<&str, &str> = HashMap::new();
        for community in &communities {
            for member in &community.members {
                membership.insert(member.as_str(), community.id.as_str());
            }
        }

        let mut nodes = BTreeMap::new();
        let mut effective = BTreeMap::new();
        for idx in graph.node_indices() {
            let note = graph.node(idx);
            let path = note.path.clone();
            if let Some(ts) = times[idx.index()] {
                effective.insert(path.clone(), ts);
            }
            let node = GraphNode {
                title: note.title.clone(),
                tags: if options.include_tags {
                    note.tags.clone()
                } else {
                    Vec::new()
                },
                neighbors: graph.display_neighbors(idx).to_vec(),
                inbound: graph.in_degree(idx),
                outbound: graph.out_degree(idx),
                hub: hits.hub[idx.index()],
                authority: hits.authority[idx.index()],
                community: membership.get(path.as_str()).map(|id| id.to_string()),
                strong_component: strong_ids.get(&path).cloned().unwrap_or_default(),
                weak_component: weak_ids.get(&path).cloned().unwrap_or_default(),
                modified: note.modified,
                frontmatter: note.frontmatter.clone(),
                backlinks: backlinks.remove(&path).unwrap_or_default(),
                path: path.clone(),
            };
            nodes.insert(path, node);
        }

        timings.total = started.elapsed();
        let analysis = GraphAnalysis {
            nodes,
            orphans: graph.orphaned_notes(),
            stats: graph.stats(),
            communities,
            strong_components: strong,
            weak_components: weak,
            effective_times: effective,
            reference_time: now,
            timings,
        };
        enter(AnalysisPhase::Done);

        info!(
            "Analyzed {} notes: {} edges, {} communities, {} orphans ({} ms)",
            analysis.stats.node_count,
            analysis.stats.edge_count,
            analysis.communities.len(),
            analysis.orphans.len(),
            timings.to_millis().total_ms
        );
        Ok(analysis)
    }
}

fn enter(phase: AnalysisPhase) {
    debug!("analysis phase: {}", phase);
}
