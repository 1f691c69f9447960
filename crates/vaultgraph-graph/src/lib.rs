//! # VaultGraph Graph
//!
//! The analytics engine: turns a snapshot of parsed notes into a scored,
//! clustered, annotated link graph.
//!
//! Provides:
//! - Graph construction with include/exclude patterns, anchor/embed
//!   filtering, mutual-only edges and single-pass min-degree pruning
//! - HITS hub and authority scores
//! - Weak and strong components
//! - Label-propagation communities with anchors, density, tags,
//!   authority distribution, recency and bridges
//! - Recency propagation across links
//! - Orphans, totals and phase timings
//!
//! ## Quick Start
//!
//! ```
//! use vaultgraph_graph::prelude::*;
//!
//! let options = AnalysisOptions::builder().min_degree(0).build().unwrap();
//! let notes = vec![
//!     NoteEntry::new("index").with_links(["alpha", "beta"]),
//!     NoteEntry::new("alpha").with_links(["index"]),
//!     NoteEntry::new("beta"),
//! ];
//!
//! let analysis = GraphAnalyzer::new(options).analyze_entries(notes).unwrap();
//! assert_eq!(analysis.stats.node_count, 3);
//! assert_eq!(analysis.clusters().len(), 1);
//! ```
//!
//! ## Determinism
//!
//! Nodes are stored in path order and every tie is broken by path, so the
//! same snapshot and options always produce the same result regardless of
//! input order. HITS sums run in parallel but add terms in a fixed order.
//!
//! ## Modules
//!
//! - [`builder`] - Snapshot to [`LinkGraph`]
//! - [`graph`] - Frozen petgraph-backed graph
//! - [`hits`] - Hub/authority scoring
//! - [`components`] - Weak and strong components
//! - [`community`] - Label propagation and community summaries
//! - [`recency`] - Effective times and community activity
//! - [`analysis`] - The [`GraphAnalyzer`] façade and its result

pub mod analysis;
pub mod builder;
pub mod community;
pub mod components;
pub mod graph;
pub mod hits;
pub mod recency;

pub use analysis::{
    AnalysisPhase, GraphAnalysis, GraphAnalyzer, GraphNode, GraphTimings, GraphTimingsMillis,
};
pub use builder::{BuildSummary, GraphBuilder};
pub use community::{
    AuthorityBucket, AuthorityScore, AuthorityStats, CommunitySummary, LabelAssignment, TagCount,
};
pub use components::Component;
pub use graph::{GraphStats, LinkGraph};
pub use hits::{HitsScores, HitsTopology, compute_hits, hits_step};
pub use recency::CommunityRecency;

pub mod prelude {
    pub use crate::analysis::{GraphAnalysis, GraphAnalyzer, GraphNode, GraphTimings};
    pub use crate::community::CommunitySummary;
    pub use crate::graph::{GraphStats, LinkGraph};
    pub use crate::recency::CommunityRecency;
    pub use vaultgraph_core::prelude::*;
}
