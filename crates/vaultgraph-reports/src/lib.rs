//! # VaultGraph Reports
//!
//! Read-only views over a [`GraphAnalysis`](vaultgraph_graph::GraphAnalysis).
//! Every report selects, sorts and truncates fields already present in the
//! analysis; none of them recompute anything.
//!
//! | Report | Contents |
//! |--------|----------|
//! | [`DegreesReport`] | totals and top notes by authority, hub, inbound, outbound |
//! | [`CommunitiesReport`] | every community with anchor, density, recency, tags, bridges |
//! | [`CommunityDetailReport`] | one community by id or member path |
//! | [`ClustersReport`] | mutual-link clusters |
//! | [`OrphansReport`] | unlinked notes |
//! | [`NoteContextReport`] | graph standing and neighborhood of chosen notes |
//! | [`VaultContextReport`] | vault-wide summary |
//!
//! All implement [`Report`] and render as JSON or text.
//!
//! ```
//! use vaultgraph_graph::prelude::*;
//! use vaultgraph_reports::{OrphansReport, OutputFormat, Report};
//!
//! let options = AnalysisOptions::builder().min_degree(0).build().unwrap();
//! let analysis = GraphAnalyzer::new(options)
//!     .analyze_entries(vec![NoteEntry::new("lonely")])
//!     .unwrap();
//! let text = OrphansReport::build(&analysis).render(OutputFormat::Text).unwrap();
//! assert!(text.contains("lonely.md"));
//! ```

pub mod clusters;
pub mod communities;
pub mod context;
pub mod degrees;
pub mod format;
pub mod limits;
pub mod orphans;

pub use clusters::ClustersReport;
pub use communities::{
    CommunitiesReport, CommunityDetailReport, DetailOptions, resolve_community,
};
pub use context::{
    DEFAULT_BACKLINKS_LIMIT, NoteContextOptions, NoteContextReport, VaultContextOptions,
    VaultContextReport,
};
pub use degrees::DegreesReport;
pub use format::{OutputFormat, Report, render_timings};
pub use limits::ReportLimits;
pub use orphans::OrphansReport;
