//! # VaultGraph
//!
//! Link graph analytics for markdown vaults. This crate ties the loader,
//! the analysis engine and the reports together behind layered
//! [`Settings`] and ships the `vaultgraph` command-line tool.
//!
//! ```no_run
//! use vaultgraph::{DegreesReport, OutputFormat, Report, ReportLimits, Settings, analyze_vault};
//!
//! let settings = Settings {
//!     vault: Some("~/notes".into()),
//!     ..Settings::default()
//! };
//! let run = analyze_vault(&settings, true).unwrap();
//! let report = DegreesReport::build(&run.analysis, &ReportLimits::new(settings.limit));
//! println!("{}", report.render(OutputFormat::Text).unwrap());
//! ```

pub mod settings;

pub use settings::Settings;
pub use vaultgraph_core::prelude::*;
pub use vaultgraph_graph::{GraphAnalysis, GraphAnalyzer, GraphTimingsMillis};
pub use vaultgraph_reports::*;
pub use vaultgraph_vault::VaultScanner;

use std::path::PathBuf;

/// One analysis of one vault
#[derive(Debug)]
pub struct VaultRun {
    /// Expanded vault root
    pub root: PathBuf,
    pub analysis: GraphAnalysis,
}

/// Load the vault named by `settings` and analyze it
pub fn analyze_vault(settings: &Settings, include_tags: bool) -> Result<VaultRun> {
    let root = settings.vault_path()?;
    let options = settings.analysis_options(include_tags)?;
    let scanner = settings.scanner(&root);
    let analysis = GraphAnalyzer::new(options).analyze(&scanner)?;
    log::debug!(
        "Analyzed {}: {} nodes, {} communities",
        root.display(),
        analysis.stats.node_count,
        analysis.communities.len()
    );
    Ok(VaultRun { root, analysis })
}
