//! Notes with neither inbound nor outbound links

use crate::format::Report;
use serde::Serialize;
use vaultgraph_graph::GraphAnalysis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphansReport {
    pub count: usize,
    /// Sorted by path
    pub orphans: Vec<String>,
}

impl OrphansReport {
    pub fn build(analysis: &GraphAnalysis) -> Self {
        let mut orphans = analysis.orphans.clone();
        orphans.sort();
        Self {
            count: orphans.len(),
            orphans,
        }
    }
}

impl Report for OrphansReport {
    fn render_text(&self) -> String {
        let mut out = String::from("Orphans (no inbound or outbound wikilinks):\n");
        if self.orphans.is_empty() {
            out.push_str("  (none)\n");
        }
        for path in &self.orphans {
            out.push_str(&format!("  {}\n", path));
        }
        out
    }
}
