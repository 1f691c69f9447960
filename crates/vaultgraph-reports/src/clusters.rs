//! Mutual-link clusters: strong components with more than one member

use crate::format::Report;
use crate::limits::ReportLimits;
use serde::Serialize;
use vaultgraph_graph::GraphAnalysis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub size: usize,
    pub members: Vec<String>,
}

/// Largest clusters first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClustersReport {
    pub total: usize,
    pub clusters: Vec<Cluster>,
    pub more: usize,
}

impl ClustersReport {
    pub fn build(analysis: &GraphAnalysis, limits: &ReportLimits) -> Self {
        let all = analysis.clusters();
        Self {
            total: all.len(),
            clusters: limits
                .slice(&all)
                .iter()
                .map(|members| Cluster {
                    size: members.len(),
                    members: members.to_vec(),
                })
                .collect(),
            more: limits.hidden(all.len()),
        }
    }
}

impl Report for ClustersReport {
    fn render_text(&self) -> String {
        let mut out = String::from("Mutual-link clusters\n");
        if self.clusters.is_empty() {
            out.push_str("  (none)\n");
            return out;
        }
        if self.more > 0 {
            out.push_str(&format!(
                "Showing top {} of {} clusters:\n",
                self.clusters.len(),
                self.total
            ));
        }
        for cluster in &self.clusters {
            out.push_str(&format!("  size {}: {}\n", cluster.size, cluster.members.join(", ")));
        }
        if self.more > 0 {
            out.push_str(&format!("  ... ({} more)\n", self.more));
        }
        out
    }
}
