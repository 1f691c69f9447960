//! Degree and ranking report: top notes by authority, hub, inbound and outbound

use crate::format::{Report, tag_suffix};
use crate::limits::ReportLimits;
use serde::Serialize;
use std::cmp::Ordering;
use vaultgraph_graph::{GraphAnalysis, GraphNode};

/// One note in a ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNote {
    pub path: String,
    pub title: String,
    pub authority: f64,
    pub hub: f64,
    pub inbound: usize,
    pub outbound: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<&GraphNode> for RankedNote {
    fn from(node: &GraphNode) -> Self {
        Self {
            path: node.path.clone(),
            title: node.title.clone(),
            authority: node.authority,
            hub: node.hub,
            inbound: node.inbound,
            outbound: node.outbound,
            community: node.community.clone(),
            tags: node.tags.clone(),
        }
    }
}

impl RankedNote {
    fn community_label(&self) -> &str {
        self.community.as_deref().unwrap_or("-")
    }
}

/// Top rows of one ordering plus the count left out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub notes: Vec<RankedNote>,
    pub more: usize,
}

/// Graph totals and four top-N rankings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreesReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub orphan_count: usize,
    pub community_count: usize,
    pub by_authority: Ranking,
    pub by_hub: Ranking,
    pub by_inbound: Ranking,
    pub by_outbound: Ranking,
}

impl DegreesReport {
    pub fn build(analysis: &GraphAnalysis, limits: &ReportLimits) -> Self {
        let nodes: Vec<&GraphNode> = analysis.nodes.values().collect();

        Self {
            node_count: analysis.stats.node_count,
            edge_count: analysis.stats.edge_count,
            orphan_count: analysis.orphans.len(),
            community_count: analysis.communities.len(),
            by_authority: rank(&nodes, limits, |a, b| desc_f64(a.authority, b.authority)),
            by_hub: rank(&nodes, limits, |a, b| desc_f64(a.hub, b.hub)),
            by_inbound: rank(&nodes, limits, |a, b| b.inbound.cmp(&a.inbound)),
            by_outbound: rank(&nodes, limits, |a, b| b.outbound.cmp(&a.outbound)),
        }
    }
}

/// Sort by `order`, ties by path ascending, then truncate
fn rank<F>(nodes: &[&GraphNode], limits: &ReportLimits, order: F) -> Ranking
where
    F: Fn(&GraphNode, &GraphNode) -> Ordering,
{
    let mut sorted = nodes.to_vec();
    sorted.sort_by(|a, b| order(*a, *b).then_with(|| a.path.cmp(&b.path)));
    Ranking {
        notes: limits
            .slice(&sorted)
            .iter()
            .map(|n| RankedNote::from(*n))
            .collect(),
        more: limits.hidden(sorted.len()),
    }
}

pub(crate) fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

impl Report for DegreesReport {
    fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Nodes: {}  Edges: {}  Orphans: {}  Communities: {}\n",
            self.node_count, self.edge_count, self.orphan_count, self.community_count
        ));
        if self.node_count == 0 {
            return out;
        }

        let sections: [(&str, &Ranking, fn(&RankedNote) -> String); 4] = [
            ("by authority (cornerstone concepts)", &self.by_authority, |n| {
                format!(
                    "{} auth={:.4} hub={:.4} in={} out={} community={}{}",
                    n.path,
                    n.authority,
                    n.hub,
                    n.inbound,
                    n.outbound,
                    n.community_label(),
                    tag_suffix(&n.tags)
                )
            }),
            ("by hub (index/MOC notes)", &self.by_hub, |n| {
                format!(
                    "{} hub={:.4} auth={:.4} in={} out={} community={}{}",
                    n.path,
                    n.hub,
                    n.authority,
                    n.inbound,
                    n.outbound,
                    n.community_label(),
                    tag_suffix(&n.tags)
                )
            }),
            ("by inbound links", &self.by_inbound, |n| {
                format!(
                    "{} in={} out={} auth={:.4} hub={:.4} community={}",
                    n.path,
                    n.inbound,
                    n.outbound,
                    n.authority,
                    n.hub,
                    n.community_label()
                )
            }),
            ("by outbound links", &self.by_outbound, |n| {
                format!(
                    "{} out={} in={} auth={:.4} hub={:.4} community={}",
                    n.path,
                    n.outbound,
                    n.inbound,
                    n.authority,
                    n.hub,
                    n.community_label()
                )
            }),
        ];

        for (title, ranking, line) in sections {
            out.push_str(&format!("\nTop {} {}:\n", ranking.notes.len(), title));
            for (i, note) in ranking.notes.iter().enumerate() {
                out.push_str(&format!("  {}) {}\n", i + 1, line(note)));
            }
            if ranking.more > 0 {
                out.push_str(&format!("  ... ({} more)\n", ranking.more));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_f64() {
        assert_eq!(desc_f64(2.0, 1.0), Ordering::Less);
        assert_eq!(desc_f64(1.0, 2.0), Ordering::Greater);
        assert_eq!(desc_f64(f64::NAN, 1.0), Ordering::Equal);
    }
}
