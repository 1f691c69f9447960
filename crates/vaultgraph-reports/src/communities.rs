//! Community listing and single-community detail

use crate::degrees::desc_f64;
use crate::format::{Report, tag_suffix};
use crate::limits::ReportLimits;
use serde::Serialize;
use std::path::Path;
use vaultgraph_core::prelude::*;
use vaultgraph_graph::community::{AuthorityStats, TagCount};
use vaultgraph_graph::{CommunityRecency, CommunitySummary, GraphAnalysis, GraphTimingsMillis};

/// A community member with its scores and degrees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberEntry {
    pub path: String,
    pub authority: f64,
    pub hub: f64,
    pub inbound: usize,
    pub outbound: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<Vec<String>>,
}

/// One row of the community listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityEntry {
    pub id: String,
    pub size: usize,
    pub fraction_of_vault: f64,
    pub anchor: String,
    pub density: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<CommunityRecency>,
    pub top_tags: Vec<TagCount>,
    /// Whether tags were cut by the limit
    pub more_tags: bool,
    pub top_authority: Vec<MemberEntry>,
    pub more_authority: usize,
    pub bridges: Vec<String>,
}

/// All communities, freshest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunitiesReport {
    pub total: usize,
    pub communities: Vec<CommunityEntry>,
    pub more: usize,
}

impl CommunitiesReport {
    pub fn build(analysis: &GraphAnalysis, limits: &ReportLimits) -> Self {
        let communities = limits
            .slice(&analysis.communities)
            .iter()
            .map(|community| {
                let tags = limits.slice(&community.top_tags);
                let top = limits.slice(&community.top_authority);
                CommunityEntry {
                    id: community.id.clone(),
                    size: community.size(),
                    fraction_of_vault: analysis.fraction_of_vault(community),
                    anchor: community.anchor.clone(),
                    density: community.density,
                    recency: community.recency.clone(),
                    top_tags: tags.to_vec(),
                    more_tags: tags.len() < community.top_tags.len(),
                    top_authority: top
                        .iter()
                        .map(|score| member_entry(analysis, &score.path, true, false))
                        .collect(),
                    more_authority: community.top_authority.len() - top.len(),
                    bridges: limits.slice(&community.bridges).to_vec(),
                }
            })
            .collect();

        Self {
            total: analysis.communities.len(),
            communities,
            more: limits.hidden(analysis.communities.len()),
        }
    }
}

impl Report for CommunitiesReport {
    fn render_text(&self) -> String {
        let mut out = String::from("Communities\n");
        if self.communities.is_empty() {
            out.push_str("  (none)\n");
            return out;
        }
        if self.more > 0 {
            out.push_str(&format!(
                "Showing top {} of {} communities:\n",
                self.communities.len(),
                self.total
            ));
        }

        for (i, c) in self.communities.iter().enumerate() {
            if i > 0 {
                out.push_str("----------------------------------------\n");
            }
            out.push_str(&format!("\n  community {} (size {})\n", c.id, c.size));
            if !c.anchor.is_empty() {
                out.push_str(&format!("    anchor: {}\n", c.anchor));
            }
            if c.density > 0.0 {
                out.push_str(&format!("    density: {:.3}\n", c.density));
            }
            if let Some(recency) = &c.recency {
                out.push_str(&format!("    recency: {}\n", recency_line(recency)));
            }
            if !c.top_tags.is_empty() {
                let mut tags: Vec<String> = c.top_tags.iter().map(tag_count).collect();
                if c.more_tags {
                    tags.push("...".to_string());
                }
                out.push_str(&format!("    tags: {}\n", tags.join(", ")));
            }
            if !c.top_authority.is_empty() {
                out.push_str("    top notes (by authority):\n");
                for (j, m) in c.top_authority.iter().enumerate() {
                    out.push_str(&format!("      {}) {}\n", j + 1, member_line(m)));
                }
                if c.more_authority > 0 {
                    out.push_str(&format!("      ... ({} more)\n", c.more_authority));
                }
            }
            if !c.bridges.is_empty() {
                out.push_str(&format!("    bridges: {}\n", c.bridges.join(", ")));
            }
        }
        out
    }
}

/// What to show per member in [`CommunityDetailReport`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailOptions {
    pub include_tags: bool,
    pub include_neighbors: bool,
}

/// Everything known about one community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityDetailReport {
    pub id: String,
    pub size: usize,
    pub fraction_of_vault: f64,
    pub anchor: String,
    pub density: f64,
    pub internal_edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<CommunityRecency>,
    pub top_tags: Vec<TagCount>,
    pub bridges: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority_stats: Option<AuthorityStats>,
    /// Members by authority descending, ties by path
    pub members: Vec<MemberEntry>,
    pub more: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<GraphTimingsMillis>,
}

impl CommunityDetailReport {
    /// Detail for the community named by `query`, an id or a note path.
    ///
    /// Absolute note paths under `vault_root` are made vault-relative.
    pub fn build(
        analysis: &GraphAnalysis,
        query: &str,
        vault_root: Option<&Path>,
        limits: &ReportLimits,
        options: DetailOptions,
    ) -> Result<Self> {
        let community = resolve_community(analysis, query, vault_root)?;

        let mut members: Vec<MemberEntry> = community
            .members
            .iter()
            .map(|path| {
                member_entry(analysis, path, options.include_tags, options.include_neighbors)
            })
            .collect();
        members.sort_by(|a, b| desc_f64(a.authority, b.authority).then_with(|| a.path.cmp(&b.path)));
        let more = limits.hidden(members.len());
        members.truncate(limits.take(members.len()));

        Ok(Self {
            id: community.id.clone(),
            size: community.size(),
            fraction_of_vault: analysis.fraction_of_vault(community),
            anchor: community.anchor.clone(),
            density: community.density,
            internal_edges: analysis.internal_edges(community),
            recency: community.recency.clone(),
            top_tags: community.top_tags.clone(),
            bridges: community.bridges.clone(),
            authority_stats: community.authority_stats,
            members,
            more,
            timings: None,
        })
    }

    /// Attach phase timings
    pub fn with_timings(mut self, timings: GraphTimingsMillis) -> Self {
        self.timings = Some(timings);
        self
    }
}

impl Report for CommunityDetailReport {
    fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Community {} (size {})\n", self.id, self.size));
        if !self.anchor.is_empty() {
            out.push_str(&format!("  anchor: {}\n", self.anchor));
        }
        if self.density > 0.0 {
            out.push_str(&format!("  density: {:.3}\n", self.density));
        }
        out.push_str(&format!("  edges (internal): {}\n", self.internal_edges));
        if let Some(recency) = &self.recency {
            out.push_str(&format!("  recency: {}\n", recency_line(recency)));
        }
        if !self.top_tags.is_empty() {
            let tags: Vec<String> = self.top_tags.iter().map(tag_count).collect();
            out.push_str(&format!("  tags: {}\n", tags.join(", ")));
        }
        if !self.bridges.is_empty() {
            out.push_str(&format!("  bridges: {}\n", self.bridges.join(", ")));
        }

        out.push_str("\nMembers (sorted by authority):\n");
        for (i, m) in self.members.iter().enumerate() {
            out.push_str(&format!("  {}) {}\n", i + 1, member_line(m)));
            if let Some(neighbors) = &m.neighbors {
                out.push_str(&format!("      neighbors: {}\n", neighbors.join(", ")));
            }
        }
        if self.more > 0 {
            out.push_str(&format!("  ... ({} more)\n", self.more));
        }
        if let Some(timings) = &self.timings {
            out.push('\n');
            out.push_str(&crate::format::render_timings(timings));
        }
        out
    }
}

/// Find a community by id, else by a member note path.
///
/// Fails with [`Error::CommunityNotFound`] when the query is neither a
/// community id nor a note in the graph, and with [`Error::NotAssigned`]
/// when the note is in the graph without a reported community.
pub fn resolve_community<'a>(
    analysis: &'a GraphAnalysis,
    query: &str,
    vault_root: Option<&Path>,
) -> Result<&'a CommunitySummary> {
    if let Some(community) = analysis.community(query) {
        return Ok(community);
    }

    let path = vault_relative(query, vault_root);
    if analysis.node(&path).is_none() {
        return Err(Error::community_not_found(query));
    }
    analysis
        .community_for_note(&path)
        .ok_or_else(|| Error::not_assigned(query))
}

/// Normalize a user-supplied note path, stripping `vault_root` from absolute paths
pub fn vault_relative(query: &str, vault_root: Option<&Path>) -> String {
    let as_path = Path::new(query);
    if as_path.is_absolute()
        && let Some(root) = vault_root
        && let Ok(rel) = as_path.strip_prefix(root)
    {
        return normalize_note_path(&rel.to_string_lossy());
    }
    normalize_note_path(query)
}

fn member_entry(
    analysis: &GraphAnalysis,
    path: &str,
    include_tags: bool,
    include_neighbors: bool,
) -> MemberEntry {
    let node = analysis.node(path);
    MemberEntry {
        path: path.to_string(),
        authority: node.map_or(0.0, |n| n.authority),
        hub: node.map_or(0.0, |n| n.hub),
        inbound: node.map_or(0, |n| n.inbound),
        outbound: node.map_or(0, |n| n.outbound),
        tags: match node {
            Some(n) if include_tags => n.tags.clone(),
            _ => Vec::new(),
        },
        neighbors: node
            .filter(|_| include_neighbors)
            .map(|n| n.neighbors.clone()),
    }
}

fn member_line(m: &MemberEntry) -> String {
    format!(
        "{} auth={:.4} hub={:.4} in={} out={}{}",
        m.path,
        m.authority,
        m.hub,
        m.inbound,
        m.outbound,
        tag_suffix(&m.tags)
    )
}

fn tag_count(t: &TagCount) -> String {
    format!("{}({})", t.tag, t.count)
}

pub(crate) fn recency_line(r: &CommunityRecency) -> String {
    format!(
        "{:.1} days ago ({} in last {}d, latest {})",
        r.latest_age_days, r.recent_count, r.window_days, r.latest_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_relative() {
        assert_eq!(vault_relative("notes/a", None), "notes/a.md");
        assert_eq!(
            vault_relative("/vault/notes/a.md", Some(Path::new("/vault"))),
            "notes/a.md"
        );
        // absolute path outside the vault is normalized as given
        assert_eq!(
            vault_relative("/elsewhere/a", Some(Path::new("/vault"))),
            "elsewhere/a.md"
        );
    }
}
