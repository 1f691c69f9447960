//! Context reports for feeding a note or a whole vault to other tools.
//!
//! [`NoteContextReport`] describes individual notes: graph standing,
//! community, neighborhood and typed backlinks. [`VaultContextReport`] summarizes the vault.

use crate::communities::{recency_line, vault_relative};
use crate::format::{Report, render_timings};
use crate::limits::ReportLimits;
use serde::Serialize;
use std::path::Path;
use vaultgraph_core::{Backlink, Error};
use vaultgraph_graph::community::{AuthorityScore, AuthorityStats, TagCount};
use vaultgraph_graph::{CommunityRecency, GraphAnalysis, GraphStats, GraphTimingsMillis};

/// Default per-direction neighbor cap in note contexts
pub const DEFAULT_NEIGHBOR_LIMIT: usize = 50;

/// Default backlink cap in note contexts
pub const DEFAULT_BACKLINKS_LIMIT: usize = 50;

/// Sections included per note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteContextOptions {
    pub include_tags: bool,
    pub include_neighbors: bool,
    pub include_frontmatter: bool,
    /// Links per direction; 0 means all
    pub neighbor_limit: usize,
    pub include_backlinks: bool,
    /// 0 means all
    pub backlinks_limit: usize,
}

impl Default for NoteContextOptions {
    fn default() -> Self {
        Self {
            include_tags: true,
            include_neighbors: true,
            include_frontmatter: false,
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
            include_backlinks: true,
            backlinks_limit: DEFAULT_BACKLINKS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteGraphStats {
    pub inbound: usize,
    pub outbound: usize,
    pub hub: f64,
    pub authority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteCommunity {
    pub id: String,
    pub size: usize,
    pub fraction_of_vault: f64,
    pub anchor: String,
    pub density: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<CommunityRecency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_tags: Vec<TagCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteNeighbors {
    pub links_out: Vec<String>,
    pub links_in: Vec<String>,
}

/// Context for one requested note, or the reason it has none
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteContext {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<NoteGraphStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<NoteCommunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<NoteNeighbors>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub backlinks: Vec<Backlink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteContextReport {
    pub contexts: Vec<NoteContext>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<GraphTimingsMillis>,
}

impl NoteContextReport {
    /// One context per requested note, in request order
    pub fn build<S: AsRef<str>>(
        analysis: &GraphAnalysis,
        files: &[S],
        vault_root: Option<&Path>,
        options: &NoteContextOptions,
    ) -> Self {
        let contexts: Vec<NoteContext> = files
            .iter()
            .map(|f| note_context(analysis, &vault_relative(f.as_ref(), vault_root), options))
            .collect();
        Self {
            count: contexts.len(),
            contexts,
            timings: None,
        }
    }

    pub fn with_timings(mut self, timings: GraphTimingsMillis) -> Self {
        self.timings = Some(timings);
        self
    }
}

fn note_context(analysis: &GraphAnalysis, path: &str, options: &NoteContextOptions) -> NoteContext {
    let mut ctx = NoteContext {
        path: path.to_string(),
        title: None,
        error: None,
        frontmatter: None,
        tags: Vec::new(),
        graph: None,
        community: None,
        neighbors: None,
        backlinks: Vec::new(),
    };

    let Some(node) = analysis.node(path) else {
        ctx.error = Some(Error::note_not_in_graph(path).to_string());
        return ctx;
    };

    ctx.title = Some(node.title.clone());
    if options.include_tags {
        ctx.tags = node.tags.clone();
    }
    if options.include_frontmatter {
        ctx.frontmatter = Some(
            node.frontmatter
                .clone()
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        );
    }
    ctx.graph = Some(NoteGraphStats {
        inbound: node.inbound,
        outbound: node.outbound,
        hub: node.hub,
        authority: node.authority,
    });
    ctx.community = analysis.community_for_note(path).map(|c| NoteCommunity {
        id: c.id.clone(),
        size: c.size(),
        fraction_of_vault: analysis.fraction_of_vault(c),
        anchor: c.anchor.clone(),
        density: c.density,
        recency: c.recency.clone(),
        top_tags: if options.include_tags {
            c.top_tags.clone()
        } else {
            Vec::new()
        },
    });
    if options.include_neighbors {
        let limits = ReportLimits::new(options.neighbor_limit);
        let links_in = analysis.reverse_neighbors(path);
        ctx.neighbors = Some(NoteNeighbors {
            links_out: limits.slice(&node.neighbors).to_vec(),
            links_in: limits.slice(&links_in).to_vec(),
        });
    }
    if options.include_backlinks {
        ctx.backlinks = ReportLimits::new(options.backlinks_limit)
            .slice(analysis.backlinks(path))
            .to_vec();
    }
    ctx
}

impl Report for NoteContextReport {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for (i, ctx) in self.contexts.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("{}\n", ctx.path));
            if let Some(error) = &ctx.error {
                out.push_str(&format!("  error: {}\n", error));
                continue;
            }
            if let Some(title) = &ctx.title {
                out.push_str(&format!("  title: {}\n", title));
            }
            if !ctx.tags.is_empty() {
                out.push_str(&format!("  tags: {}\n", ctx.tags.join(", ")));
            }
            if let Some(fm) = &ctx.frontmatter {
                out.push_str(&format!("  frontmatter: {}\n", fm));
            }
            if let Some(g) = &ctx.graph {
                out.push_str(&format!(
                    "  graph: in={} out={} hub={:.4} auth={:.4}\n",
                    g.inbound, g.outbound, g.hub, g.authority
                ));
            }
            match &ctx.community {
                Some(c) => {
                    out.push_str(&format!(
                        "  community: {} (size {}, {:.1}% of vault)\n",
                        c.id,
                        c.size,
                        c.fraction_of_vault * 100.0
                    ));
                    if !c.anchor.is_empty() {
                        out.push_str(&format!("    anchor: {}\n", c.anchor));
                    }
                    if let Some(recency) = &c.recency {
                        out.push_str(&format!("    recency: {}\n", recency_line(recency)));
                    }
                }
                None => out.push_str("  community: (none)\n"),
            }
            if let Some(n) = &ctx.neighbors {
                out.push_str(&format!("  links out: {}\n", join_or_none(&n.links_out)));
                out.push_str(&format!("  links in: {}\n", join_or_none(&n.links_in)));
            }
            if !ctx.backlinks.is_empty() {
                let backlinks: Vec<String> = ctx
                    .backlinks
                    .iter()
                    .map(|b| format!("{} ({})", b.referrer, b.link_type.as_str()))
                    .collect();
                out.push_str(&format!("  backlinks: {}\n", backlinks.join(", ")));
            }
        }
        if let Some(timings) = &self.timings {
            out.push('\n');
            out.push_str(&render_timings(timings));
        }
        out
    }
}

/// Limits for the vault-wide context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultContextOptions {
    /// Communities to include; 0 means all
    pub max_communities: usize,
    pub top_notes: usize,
    pub top_tags: usize,
}

impl Default for VaultContextOptions {
    fn default() -> Self {
        Self {
            max_communities: 25,
            top_notes: 5,
            top_tags: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultCommunity {
    pub id: String,
    pub size: usize,
    pub fraction_of_vault: f64,
    pub anchor: String,
    pub density: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_tags: Vec<TagCount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_authority: Vec<AuthorityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority_stats: Option<AuthorityStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<CommunityRecency>,
}

/// Vault-wide summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultContextReport {
    pub stats: GraphStats,
    pub orphan_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<String>,
    /// Weak components, largest first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub communities: Vec<VaultCommunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<GraphTimingsMillis>,
}

impl VaultContextReport {
    pub fn build(analysis: &GraphAnalysis, options: &VaultContextOptions) -> Self {
        let communities = ReportLimits::new(options.max_communities)
            .slice(&analysis.communities)
            .iter()
            .map(|c| VaultCommunity {
                id: c.id.clone(),
                size: c.size(),
                fraction_of_vault: analysis.fraction_of_vault(c),
                anchor: c.anchor.clone(),
                density: c.density,
                top_tags: c.top_tags.iter().take(options.top_tags).cloned().collect(),
                top_authority: c
                    .top_authority
                    .iter()
                    .take(options.top_notes)
                    .cloned()
                    .collect(),
                authority_stats: c.authority_stats,
                recency: c.recency.clone(),
            })
            .collect();

        Self {
            stats: analysis.stats,
            orphan_count: analysis.orphans.len(),
            orphans: analysis.orphans.clone(),
            components: analysis.weak_components.clone(),
            communities,
            timings: None,
        }
    }

    pub fn with_timings(mut self, timings: GraphTimingsMillis) -> Self {
        self.timings = Some(timings);
        self
    }
}

impl Report for VaultContextReport {
    fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Nodes: {}  Edges: {}  Orphans: {}  Components: {}  Communities: {}\n",
            self.stats.node_count,
            self.stats.edge_count,
            self.orphan_count,
            self.components.len(),
            self.communities.len()
        ));
        if !self.orphans.is_empty() {
            out.push_str(&format!("\nOrphans:\n  {}\n", self.orphans.join("\n  ")));
        }
        if !self.components.is_empty() {
            out.push_str("\nComponents:\n");
            for component in &self.components {
                out.push_str(&format!("  size {}: {}\n", component.len(), component.join(", ")));
            }
        }
        if !self.communities.is_empty() {
            out.push_str("\nCommunities:\n");
            for c in &self.communities {
                out.push_str(&format!(
                    "  {} (size {}, {:.1}% of vault) anchor: {}\n",
                    c.id,
                    c.size,
                    c.fraction_of_vault * 100.0,
                    c.anchor
                ));
                if let Some(recency) = &c.recency {
                    out.push_str(&format!("    recency: {}\n", recency_line(recency)));
                }
                if !c.top_tags.is_empty() {
                    let tags: Vec<String> =
                        c.top_tags.iter().map(|t| format!("{}({})", t.tag, t.count)).collect();
                    out.push_str(&format!("    tags: {}\n", tags.join(", ")));
                }
                for score in &c.top_authority {
                    out.push_str(&format!("    {} auth={:.4}\n", score.path, score.authority));
                }
            }
        }
        if let Some(timings) = &self.timings {
            out.push('\n');
            out.push_str(&render_timings(timings));
        }
        out
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
