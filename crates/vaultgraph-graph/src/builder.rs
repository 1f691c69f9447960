//! Graph construction: filtering, adjacency, pruning.

use crate::graph::{LinkGraph, NoteNode};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use vaultgraph_core::prelude::*;

/// Counts describing what the builder dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub input_notes: usize,
    pub filtered_out: usize,
    pub duplicate_paths: usize,
    pub non_mutual_edges: usize,
    pub pruned_nodes: usize,
}

/// Turns a note snapshot into a frozen [`LinkGraph`] under one set of options.
pub struct GraphBuilder<'a> {
    options: &'a AnalysisOptions,
    include: PatternSet,
    exclude: PatternSet,
}

impl<'a> GraphBuilder<'a> {
    /// Compile the option patterns
    pub fn new(options: &'a AnalysisOptions) -> Result<Self> {
        let (include, exclude) = options.compile_patterns()?;
        Ok(Self {
            options,
            include,
            exclude,
        })
    }

    /// Whether a note passes the include/exclude filters
    pub fn selects(&self, note: &NoteEntry) -> bool {
        if !self.include.is_empty() && !self.include.matches_note(note) {
            return false;
        }
        !self.exclude.matches_note(note)
    }

    fn skips_link(&self, link: &NoteLink) -> bool {
        (link.has_anchor && self.options.skip_anchors) || (link.is_embed && self.options.skip_embeds)
    }

    /// Typed backlinks per target across the whole snapshot, referrers sorted.
    ///
    /// Include/exclude filters do not apply; link skipping does. A referrer
    /// counts once, with the form of its first link to the target.
    pub fn backlinks(&self, notes: &[NoteEntry]) -> HashMap<String, Vec<Backlink>> {
        let mut by_target: HashMap<&str, BTreeMap<&str, LinkKind>> = HashMap::new();
        for note in notes {
            for link in &note.links {
                if self.skips_link(link) || link.target == note.path {
                    continue;
                }
                by_target
                    .entry(link.target.as_str())
                    .or_default()
                    .entry(note.path.as_str())
                    .or_insert(link.kind);
            }
        }
        by_target
            .into_iter()
            .map(|(target, referrers)| {
                let backlinks = referrers
                    .into_iter()
                    .map(|(referrer, link_type)| Backlink {
                        referrer: referrer.to_string(),
                        link_type,
                    })
                    .collect();
                (target.to_string(), backlinks)
            })
            .collect()
    }

    /// Build the graph
    pub fn build(&self, notes: &[NoteEntry]) -> LinkGraph {
        self.build_with_summary(notes).0
    }

    /// Build the graph and report what was dropped
    pub fn build_with_summary(&self, notes: &[NoteEntry]) -> (LinkGraph, BuildSummary) {
        let mut summary = BuildSummary {
            input_notes: notes.len(),
            ..Default::default()
        };

        // 1. include/exclude
        let mut kept: Vec<&NoteEntry> = Vec::with_capacity(notes.len());
        let mut seen_paths = HashSet::with_capacity(notes.len());
        for note in notes {
            if note.path.is_empty() || !self.selects(note) {
                summary.filtered_out += 1;
                continue;
            }
            if !seen_paths.insert(note.path.as_str()) {
                summary.duplicate_paths += 1;
                continue;
            }
            kept.push(note);
        }

        // 2. adjacency over the surviving set, first-seen order
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::with_capacity(kept.len());
        for note in &kept {
            let mut targets: Vec<&str> = Vec::new();
            let mut dedup = HashSet::new();
            for link in &note.links {
                if self.skips_link(link) {
                    continue;
                }
                let target = link.target.as_str();
                if target == note.path || !seen_paths.contains(target) {
                    continue;
                }
                if dedup.insert(target) {
                    targets.push(target);
                }
            }
            adjacency.insert(note.path.as_str(), targets);
        }

        // 3. reciprocated edges only
        if self.options.mutual_only {
            let edge_set: HashSet<(&str, &str)> = adjacency
                .iter()
                .flat_map(|(src, targets)| targets.iter().map(move |dst| (*src, *dst)))
                .collect();
            for (src, targets) in adjacency.iter_mut() {
                let before = targets.len();
                targets.retain(|dst| edge_set.contains(&(*dst, *src)));
                summary.non_mutual_edges += before - targets.len();
            }
        }

        // 4. single-pass min-degree
        if self.options.min_degree > 0 {
            let mut degree: HashMap<&str, usize> = adjacency.keys().map(|k| (*k, 0)).collect();
            for (src, targets) in &adjacency {
                *degree.entry(src).or_default() += targets.len();
                for dst in targets {
                    *degree.entry(dst).or_default() += 1;
                }
            }
            let removed: HashSet<&str> = degree
                .into_iter()
                .filter(|(_, d)| *d < self.options.min_degree)
                .map(|(path, _)| path)
                .collect();
            summary.pruned_nodes = removed.len();
            adjacency.retain(|path, _| !removed.contains(path));
            for targets in adjacency.values_mut() {
                targets.retain(|dst| !removed.contains(dst));
            }
        }

        // 5. freeze
        let nodes: Vec<NoteNode> = kept
            .iter()
            .filter_map(|note| {
                let targets = adjacency.get(note.path.as_str())?;
                Some(NoteNode {
                    path: note.path.clone(),
                    title: note.title.clone(),
                    tags: note.tags.clone(),
                    modified: note.modified,
                    frontmatter: note.frontmatter.clone(),
                    link_order: targets.iter().map(|t| t.to_string()).collect(),
                })
            })
            .collect();

        let graph = LinkGraph::from_nodes(nodes);
        debug!(
            "Built graph: {} nodes, {} edges ({} filtered, {} pruned, {} non-mutual edges dropped)",
            graph.node_count(),
            graph.edge_count(),
            summary.filtered_out,
            summary.pruned_nodes,
            summary.non_mutual_edges
        );
        (graph, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> AnalysisOptionsBuilder {
        AnalysisOptions::builder().min_degree(0)
    }

    fn note(path: &str, links: &[&str]) -> NoteEntry {
        NoteEntry::new(path).with_links(links.iter().copied())
    }

    #[test]
    fn test_self_links_and_dangling_targets_ignored() {
        let opts = options().build().unwrap();
        let builder = GraphBuilder::new(&opts).unwrap();
        let graph = builder.build(&[note("a", &["a", "ghost", "b", "b"]), note("b", &[])]);
        assert_eq!(graph.edge_count(), 1);
        let a = graph.index_of("a.md").unwrap();
        assert_eq!(graph.display_neighbors(a), &["b.md"]);
    }

    #[test]
    fn test_exclude_drops_node_and_edges() {
        let opts = options().exclude("b").build().unwrap();
        let builder = GraphBuilder::new(&opts).unwrap();
        let (graph, summary) =
            builder.build_with_summary(&[note("a", &["b"]), note("b", &["a"]), note("c", &["a"])]);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.index_of("b.md").is_none());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(summary.filtered_out, 1);
    }

    #[test]
    fn test_include_patterns_restrict_nodes() {
        let opts = options().include("tag:keep").build().unwrap();
        let builder = GraphBuilder::new(&opts).unwrap();
        let graph = builder.build(&[
            note("a", &["b"]).with_tags(["keep"]),
            note("b", &["a"]).with_tags(["KEEP"]),
            note("c", &["a"]),
        ]);
        assert_eq!(graph.all_paths(), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_anchor_and_embed_filtering() {
        let a = NoteEntry::new("a")
            .with_link(NoteLink::new("b").with_anchor())
            .with_link(NoteLink::new("c").embedded())
            .with_link(NoteLink::new("d"));
        let notes = vec![a, note("b", &[]), note("c", &[]), note("d", &[])];

        let all = options().build().unwrap();
        assert_eq!(GraphBuilder::new(&all).unwrap().build(&notes).edge_count(), 3);

        let no_anchor = options().skip_anchors(true).build().unwrap();
        let graph = GraphBuilder::new(&no_anchor).unwrap().build(&notes);
        let idx = graph.index_of("a.md").unwrap();
        assert_eq!(graph.display_neighbors(idx), &["c.md", "d.md"]);

        let no_embed = options().skip_embeds(true).build().unwrap();
        let graph = GraphBuilder::new(&no_embed).unwrap().build(&notes);
        let idx = graph.index_of("a.md").unwrap();
        assert_eq!(graph.display_neighbors(idx), &["b.md", "d.md"]);
    }

    #[test]
    fn test_mutual_only() {
        let opts = options().mutual_only(true).build().unwrap();
        let graph = GraphBuilder::new(&opts)
            .unwrap()
            .build(&[note("a", &["b", "c"]), note("b", &["a"]), note("c", &[])]);
        assert_eq!(graph.edge_count(), 2);
        let c = graph.index_of("c.md").unwrap();
        assert_eq!(graph.in_degree(c), 0);
    }

    #[test]
    fn test_min_degree_is_single_pass() {
        // d has degree 1 and goes; c drops to degree 1 afterwards but stays
        let opts = options().min_degree(2).build().unwrap();
        let (graph, summary) = GraphBuilder::new(&opts).unwrap().build_with_summary(&[
            note("a", &["b"]),
            note("b", &["a", "c"]),
            note("c", &["d"]),
            note("d", &[]),
        ]);
        assert_eq!(graph.all_paths(), vec!["a.md", "b.md", "c.md"]);
        assert_eq!(summary.pruned_nodes, 1);
        let c = graph.index_of("c.md").unwrap();
        assert_eq!(graph.in_degree(c) + graph.out_degree(c), 1);
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let opts = options().build().unwrap();
        let (graph, summary) = GraphBuilder::new(&opts).unwrap().build_with_summary(&[
            note("a", &["b"]),
            note("a", &[]),
            note("b", &[]),
        ]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(summary.duplicate_paths, 1);
    }

    #[test]
    fn test_empty_input() {
        let opts = AnalysisOptions::default();
        let graph = GraphBuilder::new(&opts).unwrap().build(&[]);
        assert!(graph.is_empty());
    }
}
