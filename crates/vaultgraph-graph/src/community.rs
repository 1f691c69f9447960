//! Label-propagation communities and their summaries.

use crate::graph::{LinkGraph, NodeIndex};
use crate::hits::HitsScores;
use crate::recency::{CommunityRecency, community_recency};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use vaultgraph_core::AnalysisOptions;

/// Label per node (the index of the node whose path is the label)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAssignment {
    pub labels: Vec<usize>,
    pub rounds: usize,
    pub converged: bool,
}

/// Tag frequency within a community
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// A member and its scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityScore {
    pub path: String,
    pub authority: f64,
    pub hub: f64,
}

/// Slice of the authority distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityBucket {
    pub low: f64,
    pub high: f64,
    pub count: usize,
    pub example: String,
}

/// Mean and nearest-rank percentiles of member authority
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuthorityStats {
    pub mean: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

/// A detected community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub id: String,
    /// Member paths, sorted
    pub members: Vec<String>,
    pub anchor: String,
    pub density: f64,
    pub top_tags: Vec<TagCount>,
    pub top_authority: Vec<AuthorityScore>,
    pub authority_stats: Option<AuthorityStats>,
    pub authority_buckets: Vec<AuthorityBucket>,
    pub recency: Option<CommunityRecency>,
    /// Members with links to or from other communities
    pub bridges: Vec<String>,
}

impl CommunitySummary {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(path)).is_ok()
    }
}

/// Propagate labels until stable or `max_rounds`.
///
/// Nodes are visited in path order and updated in place. A node adopts the
/// label held by most of its undirected neighbors; ties go to the smallest
/// label. Nodes without neighbors keep their own label.
pub fn propagate_labels(graph: &LinkGraph, max_rounds: usize) -> LabelAssignment {
    let neighbors: Vec<Vec<NodeIndex>> = graph
        .node_indices()
        .map(|idx| graph.undirected_neighbors(idx))
        .collect();
    let mut labels: Vec<usize> = (0..neighbors.len()).collect();

    let mut rounds = 0;
    let mut converged = neighbors.is_empty();
    while rounds < max_rounds && !converged {
        rounds += 1;
        let mut changed = false;
        for (node, adjacent) in neighbors.iter().enumerate() {
            if adjacent.is_empty() {
                continue;
            }
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for n in adjacent {
                *counts.entry(labels[n.index()]).or_default() += 1;
            }
            let mut best = labels[node];
            let mut best_count = 0;
            for (&label, &count) in &counts {
                if count > best_count {
                    best = label;
                    best_count = count;
                }
            }
            if best != labels[node] {
                labels[node] = best;
                changed = true;
            }
        }
        converged = !changed;
    }

    debug!(
        "Label propagation finished after {} rounds (converged: {})",
        rounds, converged
    );
    LabelAssignment {
        labels,
        rounds,
        converged,
    }
}

/// Everything a summary needs, borrowed from earlier phases
pub struct SummaryInputs<'a> {
    pub graph: &'a LinkGraph,
    pub labels: &'a LabelAssignment,
    pub hits: &'a HitsScores,
    pub times: &'a [Option<DateTime<Utc>>],
    pub options: &'a AnalysisOptions,
    pub now: DateTime<Utc>,
}

/// Group nodes by label and summarize each group
pub fn summarize_communities(inputs: &SummaryInputs<'_>) -> Vec<CommunitySummary> {
    let graph = inputs.graph;
    let labels = &inputs.labels.labels;

    let mut grouped: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
    for idx in graph.node_indices() {
        grouped.entry(labels[idx.index()]).or_default().push(idx);
    }

    let cross = cross_community_counts(graph, labels);

    let mut summaries: Vec<CommunitySummary> = grouped
        .into_iter()
        .filter(|(_, members)| inputs.options.include_singleton_communities || members.len() > 1)
        .map(|(label, members)| summarize(inputs, label, &members, &cross))
        .collect();

    summaries.sort_by(|a, b| {
        let by_recency = match (&a.recency, &b.recency) {
            (Some(ra), Some(rb)) => ra.latest_age_days.total_cmp(&rb.latest_age_days),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_recency
            .then_with(|| b.size().cmp(&a.size()))
            .then_with(|| a.id.cmp(&b.id))
    });
    summaries
}

fn summarize(
    inputs: &SummaryInputs<'_>,
    label: usize,
    members: &[NodeIndex],
    cross: &[usize],
) -> CommunitySummary {
    let graph = inputs.graph;
    let options = inputs.options;
    let authority = |idx: NodeIndex| inputs.hits.authority.get(idx.index()).copied().unwrap_or(0.0);
    let hub = |idx: NodeIndex| inputs.hits.hub.get(idx.index()).copied().unwrap_or(0.0);

    // authority desc, path asc
    let mut ranked: Vec<NodeIndex> = members.to_vec();
    ranked.sort_by(|a, b| authority(*b).total_cmp(&authority(*a)).then(a.cmp(b)));

    let member_paths: Vec<String> = members.iter().map(|&m| graph.path(m).to_string()).collect();
    let anchor = ranked
        .first()
        .map(|&idx| graph.path(idx).to_string())
        .unwrap_or_default();

    let top_authority = ranked
        .iter()
        .take(options.top_authority_limit)
        .map(|&idx| AuthorityScore {
            path: graph.path(idx).to_string(),
            authority: authority(idx),
            hub: hub(idx),
        })
        .collect();

    let top_tags = if options.include_tags {
        count_top_tags(graph, members, options.top_tags_limit)
    } else {
        Vec::new()
    };

    let values: Vec<(String, f64)> = ranked
        .iter()
        .map(|&idx| (graph.path(idx).to_string(), authority(idx)))
        .collect();

    let mut bridges: Vec<NodeIndex> = members
        .iter()
        .copied()
        .filter(|m| cross[m.index()] > 0)
        .collect();
    bridges.sort_by(|a, b| {
        cross[b.index()]
            .cmp(&cross[a.index()])
            .then_with(|| authority(*b).total_cmp(&authority(*a)))
            .then(a.cmp(b))
    });

    CommunitySummary {
        id: community_id(graph.path(NodeIndex::new(label)), &anchor, &member_paths),
        density: density(graph, members),
        anchor,
        top_tags,
        top_authority,
        authority_stats: authority_stats(&values),
        authority_buckets: authority_buckets(&values),
        recency: community_recency(
            graph,
            members,
            inputs.times,
            options.recency.window_days,
            inputs.now,
        ),
        bridges: bridges
            .into_iter()
            .map(|idx| graph.path(idx).to_string())
            .collect(),
        members: member_paths,
    }
}

/// `c` + first 8 hex chars of SHA-256 over `label|anchor|m1;m2;...`
pub fn community_id(label: &str, anchor: &str, members: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(b"|");
    hasher.update(anchor.as_bytes());
    hasher.update(b"|");
    for member in members {
        hasher.update(member.as_bytes());
        hasher.update(b";");
    }
    let digest = hasher.finalize();

    let mut id = String::with_capacity(9);
    id.push('c');
    for byte in digest.iter().take(4) {
        id.push_str(&format!("{:02x}", byte));
    }
    id
}

/// Internal directed edges over n(n-1)
pub fn density(graph: &LinkGraph, members: &[NodeIndex]) -> f64 {
    let n = members.len();
    if n < 2 {
        return 0.0;
    }
    internal_edge_count(graph, members) as f64 / (n * (n - 1)) as f64
}

/// Directed edges with both ends in `members`
pub fn internal_edge_count(graph: &LinkGraph, members: &[NodeIndex]) -> usize {
    let mut sorted = members.to_vec();
    sorted.sort_unstable();
    members
        .iter()
        .map(|&m| {
            graph
                .successors(m)
                .iter()
                .filter(|s| sorted.binary_search(s).is_ok())
                .count()
        })
        .sum()
}

/// Per node, the number of edges (either direction) crossing label groups
fn cross_community_counts(graph: &LinkGraph, labels: &[usize]) -> Vec<usize> {
    let mut counts = vec![0; labels.len()];
    for (src, dst) in graph.edges() {
        if labels[src.index()] != labels[dst.index()] {
            counts[src.index()] += 1;
            counts[dst.index()] += 1;
        }
    }
    counts
}

fn count_top_tags(graph: &LinkGraph, members: &[NodeIndex], limit: usize) -> Vec<TagCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for &m in members {
        for tag in &graph.node(m).tags {
            *counts.entry(tag.to_lowercase()).or_default() += 1;
        }
    }
    let mut list: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    list.truncate(limit);
    list
}

/// `values` sorted by authority descending
fn authority_stats(values: &[(String, f64)]) -> Option<AuthorityStats> {
    if values.is_empty() {
        return None;
    }
    let mut ascending: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    ascending.sort_by(f64::total_cmp);
    let n = ascending.len();
    let mean = ascending.iter().sum::<f64>() / n as f64;
    let rank = |q: f64| {
        let idx = ((q * n as f64).ceil() as usize).saturating_sub(1);
        ascending[idx.min(n - 1)]
    };
    Some(AuthorityStats {
        mean,
        p50: rank(0.50),
        p75: rank(0.75),
        p90: rank(0.90),
        p95: rank(0.95),
        p99: rank(0.99),
        max: ascending[n - 1],
    })
}

/// Number of buckets for `n` members: ceil(sqrt(n)) clamped to 5..=10
pub fn bucket_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64).sqrt().ceil() as usize).clamp(5, 10)
}

/// `values` sorted by authority descending
fn authority_buckets(values: &[(String, f64)]) -> Vec<AuthorityBucket> {
    let count = bucket_count(values.len());
    if count == 0 {
        return Vec::new();
    }
    let size = values.len().div_ceil(count);
    values
        .chunks(size)
        .map(|segment| AuthorityBucket {
            high: segment[0].1,
            low: segment[segment.len() - 1].1,
            count: segment.len(),
            example: segment[0].0.clone(),
        })
        .collect()
}
