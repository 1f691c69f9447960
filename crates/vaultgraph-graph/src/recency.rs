//! Recency: effective modification times and per-community activity.

use crate::graph::{LinkGraph, NodeIndex};
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use vaultgraph_core::{RecencyCascade, RecencyPolicy};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Activity summary for a group of notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecency {
    /// Member with the freshest effective time
    pub latest_path: String,
    pub latest_age_days: f64,
    pub latest_timestamp: DateTime<Utc>,
    /// Members whose effective time falls inside the window
    pub recent_count: usize,
    pub window_days: i64,
}

/// Effective time per node, indexed like the graph.
///
/// Own times are clamped to `now`. With the cascade enabled, each pass lets a
/// node inherit a neighbor's time minus the hop offset, so freshness reaches
/// at most `cascade_passes` hops away.
pub fn effective_times(
    graph: &LinkGraph,
    policy: &RecencyPolicy,
    cascade: RecencyCascade,
    now: DateTime<Utc>,
) -> Vec<Option<DateTime<Utc>>> {
    let base: Vec<Option<DateTime<Utc>>> = graph
        .node_indices()
        .map(|idx| graph.node(idx).modified.map(|t| t.min(now)))
        .collect();

    if !cascade.is_enabled() {
        return base;
    }

    let neighbors: Vec<Vec<NodeIndex>> = graph
        .node_indices()
        .map(|idx| graph.undirected_neighbors(idx))
        .collect();

    let mut current = base.clone();
    for _ in 0..policy.cascade_passes {
        current = recency_pass(&neighbors, &base, &current, policy, now);
    }
    current
}

fn recency_pass(
    neighbors: &[Vec<NodeIndex>],
    base: &[Option<DateTime<Utc>>],
    previous: &[Option<DateTime<Utc>>],
    policy: &RecencyPolicy,
    now: DateTime<Utc>,
) -> Vec<Option<DateTime<Utc>>> {
    let fresh_window = Duration::days(policy.fresh_window_days);
    let hop_offset = Duration::days(policy.hop_offset_days);

    (0..neighbors.len())
        .into_par_iter()
        .map(|i| {
            let mut best = base[i].max(previous[i]);

            let mut sampled: Vec<(DateTime<Utc>, usize)> = neighbors[i]
                .iter()
                .filter_map(|n| previous[n.index()].map(|t| (t, n.index())))
                .collect();
            sampled.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            sampled.truncate(policy.neighbor_sample_limit);

            for (ts, _) in sampled {
                if now - ts > fresh_window {
                    continue;
                }
                let adjusted = ts - hop_offset;
                if best.is_none_or(|b| adjusted > b) {
                    best = Some(adjusted);
                }
            }
            best
        })
        .collect()
}

/// Age in fractional days, never negative
pub fn age_days(ts: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - ts).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0)
}

/// Recency summary over `members` (in path order); none when no member has a time
pub fn community_recency(
    graph: &LinkGraph,
    members: &[NodeIndex],
    times: &[Option<DateTime<Utc>>],
    window_days: i64,
    now: DateTime<Utc>,
) -> Option<CommunityRecency> {
    let window = Duration::days(window_days);
    let mut latest: Option<(NodeIndex, DateTime<Utc>)> = None;
    let mut recent_count = 0;

    for &idx in members {
        let Some(ts) = times[idx.index()] else {
            continue;
        };
        if latest.is_none_or(|(_, best)| ts > best) {
            latest = Some((idx, ts));
        }
        if now - ts <= window {
            recent_count += 1;
        }
    }

    latest.map(|(idx, ts)| CommunityRecency {
        latest_path: graph.path(idx).to_string(),
        latest_age_days: age_days(ts, now),
        latest_timestamp: ts,
        recent_count,
        window_days,
    })
}
