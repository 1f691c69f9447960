//! HITS hub/authority scoring.
//!
//! Authority of a note is the sum of the hub scores of notes linking to it;
//! hub of a note is the sum of the authority scores of notes it links to.
//! Both vectors are L2-normalized after every update.

use crate::graph::LinkGraph;
use log::debug;
use rayon::prelude::*;
use vaultgraph_core::HitsConfig;

/// Hub and authority vectors indexed like the graph's nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitsScores {
    pub hub: Vec<f64>,
    pub authority: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Sorted predecessor and successor lists, computed once per run
#[derive(Debug, Clone)]
pub struct HitsTopology {
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
}

impl HitsTopology {
    pub fn new(graph: &LinkGraph) -> Self {
        let incoming = graph
            .node_indices()
            .map(|idx| graph.predecessors(idx).into_iter().map(|i| i.index()).collect())
            .collect();
        let outgoing = graph
            .node_indices()
            .map(|idx| graph.successors(idx).into_iter().map(|i| i.index()).collect())
            .collect();
        Self { incoming, outgoing }
    }

    pub fn len(&self) -> usize {
        self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }
}

/// One HITS iteration.
///
/// Returns `(authority, hub)`: authority from `hub_prev`, then hub from the
/// new authority vector, both normalized. Per-node sums run in parallel over
/// read-only inputs and add neighbors in index order, so the result does not
/// depend on thread scheduling.
pub fn hits_step(topology: &HitsTopology, hub_prev: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut authority: Vec<f64> = topology
        .incoming
        .par_iter()
        .map(|sources| sources.iter().map(|&m| hub_prev[m]).sum::<f64>())
        .collect();
    normalize(&mut authority);

    let mut hub: Vec<f64> = topology
        .outgoing
        .par_iter()
        .map(|targets| targets.iter().map(|&m| authority[m]).sum::<f64>())
        .collect();
    normalize(&mut hub);

    (authority, hub)
}

/// Run HITS to convergence or the iteration cap
pub fn compute_hits(graph: &LinkGraph, config: &HitsConfig) -> HitsScores {
    let topology = HitsTopology::new(graph);
    compute_hits_with(&topology, config)
}

/// Run HITS over a prepared topology
pub fn compute_hits_with(topology: &HitsTopology, config: &HitsConfig) -> HitsScores {
    let n = topology.len();
    if n == 0 {
        return HitsScores {
            converged: true,
            ..Default::default()
        };
    }

    let mut hub = vec![1.0; n];
    let mut authority = vec![1.0; n];

    for iteration in 1..=config.max_iterations {
        let (next_authority, next_hub) = hits_step(topology, &hub);
        let delta = max_abs_change(&authority, &next_authority)
            .max(max_abs_change(&hub, &next_hub));
        authority = next_authority;
        hub = next_hub;

        if delta < config.tolerance {
            debug!("HITS converged after {} iterations (delta {:e})", iteration, delta);
            return HitsScores {
                hub,
                authority,
                iterations: iteration,
                converged: true,
            };
        }
    }

    debug!(
        "HITS reached the iteration cap ({}) without converging",
        config.max_iterations
    );
    HitsScores {
        hub,
        authority,
        iterations: config.max_iterations,
        converged: false,
    }
}

fn normalize(values: &mut [f64]) {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}

/// Largest absolute element-wise difference
pub fn max_abs_change(before: &[f64], after: &[f64]) -> f64 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
