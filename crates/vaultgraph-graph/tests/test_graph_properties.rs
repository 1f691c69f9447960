//! Structural properties that must hold for any vault

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{BTreeSet, HashMap};
use vaultgraph_graph::builder::GraphBuilder;
use vaultgraph_graph::hits::{HitsTopology, compute_hits_with, hits_step, max_abs_change};
use vaultgraph_graph::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()
}

/// Deterministic pseudo-random vault: every note links to a few others,
/// some notes link to nothing, some links repeat or point at themselves.
fn synthetic_vault(size: usize, seed: u64) -> Vec<NoteEntry> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };

    (0..size)
        .map(|i| {
            let fanout = next() % 4;
            let targets: Vec<String> = (0..fanout)
                .map(|_| format!("topic{}/note{}", next() % 3, next() % size))
                .collect();
            NoteEntry::new(format!("topic{}/note{}", i % 3, i))
                .with_links(targets)
                .with_tags([format!("t{}", i % 4)])
                .modified_at(now() - Duration::days((next() % 400) as i64))
        })
        .collect()
}

fn fixtures() -> Vec<Vec<NoteEntry>> {
    vec![
        synthetic_vault(12, 1),
        synthetic_vault(40, 7),
        synthetic_vault(90, 42),
    ]
}

fn analyze(options: AnalysisOptions, notes: Vec<NoteEntry>) -> GraphAnalysis {
    GraphAnalyzer::new(options).analyze_entries(notes).unwrap()
}

fn base() -> AnalysisOptionsBuilder {
    AnalysisOptions::builder().min_degree(0).reference_time(now())
}

// ==================== Degree & Orphan Tests ====================

#[test]
fn test_degree_consistency() {
    for notes in fixtures() {
        let analysis = analyze(base().build().unwrap(), notes);
        let mut inbound: HashMap<&str, usize> = HashMap::new();
        for node in analysis.nodes.values() {
            for target in &node.neighbors {
                assert_ne!(target, &node.path, "self link survived");
                *inbound.entry(target.as_str()).or_default() += 1;
            }
        }
        for node in analysis.nodes.values() {
            assert_eq!(node.inbound, inbound.get(node.path.as_str()).copied().unwrap_or(0));
            assert_eq!(node.outbound, node.neighbors.len());
        }
        let edges: usize = analysis.nodes.values().map(|n| n.outbound).sum();
        assert_eq!(edges, analysis.stats.edge_count);
    }
}

#[test]
fn test_orphan_correctness() {
    for notes in fixtures() {
        let analysis = analyze(base().build().unwrap(), notes);
        let expected: Vec<String> = analysis
            .nodes
            .values()
            .filter(|n| n.inbound == 0 && n.outbound == 0)
            .map(|n| n.path.clone())
            .collect();
        assert_eq!(analysis.orphans, expected);
    }
}

// ==================== Partition Tests ====================

#[test]
fn test_partition_completeness() {
    for notes in fixtures() {
        let analysis = analyze(base().build().unwrap(), notes);
        let all: BTreeSet<&str> = analysis.nodes.keys().map(String::as_str).collect();

        let mut weak_seen = BTreeSet::new();
        for component in &analysis.weak_components {
            for member in component {
                assert!(weak_seen.insert(member.as_str()), "{} in two components", member);
            }
        }
        assert_eq!(weak_seen, all);

        let mut community_seen = BTreeSet::new();
        for community in &analysis.communities {
            for member in &community.members {
                assert!(community_seen.insert(member.as_str()));
                assert_eq!(analysis.nodes[member].community.as_deref(), Some(community.id.as_str()));
            }
        }
        assert_eq!(community_seen, all);
    }
}

#[test]
fn test_partition_without_singletons() {
    for notes in fixtures() {
        let options = base().include_singleton_communities(false).build().unwrap();
        let analysis = analyze(options, notes);
        let members: BTreeSet<&str> = analysis
            .communities
            .iter()
            .flat_map(|c| c.members.iter().map(String::as_str))
            .collect();
        let assigned: BTreeSet<&str> = analysis
            .nodes
            .values()
            .filter(|n| n.community.is_some())
            .map(|n| n.path.as_str())
            .collect();
        assert_eq!(members, assigned);
        assert!(analysis.communities.iter().all(|c| c.size() > 1));
    }
}

#[test]
fn test_strong_components_inside_weak_components() {
    for notes in fixtures() {
        let analysis = analyze(base().build().unwrap(), notes);
        for strong in &analysis.strong_components {
            let weak_id = &analysis.nodes[&strong[0]].weak_component;
            assert!(strong.iter().all(|m| &analysis.nodes[m].weak_component == weak_id));
        }
        let strong_total: usize = analysis.strong_components.iter().map(Vec::len).sum();
        assert_eq!(strong_total, analysis.stats.node_count);
    }
}

// ==================== Filter Tests ====================

#[test]
fn test_mutual_only_soundness() {
    for notes in fixtures() {
        let analysis = analyze(base().mutual_only(true).build().unwrap(), notes);
        for node in analysis.nodes.values() {
            for target in &node.neighbors {
                assert!(
                    analysis.nodes[target].neighbors.contains(&node.path),
                    "{} -> {} is not reciprocated",
                    node.path,
                    target
                );
            }
        }
    }
}

#[test]
fn test_min_degree_enforcement() {
    for notes in fixtures() {
        for threshold in [1, 2, 3] {
            let before = analyze(base().build().unwrap(), notes.clone());
            let after = analyze(base().min_degree(threshold).build().unwrap(), notes.clone());
            for (path, node) in &before.nodes {
                let degree = node.inbound + node.outbound;
                assert_eq!(
                    after.nodes.contains_key(path),
                    degree >= threshold,
                    "{} with degree {} at threshold {}",
                    path,
                    degree,
                    threshold
                );
            }
            for node in after.nodes.values() {
                assert!(node.neighbors.iter().all(|t| after.nodes.contains_key(t)));
            }
        }
    }
}

// ==================== HITS Tests ====================

#[test]
fn test_hits_stable_after_convergence() {
    let options = base().build().unwrap();
    // a star converges within a few rounds
    let star = vec![
        NoteEntry::new("index").with_links(["a", "b", "c"]),
        NoteEntry::new("a"),
        NoteEntry::new("b"),
        NoteEntry::new("c"),
    ];
    let mut converged = 0;
    for notes in fixtures().into_iter().chain([star]) {
        let graph = GraphBuilder::new(&options).unwrap().build(&notes);
        let topology = HitsTopology::new(&graph);
        let scores = compute_hits_with(&topology, &options.hits);
        if !scores.converged {
            continue;
        }
        converged += 1;
        let (authority, hub) = hits_step(&topology, &scores.hub);
        assert!(max_abs_change(&scores.authority, &authority) <= options.hits.tolerance);
        assert!(max_abs_change(&scores.hub, &hub) <= options.hits.tolerance);
    }
    assert!(converged > 0, "no fixture converged");
}

// ==================== Determinism Tests ====================

#[test]
fn test_result_independent_of_input_order() {
    for notes in fixtures() {
        let forward = analyze(base().build().unwrap(), notes.clone());
        let mut reversed_notes = notes;
        reversed_notes.reverse();
        let reversed = analyze(base().build().unwrap(), reversed_notes);

        assert_eq!(
            serde_json::to_value(&forward).unwrap(),
            serde_json::to_value(&reversed).unwrap()
        );
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let notes = synthetic_vault(60, 3);
    let analyzer = GraphAnalyzer::new(base().build().unwrap());
    let first = analyzer.analyze_entries(notes.clone()).unwrap();
    let second = analyzer.analyze_entries(notes).unwrap();
    assert_eq!(first.communities, second.communities);
    assert_eq!(first.nodes, second.nodes);
}
