//! End-to-end scenarios for the analysis pipeline

use chrono::{DateTime, Duration, TimeZone, Utc};
use vaultgraph_graph::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap()
}

fn analyze(options: AnalysisOptions, notes: Vec<NoteEntry>) -> GraphAnalysis {
    GraphAnalyzer::new(options).analyze_entries(notes).unwrap()
}

fn unpruned() -> AnalysisOptionsBuilder {
    AnalysisOptions::builder().min_degree(0).reference_time(now())
}

// ==================== Small Vault Tests ====================

#[test]
fn test_three_note_vault() {
    let analysis = analyze(
        unpruned().build().unwrap(),
        vec![
            NoteEntry::new("A").with_links(["B"]),
            NoteEntry::new("B").with_links(["A", "C"]),
            NoteEntry::new("C"),
        ],
    );

    assert!(analysis.orphans.is_empty());
    let clusters = analysis.clusters();
    assert_eq!(clusters.len(), 1);
    assert_eq!(*clusters[0], vec!["A.md", "B.md"]);
    assert_eq!(analysis.weak_components, vec![vec!["A.md", "B.md", "C.md"]]);

    let a = analysis.node("A.md").unwrap();
    let b = analysis.node("B.md").unwrap();
    let c = analysis.node("C.md").unwrap();
    assert!(c.authority > 0.0);
    assert!(b.hub > a.hub);
    assert!(b.hub > c.hub);
    assert_eq!((c.inbound, c.outbound), (1, 0));
    assert_eq!(b.neighbors, vec!["A.md", "C.md"]);
    assert_eq!(a.strong_component, b.strong_component);
    assert_ne!(a.strong_component, c.strong_component);
    assert_eq!(a.weak_component, "comp0");
}

#[test]
fn test_five_disconnected_notes_with_singleton_communities() {
    let notes: Vec<NoteEntry> = (1..=5).map(|i| NoteEntry::new(format!("n{}", i))).collect();
    let analysis = analyze(unpruned().build().unwrap(), notes);

    assert_eq!(analysis.orphans, vec!["n1.md", "n2.md", "n3.md", "n4.md", "n5.md"]);
    assert_eq!(analysis.weak_components.len(), 5);
    assert!(analysis.weak_components.iter().all(|c| c.len() == 1));
    assert_eq!(analysis.stats.edge_count, 0);

    assert_eq!(analysis.communities.len(), 5);
    assert!(analysis.communities.iter().all(|c| c.size() == 1));
    assert!(analysis.nodes.values().all(|n| n.community.is_some()));
}

#[test]
fn test_five_disconnected_notes_without_singleton_communities() {
    let notes: Vec<NoteEntry> = (1..=5).map(|i| NoteEntry::new(format!("n{}", i))).collect();
    let options = unpruned()
        .include_singleton_communities(false)
        .build()
        .unwrap();
    let analysis = analyze(options, notes);

    assert_eq!(analysis.orphans.len(), 5);
    assert!(analysis.communities.is_empty());
    assert!(analysis.nodes.values().all(|n| n.community.is_none()));
}

#[test]
fn test_star_pruned_by_min_degree() {
    let leaves = ["l1", "l2", "l3", "l4", "l5"];
    let mut notes = vec![NoteEntry::new("center").with_links(leaves)];
    notes.extend(leaves.iter().map(NoteEntry::new));

    let options = AnalysisOptions::builder()
        .min_degree(2)
        .reference_time(now())
        .build()
        .unwrap();
    let analysis = analyze(options, notes);

    assert_eq!(analysis.stats.node_count, 1);
    assert_eq!(analysis.stats.edge_count, 0);
    let center = analysis.node("center.md").unwrap();
    assert_eq!((center.inbound, center.outbound), (0, 0));
    assert!(center.neighbors.is_empty());
    assert_eq!(analysis.orphans, vec!["center.md"]);
}

#[test]
fn test_empty_vault() {
    let analysis = analyze(AnalysisOptions::default(), vec![]);
    assert_eq!(analysis.stats.node_count, 0);
    assert!(analysis.communities.is_empty());
    assert!(analysis.weak_components.is_empty());
}

// ==================== Recency Tests ====================

fn stale_anchor_vault() -> Vec<NoteEntry> {
    let yesterday = now() - Duration::days(1);
    vec![
        NoteEntry::new("hub")
            .with_links(["leaf-a", "leaf-b", "leaf-c"])
            .modified_at(now() - Duration::days(100)),
        NoteEntry::new("leaf-a").modified_at(yesterday),
        NoteEntry::new("leaf-b").modified_at(yesterday),
        NoteEntry::new("leaf-c").modified_at(yesterday),
    ]
}

#[test]
fn test_recency_cascade_disabled_uses_own_times() {
    let options = unpruned().recency_cascade(false).build().unwrap();
    let analysis = analyze(options, stale_anchor_vault());

    assert_eq!(analysis.communities.len(), 1);
    let recency = analysis.communities[0].recency.as_ref().unwrap();
    assert_eq!(recency.recent_count, 3);
    assert!((recency.latest_age_days - 1.0).abs() < 1e-9);
    assert_eq!(
        analysis.effective_times["hub.md"],
        now() - Duration::days(100)
    );
}

#[test]
fn test_recency_cascade_enabled_refreshes_anchor() {
    let analysis = analyze(unpruned().build().unwrap(), stale_anchor_vault());

    assert_eq!(analysis.communities.len(), 1);
    let community = &analysis.communities[0];
    let recency = community.recency.as_ref().unwrap();
    assert_eq!(recency.recent_count, 4);
    assert_eq!(recency.latest_path, "leaf-a.md");
    assert_eq!(
        analysis.effective_times["hub.md"],
        now() - Duration::days(8)
    );

    // explicit enable matches the unset default
    let explicit = analyze(
        unpruned().recency_cascade(true).build().unwrap(),
        stale_anchor_vault(),
    );
    assert_eq!(explicit.effective_times, analysis.effective_times);
}

#[test]
fn test_recent_communities_sort_first() {
    let old = now() - Duration::days(300);
    let fresh = now() - Duration::days(2);
    let notes = vec![
        // bigger but old
        NoteEntry::new("old/a").with_links(["old/b", "old/c"]).modified_at(old),
        NoteEntry::new("old/b").with_links(["old/a", "old/c"]).modified_at(old),
        NoteEntry::new("old/c").with_links(["old/a"]).modified_at(old),
        // smaller but fresh
        NoteEntry::new("new/a").with_links(["new/b"]).modified_at(fresh),
        NoteEntry::new("new/b").with_links(["new/a"]),
        // undated
        NoteEntry::new("x/a").with_links(["x/b"]),
        NoteEntry::new("x/b").with_links(["x/a"]),
    ];
    let analysis = analyze(unpruned().build().unwrap(), notes);

    assert_eq!(analysis.communities.len(), 3);
    assert!(analysis.communities[0].contains("new/a.md"));
    assert!(analysis.communities[1].contains("old/a.md"));
    assert!(analysis.communities[2].recency.is_none());
}

// ==================== Filter Tests ====================

#[test]
fn test_excluded_notes_leave_dangling_links() {
    let options = unpruned().exclude("private/").build().unwrap();
    let analysis = analyze(
        options,
        vec![
            NoteEntry::new("public").with_links(["private/secret"]),
            NoteEntry::new("private/secret").with_links(["public"]),
        ],
    );
    assert_eq!(analysis.stats.node_count, 1);
    assert_eq!(analysis.orphans, vec!["public.md"]);
}

#[test]
fn test_tags_omitted_when_disabled() {
    let notes = vec![
        NoteEntry::new("a").with_links(["b"]).with_tags(["Topic"]),
        NoteEntry::new("b").with_links(["a"]).with_tags(["topic", "extra"]),
    ];
    let with_tags = analyze(unpruned().build().unwrap(), notes.clone());
    let community = &with_tags.communities[0];
    assert_eq!(community.top_tags[0].tag, "topic");
    assert_eq!(community.top_tags[0].count, 2);

    let without = analyze(unpruned().include_tags(false).build().unwrap(), notes);
    assert!(without.communities[0].top_tags.is_empty());
    assert!(without.nodes.values().all(|n| n.tags.is_empty()));
}
