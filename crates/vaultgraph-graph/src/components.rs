//! Weak and strong components

use crate::graph::{LinkGraph, NodeIndex};
use petgraph::algo::tarjan_scc;
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, HashMap};

/// A component: member paths sorted ascending
pub type Component = Vec<String>;

/// Weak components over the undirected view of the graph.
///
/// Every node lands in exactly one component; isolated notes form singletons.
pub fn weak_components(graph: &LinkGraph) -> Vec<Component> {
    let n = graph.node_count();
    let mut sets = UnionFind::<usize>::new(n);
    for (src, dst) in graph.edges() {
        sets.union(src.index(), dst.index());
    }

    let mut grouped: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
    for idx in graph.node_indices() {
        grouped.entry(sets.find(idx.index())).or_default().push(idx);
    }

    sort_components(
        grouped
            .into_values()
            .map(|members| to_paths(graph, members))
            .collect(),
    )
}

/// Strong components (mutual reachability), including singletons
pub fn strong_components(graph: &LinkGraph) -> Vec<Component> {
    sort_components(
        tarjan_scc(graph.inner())
            .into_iter()
            .map(|members| to_paths(graph, members))
            .collect(),
    )
}

/// Strong components with more than one member
pub fn clusters(strong: &[Component]) -> Vec<Component> {
    strong.iter().filter(|c| c.len() > 1).cloned().collect()
}

/// Map each path to `<prefix><position>`
pub fn assign_ids(components: &[Component], prefix: &str) -> HashMap<String, String> {
    let mut ids = HashMap::new();
    for (position, component) in components.iter().enumerate() {
        let id = format!("{}{}", prefix, position);
        for path in component {
            ids.insert(path.clone(), id.clone());
        }
    }
    ids
}

fn to_paths(graph: &LinkGraph, mut members: Vec<NodeIndex>) -> Component {
    members.sort_unstable();
    members
        .into_iter()
        .map(|idx| graph.path(idx).to_string())
        .collect()
}

/// Size descending, then first member ascending
fn sort_components(mut components: Vec<Component>) -> Vec<Component> {
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.first().cmp(&b.first())));
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use vaultgraph_core::{AnalysisOptions, NoteEntry};

    fn graph_of(notes: &[(&str, &[&str])]) -> LinkGraph {
        let opts = AnalysisOptions::builder().min_degree(0).build().unwrap();
        let entries: Vec<NoteEntry> = notes
            .iter()
            .map(|(p, links)| NoteEntry::new(p).with_links(links.iter().copied()))
            .collect();
        GraphBuilder::new(&opts).unwrap().build(&entries)
    }

    #[test]
    fn test_weak_components_sorted() {
        let graph = graph_of(&[
            ("e", &[]),
            ("a", &["b"]),
            ("c", &["b"]),
            ("d", &[]),
        ]);
        let weak = weak_components(&graph);
        assert_eq!(
            weak,
            vec![
                vec!["a.md".to_string(), "b.md".to_string(), "c.md".to_string()],
                vec!["d.md".to_string()],
                vec!["e.md".to_string()],
            ]
        );
    }

    #[test]
    fn test_strong_components_and_clusters() {
        let graph = graph_of(&[
            ("a", &["b"]),
            ("b", &["a", "c"]),
            ("c", &["d"]),
            ("d", &["c"]),
            ("e", &["a"]),
        ]);
        let strong = strong_components(&graph);
        assert_eq!(strong.len(), 3);
        assert_eq!(strong[0], vec!["a.md", "b.md"]);
        assert_eq!(strong[1], vec!["c.md", "d.md"]);
        assert_eq!(strong[2], vec!["e.md"]);
        assert_eq!(clusters(&strong).len(), 2);
    }

    #[test]
    fn test_assign_ids_by_position() {
        let comps = vec![vec!["x.md".to_string(), "y.md".to_string()], vec!["z.md".to_string()]];
        let ids = assign_ids(&comps, "comp");
        assert_eq!(ids["x.md"], "comp0");
        assert_eq!(ids["y.md"], "comp0");
        assert_eq!(ids["z.md"], "comp1");
    }

    #[test]
    fn test_empty_graph_has_no_components() {
        let graph = LinkGraph::new();
        assert!(weak_components(&graph).is_empty());
        assert!(strong_components(&graph).is_empty());
    }
}
