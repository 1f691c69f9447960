//! Wikilink target resolution against the set of loaded notes.

use std::collections::{HashMap, HashSet};
use vaultgraph_core::models::{normalize_note_path, title_from_path};

/// Maps written link targets to normalized note paths.
///
/// Resolution order:
/// 1. exact normalized path
/// 2. bare file stem, case-insensitive, when exactly one note has it
/// 3. path suffix, case-insensitive; the shortest then smallest path wins
#[derive(Debug, Default)]
pub struct LinkResolver {
    exact: HashSet<String>,
    by_stem: HashMap<String, Vec<String>>,
    lowercase: Vec<(String, String)>,
}

impl LinkResolver {
    /// Build a resolver over normalized note paths
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resolver = Self::default();
        for path in paths {
            let path = path.into();
            resolver
                .by_stem
                .entry(title_from_path(&path).to_lowercase())
                .or_default()
                .push(path.clone());
            resolver.lowercase.push((path.to_lowercase(), path.clone()));
            resolver.exact.insert(path);
        }
        resolver
            .lowercase
            .sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.1.cmp(&b.1)));
        resolver
    }

    /// Resolve a written target, or `None` when no note matches
    pub fn resolve(&self, target: &str) -> Option<String> {
        let normalized = normalize_note_path(target);
        if normalized.is_empty() {
            return None;
        }

        if self.exact.contains(&normalized) {
            return Some(normalized);
        }

        let wanted = normalized.to_lowercase();
        if let Some(candidates) = self.by_stem.get(&title_from_path(&wanted))
            && candidates.len() == 1
            && !normalized.contains('/')
        {
            return Some(candidates[0].clone());
        }

        let suffix = format!("/{}", wanted);
        self.lowercase
            .iter()
            .find(|(lower, _)| *lower == wanted || lower.ends_with(&suffix))
            .map(|(_, original)| original.clone())
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LinkResolver {
        LinkResolver::new([
            "Inbox.md",
            "projects/Roadmap.md",
            "projects/alpha/notes.md",
            "archive/alpha/notes.md",
            "daily/notes.md",
        ])
    }

    #[test]
    fn test_exact_path() {
        assert_eq!(resolver().resolve("projects/Roadmap").as_deref(), Some("projects/Roadmap.md"));
        assert_eq!(resolver().resolve("Inbox.md").as_deref(), Some("Inbox.md"));
    }

    #[test]
    fn test_unique_stem_case_insensitive() {
        assert_eq!(resolver().resolve("roadmap").as_deref(), Some("projects/Roadmap.md"));
        assert_eq!(resolver().resolve("INBOX").as_deref(), Some("Inbox.md"));
    }

    #[test]
    fn test_ambiguous_stem_falls_back_to_suffix() {
        assert_eq!(
            resolver().resolve("alpha/notes").as_deref(),
            Some("archive/alpha/notes.md")
        );
        assert_eq!(
            resolver().resolve("projects/alpha/Notes").as_deref(),
            Some("projects/alpha/notes.md")
        );
        // shortest path wins for a bare ambiguous stem
        assert_eq!(resolver().resolve("notes").as_deref(), Some("daily/notes.md"));
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(resolver().resolve("missing"), None);
        assert_eq!(resolver().resolve("  "), None);
        assert!(!resolver().is_empty());
        assert_eq!(resolver().len(), 5);
    }
}
