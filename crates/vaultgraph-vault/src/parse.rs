//! Markdown note parsing: frontmatter, title, tags and wikilinks.
//!
//! Links come out unresolved; [`crate::resolve::LinkResolver`] maps them to
//! vault paths.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use vaultgraph_core::models::{LinkKind, normalize_tag, title_from_path};

/// Matches YAML frontmatter: --- ... ---
static FRONTMATTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---\s*\n([\s\S]*?)\n---\s*(?:\n|$)").unwrap());

/// Matches `[[target]]`, `[[target#anchor|alias]]` and `![[embed]]`
static WIKILINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\]|]+)(\|[^\]]*)?\]\]").unwrap());

/// Matches inline `#tag` preceded by start of line or whitespace
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([a-zA-Z0-9_\-/]+)").unwrap());

/// Matches fenced code blocks
static CODE_FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^\s*```.*?^\s*```[^\n]*$").unwrap());

/// A wikilink as written, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// Link target without anchor or alias
    pub target: String,
    pub has_anchor: bool,
    pub is_embed: bool,
    pub kind: LinkKind,
}

/// Everything extracted from one note's text
#[derive(Debug, Clone, Default)]
pub struct ParsedNote {
    pub title: String,
    pub tags: Vec<String>,
    pub links: Vec<RawLink>,
    pub frontmatter: Option<Value>,
    /// Text after the frontmatter block
    pub body: String,
}

/// Parse a note's text. `path` is the normalized vault-relative path.
pub fn parse_note(path: &str, content: &str) -> ParsedNote {
    let (frontmatter, body) = split_frontmatter(path, content);
    let scrubbed = CODE_FENCE_PATTERN.replace_all(body, "");

    let title = frontmatter
        .as_ref()
        .and_then(|fm| fm.get("title"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| title_from_path(path));

    let mut tags = BTreeSet::new();
    if let Some(fm) = frontmatter.as_ref().and_then(|fm| fm.get("tags")) {
        tags.extend(frontmatter_tags(fm));
    }
    tags.extend(inline_tags(&scrubbed));

    ParsedNote {
        title,
        tags: tags.into_iter().collect(),
        links: extract_links(&scrubbed),
        frontmatter,
        body: body.to_string(),
    }
}

/// Split off the frontmatter block and convert it to JSON.
///
/// Malformed YAML is logged and treated as absent; the body still parses.
pub fn split_frontmatter<'a>(path: &str, content: &'a str) -> (Option<Value>, &'a str) {
    let Some(caps) = FRONTMATTER_PATTERN.captures(content) else {
        return (None, content);
    };
    let (Some(whole), Some(yaml)) = (caps.get(0), caps.get(1)) else {
        return (None, content);
    };
    let body = &content[whole.end()..];

    let value = match serde_yaml::from_str::<serde_yaml::Value>(yaml.as_str()) {
        Ok(serde_yaml::Value::Null) => None,
        Ok(parsed) => match serde_json::to_value(parsed) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Frontmatter of {} is not representable as JSON: {}", path, e);
                None
            }
        },
        Err(e) => {
            log::warn!("Malformed frontmatter in {}: {}", path, e);
            None
        }
    };

    (value, body)
}

/// Wikilinks and embeds in document order
pub fn extract_links(text: &str) -> Vec<RawLink> {
    WIKILINK_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let is_embed = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let raw = caps.get(2)?.as_str().trim();
            let kind = match caps.get(3) {
                Some(_) if !is_embed => LinkKind::Alias,
                _ => LinkKind::classify(raw, is_embed),
            };
            let (target, has_anchor) = match raw.split_once('#') {
                Some((target, _)) => (target.trim(), true),
                None => (raw, false),
            };
            // [[#heading]] points into the same note
            if target.is_empty() {
                return None;
            }
            Some(RawLink {
                target: target.to_string(),
                has_anchor,
                is_embed,
                kind,
            })
        })
        .collect()
}

/// Inline tags, lowercased. Purely numeric tokens (`#1`) are not tags.
pub fn inline_tags(text: &str) -> Vec<String> {
    TAG_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('/'))
        .filter(|tag| !tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit()))
        .map(normalize_tag)
        .collect()
}

fn frontmatter_tags(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(normalize_tag)
            .filter(|t| !t.is_empty())
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(normalize_tag)
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_title_and_tags() {
        let content = "---\ntitle: Weekly Sync\ntags: [Meeting, team/alpha]\n---\nBody #Follow-up\n";
        let note = parse_note("meetings/sync.md", content);
        assert_eq!(note.title, "Weekly Sync");
        assert_eq!(note.tags, vec!["follow-up", "meeting", "team/alpha"]);
        assert_eq!(note.body, "Body #Follow-up\n");
        let fm = note.frontmatter.unwrap();
        assert_eq!(fm["title"], "Weekly Sync");
    }

    #[test]
    fn test_string_tags_and_missing_title() {
        let content = "---\ntags: \"#one, two\"\n---\n";
        let note = parse_note("dir/Plain Note.md", content);
        assert_eq!(note.title, "Plain Note");
        assert_eq!(note.tags, vec!["one", "two"]);
    }

    #[test]
    fn test_no_frontmatter() {
        let note = parse_note("a.md", "# Heading\n\nText with #tag and #42\n");
        assert!(note.frontmatter.is_none());
        assert_eq!(note.tags, vec!["tag"]);
        assert_eq!(note.title, "a");
    }

    #[test]
    fn test_malformed_frontmatter_ignored() {
        let content = "---\ntitle: [unclosed\n---\nSee [[b]]\n";
        let note = parse_note("a.md", content);
        assert!(note.frontmatter.is_none());
        assert_eq!(note.links.len(), 1);
    }

    #[test]
    fn test_link_flags() {
        let links = extract_links(
            "[[Plain]] [[Folder/Note#Section|alias]] ![[diagram]] ![[Doc#^block]] [[#local]] [[Ref#^b1]] [[Intro#Why]]",
        );
        let link = |target: &str, has_anchor, is_embed, kind| RawLink {
            target: target.into(),
            has_anchor,
            is_embed,
            kind,
        };
        assert_eq!(
            links,
            vec![
                link("Plain", false, false, LinkKind::Basic),
                link("Folder/Note", true, false, LinkKind::Alias),
                link("diagram", false, true, LinkKind::Embed),
                link("Doc", true, true, LinkKind::Embed),
                link("Ref", true, false, LinkKind::Block),
                link("Intro", true, false, LinkKind::Heading),
            ]
        );
    }

    #[test]
    fn test_code_blocks_skipped() {
        let content = "before [[a]]\n```\n[[not-a-link]] #nottag\n```\nafter [[b]]\n";
        let note = parse_note("x.md", content);
        let targets: Vec<_> = note.links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["a", "b"]);
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_anchor_fragments_are_not_tags() {
        let tags = inline_tags("see [[note#section]] and http://x.io/#frag but #real");
        assert_eq!(tags, vec!["real"]);
    }
}
