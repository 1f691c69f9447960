//! Core data models for a vault snapshot.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Immutable per run**: a snapshot is built once by a loader and only read afterwards
//! - **Keyed by normalized path**: forward slashes, no leading `./`, `.md` suffix

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a wikilink was written
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[[Note]]`
    #[default]
    Basic,
    /// `[[Note|label]]`
    Alias,
    /// `[[Note#Section]]`
    Heading,
    /// `[[Note#^block]]`
    Block,
    /// `![[Note]]`
    Embed,
}

impl LinkKind {
    /// Classify a link from its bracket contents. Embeds win over aliases,
    /// aliases over anchors.
    pub fn classify(inner: &str, is_embed: bool) -> Self {
        if is_embed {
            LinkKind::Embed
        } else if inner.contains('|') {
            LinkKind::Alias
        } else if inner.contains("#^") {
            LinkKind::Block
        } else if inner.contains('#') {
            LinkKind::Heading
        } else {
            LinkKind::Basic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Basic => "basic",
            LinkKind::Alias => "alias",
            LinkKind::Heading => "heading",
            LinkKind::Block => "block",
            LinkKind::Embed => "embed",
        }
    }
}

/// An outbound wikilink, already resolved to a normalized note path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NoteLink {
    /// Normalized path of the linked note
    pub target: String,
    /// `[[Note#Section]]` or `[[Note#^block]]`
    pub has_anchor: bool,
    /// `![[Note]]`
    pub is_embed: bool,
    #[serde(default)]
    pub kind: LinkKind,
}

impl NoteLink {
    /// Create a plain wikilink to `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: normalize_note_path(&target.into()),
            has_anchor: false,
            is_embed: false,
            kind: LinkKind::Basic,
        }
    }

    /// Mark the link as carrying a heading anchor
    pub fn with_anchor(mut self) -> Self {
        self.has_anchor = true;
        if self.kind == LinkKind::Basic {
            self.kind = LinkKind::Heading;
        }
        self
    }

    /// Mark the link as an embed
    pub fn embedded(mut self) -> Self {
        self.is_embed = true;
        self.kind = LinkKind::Embed;
        self
    }

    /// Override the written form
    pub fn with_kind(mut self, kind: LinkKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A note linking to another, with the form of its first such link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Backlink {
    pub referrer: String,
    pub link_type: LinkKind,
}

/// A parsed note as handed to the analysis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEntry {
    pub path: String,
    pub title: String,
    pub tags: Vec<String>,
    pub links: Vec<NoteLink>,
    pub modified: Option<DateTime<Utc>>,
    pub frontmatter: Option<serde_json::Value>,
}

impl NoteEntry {
    /// Create an entry with a normalized path and a title derived from it
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = normalize_note_path(path.as_ref());
        let title = title_from_path(&path);
        Self {
            path,
            title,
            tags: Vec::new(),
            links: Vec::new(),
            modified: None,
            frontmatter: None,
        }
    }

    /// Add plain links to the given targets
    pub fn with_links<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links
            .extend(targets.into_iter().map(|t| NoteLink::new(t)));
        self
    }

    /// Add a single link with flags
    pub fn with_link(mut self, link: NoteLink) -> Self {
        self.links.push(link);
        self
    }

    /// Set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set modification time
    pub fn modified_at(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether the note carries `tag` (case-insensitive, leading `#` ignored)
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|t| normalize_tag(t) == wanted)
    }
}

/// Append `.md` unless the path already ends with it.
pub fn add_md_suffix(path: &str) -> String {
    if path.to_ascii_lowercase().ends_with(".md") {
        path.to_string()
    } else {
        format!("{}.md", path)
    }
}

/// Strip a trailing `.md`.
pub fn remove_md_suffix(path: &str) -> &str {
    if path.to_ascii_lowercase().ends_with(".md") {
        &path[..path.len() - 3]
    } else {
        path
    }
}

/// Normalize a vault-relative note path.
///
/// Backslashes become `/`, leading `./` and `/` are dropped, `.` segments and
/// empty segments are removed, `..` pops, and `.md` is appended.
pub fn normalize_note_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return String::new();
    }
    add_md_suffix(&parts.join("/"))
}

/// Lowercase a tag and strip a leading `#`.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

/// Title derived from the file name without `.md`.
pub fn title_from_path(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    remove_md_suffix(base).to_string()
}
