//! Filesystem loader producing a note snapshot from a vault directory

use crate::dates::resolve_content_time;
use crate::parse::{ParsedNote, parse_note};
use crate::resolve::LinkResolver;
use crate::settings::VaultSettings;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::instrument;
use vaultgraph_core::prelude::*;
use walkdir::{DirEntry, WalkDir};

/// Loads every markdown note under a vault root.
///
/// Hidden entries are skipped, as is anything matched by the vault's
/// persisted `graphIgnore` list or by caller-supplied ignore patterns.
/// Link targets are resolved against the loaded notes; unresolved links
/// are dropped. Any walk or read failure aborts the load.
#[derive(Debug, Clone)]
pub struct VaultScanner {
    root: PathBuf,
    ignore: Vec<String>,
    use_settings: bool,
    content_times: bool,
    reference_time: Option<DateTime<Utc>>,
}

impl VaultScanner {
    /// Create a scanner for the vault at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: Vec::new(),
            use_settings: true,
            content_times: true,
            reference_time: None,
        }
    }

    /// Vault root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add ignore patterns on top of the persisted list
    pub fn with_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Do not read `.vaultgraph/config.json`
    pub fn without_settings(mut self) -> Self {
        self.use_settings = false;
        self
    }

    /// Take note times from content (frontmatter, file name, headings)
    /// before falling back to the file's mtime. Enabled by default.
    pub fn content_times(mut self, enabled: bool) -> Self {
        self.content_times = enabled;
        self
    }

    /// Time used to judge and clamp content dates. Defaults to now.
    pub fn reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// Persisted and caller-supplied ignore patterns, compiled
    pub fn ignore_patterns(&self) -> Result<PatternSet> {
        let mut raw = Vec::new();
        if self.use_settings {
            raw.extend(VaultSettings::load(&self.root)?.graph_ignore);
        }
        raw.extend(self.ignore.iter().cloned());
        PatternSet::compile(&raw)
    }

    /// Vault-relative paths of all markdown files not ignored by path
    #[instrument(skip(self), name = "vault_scan")]
    pub fn scan_files(&self) -> Result<Vec<String>> {
        self.check_root()?;
        let ignore = self.ignore_patterns()?;
        self.walk(&ignore)
    }

    fn check_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::vault_not_found(&self.root));
        }
        Ok(())
    }

    fn walk(&self, ignore: &PatternSet) -> Result<Vec<String>> {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.skips(entry, ignore));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(self.root.as_path()).display().to_string();
                Error::load_failed(format!("failed to walk {}: {}", at, e))
            })?;
            if is_note_file(&entry)
                && let Some(rel) = self.relative(entry.path())
            {
                files.push(rel);
            }
        }

        log::debug!("Found {} markdown files in {:?}", files.len(), self.root);
        Ok(files)
    }

    fn skips(&self, entry: &DirEntry, ignore: &PatternSet) -> bool {
        if is_hidden(entry) {
            return true;
        }
        let Some(rel) = self.relative(entry.path()) else {
            return false;
        };
        if entry.file_type().is_dir() {
            ignore.prunes_dir(&rel)
        } else {
            ignore.matches_path(&rel)
        }
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let rel = rel.to_string_lossy().replace('\\', "/");
        (!rel.is_empty()).then_some(rel)
    }

    /// Read and parse one note. Invalid UTF-8 is replaced, not rejected.
    fn read_note(
        &self,
        rel: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, ParsedNote, Option<DateTime<Utc>>)> {
        let full = self.root.join(rel);
        let bytes = std::fs::read(&full)
            .map_err(|e| Error::load_failed(format!("failed to read {}: {}", rel, e)))?;
        let content = String::from_utf8_lossy(&bytes);

        let path = normalize_note_path(rel);
        let note = parse_note(&path, &content);

        let mtime = std::fs::metadata(&full)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        let content_time = if self.content_times {
            resolve_content_time(&path, note.frontmatter.as_ref(), &note.body, now)
        } else {
            None
        };

        Ok((path, note, content_time.or(mtime)))
    }
}

impl NoteSource for VaultScanner {
    #[instrument(skip(self), fields(root = ?self.root), name = "vault_load")]
    fn load_notes(&self) -> Result<Vec<NoteEntry>> {
        self.check_root()?;
        let now = self.reference_time.unwrap_or_else(Utc::now);
        let ignore = self.ignore_patterns()?;
        let files = self.walk(&ignore)?;

        let mut parsed = Vec::with_capacity(files.len());
        for rel in &files {
            let (path, note, modified) = self.read_note(rel, now)?;
            let view = NoteView {
                path: &path,
                tags: &note.tags,
                frontmatter: note.frontmatter.as_ref(),
            };
            if ignore.needs_content() && ignore.matches(&view) {
                log::debug!("Ignoring {} by tag or property", path);
                continue;
            }
            parsed.push((path, note, modified));
        }

        let resolver = LinkResolver::new(parsed.iter().map(|(path, _, _)| path.clone()));
        let mut dropped = 0usize;

        let entries: Vec<NoteEntry> = parsed
            .into_iter()
            .map(|(path, note, modified)| {
                let links = note
                    .links
                    .iter()
                    .filter_map(|raw| {
                        let Some(target) = resolver.resolve(&raw.target) else {
                            dropped += 1;
                            return None;
                        };
                        let mut link = NoteLink::new(target).with_kind(raw.kind);
                        link.has_anchor = raw.has_anchor;
                        link.is_embed = raw.is_embed;
                        Some(link)
                    })
                    .collect();

                NoteEntry {
                    path,
                    title: note.title,
                    tags: note.tags,
                    links,
                    modified,
                    frontmatter: note.frontmatter,
                }
            })
            .collect();

        log::info!(
            "Loaded {} notes from {:?} ({} unresolved links dropped)",
            entries.len(),
            self.root,
            dropped
        );
        Ok(entries)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Regular markdown files, plus symlinks that do not point at a directory
fn is_note_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    let candidate =
        file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());
    candidate && is_markdown(entry.path())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
