//! # VaultGraph Vault
//!
//! Filesystem loader for markdown vaults. [`VaultScanner`] walks a vault
//! directory and implements [`NoteSource`](vaultgraph_core::NoteSource), so its
//! output feeds the analysis engine directly.
//!
//! Per note it extracts:
//! - YAML frontmatter, converted to JSON
//! - title (frontmatter `title`, else the file stem)
//! - tags from frontmatter and inline `#tags`, lowercased and deduplicated
//! - wikilinks and embeds, flagged for anchors and embeds and typed by `LinkKind`
//! - an activity time from content dates, else the file mtime
//!
//! ## Example
//!
//! ```no_run
//! use vaultgraph_core::NoteSource;
//! use vaultgraph_vault::VaultScanner;
//!
//! let notes = VaultScanner::new("/path/to/vault")
//!     .with_ignore(["templates", "tag:draft"])
//!     .load_notes()
//!     .unwrap();
//! println!("{} notes", notes.len());
//! ```

pub mod dates;
pub mod parse;
pub mod resolve;
pub mod scanner;
pub mod settings;

pub use dates::resolve_content_time;
pub use parse::{ParsedNote, RawLink, parse_note};
pub use resolve::LinkResolver;
pub use scanner::VaultScanner;
pub use settings::VaultSettings;
