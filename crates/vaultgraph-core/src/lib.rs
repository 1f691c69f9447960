//! # VaultGraph Core
//!
//! Core data models, analysis options, note-selection patterns and error
//! types for the vault link-graph analytics engine. Every other crate in the
//! workspace depends on the types defined here.
//!
//! ## Architecture Principles
//!
//! - **Zero Panic in Libraries**: All errors are `Result<T, Error>`
//! - **Builder Pattern for Options**: [`AnalysisOptions`] is validated on `build()`
//! - **Immutable Inputs**: a snapshot of [`NoteEntry`] values is read, never mutated
//!
//! ## Core Modules
//!
//! - [`models`] - Note snapshot types and path normalization
//! - [`config`] - Analysis options, HITS limits and recency policy
//! - [`patterns`] - Note-selection terms and boolean pattern expressions
//! - [`source`] - The [`NoteSource`] loader interface
//! - [`error`] - Error type and `Result` alias
//!
//! ## Usage
//!
//! ```
//! use vaultgraph_core::prelude::*;
//!
//! let options = AnalysisOptions::builder()
//!     .min_degree(0)
//!     .exclude("templates")
//!     .build()
//!     .unwrap();
//! assert!(!options.mutual_only);
//!
//! let notes = vec![NoteEntry::new("a").with_links(["b"]), NoteEntry::new("b")];
//! assert_eq!(notes.load_notes().unwrap().len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod patterns;
pub mod source;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;
pub use patterns::{NotePattern, NoteView, PatternExpr, PatternSet};
pub use source::NoteSource;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        AnalysisOptions, AnalysisOptionsBuilder, HitsConfig, RecencyCascade, RecencyPolicy,
    };
    pub use crate::error::{Error, Result};
    pub use crate::models::{Backlink, LinkKind, NoteEntry, NoteLink, normalize_note_path};
    pub use crate::patterns::{NotePattern, NoteView, PatternExpr, PatternSet};
    pub use crate::source::NoteSource;
}
