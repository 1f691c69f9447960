//! Error types for VaultGraph.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! This keeps error handling composable across crates.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all VaultGraph operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Vault root missing or not a directory
    #[error("Vault not found: {path}")]
    VaultNotFound { path: PathBuf },

    /// The note loader could not produce a snapshot
    #[error("Failed to load notes: {reason}")]
    LoadFailed { reason: String },

    /// A note-selection pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Parse error (frontmatter, settings files)
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Neither a community id nor a note path in the graph
    #[error(
        "community {query} not found and file {query} not in graph \
         (use vault-relative paths, ensure it exists, and check include/exclude/min-degree filters)"
    )]
    CommunityNotFound { query: String },

    /// Note absent from the analyzed graph
    #[error("{path} not found in graph (filtered out by include/exclude patterns or min-degree?)")]
    NoteNotInGraph { path: String },

    /// Note present in the graph but without a community
    #[error("file {path} is not assigned to a community under current filters")]
    NotAssigned { path: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a vault not found error
    pub fn vault_not_found(path: impl Into<PathBuf>) -> Self {
        Error::VaultNotFound { path: path.into() }
    }

    /// Create a load failure
    pub fn load_failed(reason: impl Into<String>) -> Self {
        Error::LoadFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a community lookup error
    pub fn community_not_found(query: impl Into<String>) -> Self {
        Error::CommunityNotFound {
            query: query.into(),
        }
    }

    /// Create a note lookup error
    pub fn note_not_in_graph(path: impl Into<String>) -> Self {
        Error::NoteNotInGraph { path: path.into() }
    }

    /// Create a missing-community error
    pub fn not_assigned(path: impl Into<String>) -> Self {
        Error::NotAssigned { path: path.into() }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
