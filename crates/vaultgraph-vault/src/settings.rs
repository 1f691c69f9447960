//! Per-vault settings persisted inside the vault.
//!
//! Only read here; the file is `.vaultgraph/config.json` relative to the vault root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vaultgraph_core::prelude::*;

/// Directory holding per-vault settings
pub const SETTINGS_DIR: &str = ".vaultgraph";

/// Settings file name inside [`SETTINGS_DIR`]
pub const SETTINGS_FILE: &str = "config.json";

/// Persisted vault settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSettings {
    /// Patterns excluded from every scan of this vault
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graph_ignore: Vec<String>,
}

impl VaultSettings {
    /// Location of the settings file for a vault root
    pub fn path(root: &Path) -> PathBuf {
        root.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    /// Load settings for `root`. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw)
            .map_err(|e| Error::parse_error(format!("{}: {}", path.display(), e)))
    }
}
