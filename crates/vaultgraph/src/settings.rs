//! Layered run settings.
//!
//! Precedence, lowest first: built-in defaults, an optional settings file
//! (TOML, JSON or YAML by extension), `VAULTGRAPH_*` environment variables,
//! then command-line flags applied by the caller.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vaultgraph_core::prelude::*;
use vaultgraph_reports::limits::DEFAULT_LIMIT;
use vaultgraph_vault::VaultScanner;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "VAULTGRAPH";

/// Keys whose environment values are comma-separated lists
const LIST_KEYS: &[&str] = &["include", "exclude", "ignore"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Vault root; `~` and `$VARS` are expanded
    pub vault: Option<PathBuf>,
    pub min_degree: usize,
    pub mutual_only: bool,
    pub skip_anchors: bool,
    pub skip_embeds: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Ignore patterns added to the vault's persisted list
    pub ignore: Vec<String>,
    /// Unset keeps the engine default
    pub recency_cascade: Option<bool>,
    pub include_singleton_communities: bool,
    /// Derive note times from content before file mtimes
    pub content_times: bool,
    /// Report rows per section
    pub limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = AnalysisOptions::default();
        Self {
            vault: None,
            min_degree: engine.min_degree,
            mutual_only: engine.mutual_only,
            skip_anchors: engine.skip_anchors,
            skip_embeds: engine.skip_embeds,
            include: Vec::new(),
            exclude: Vec::new(),
            ignore: Vec::new(),
            recency_cascade: None,
            include_singleton_communities: engine.include_singleton_communities,
            content_times: true,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Settings {
    /// Defaults, then `file`, then the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_layered(file, None)
    }

    /// Like [`Settings::load`] with an explicit environment map instead of the
    /// process environment
    pub fn load_layered(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            if !path.is_file() {
                return Err(Error::config_error(format!(
                    "settings file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment.source(env));

        let settings: Settings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| Error::config_error(e.to_string()))?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Vault root with `~` and environment variables expanded
    pub fn vault_path(&self) -> Result<PathBuf> {
        let raw = self.vault.as_ref().ok_or_else(|| {
            Error::config_error(format!(
                "no vault given; pass --vault or set {}_VAULT",
                ENV_PREFIX
            ))
        })?;
        expand_path(raw)
    }

    /// Engine options for these settings
    pub fn analysis_options(&self, include_tags: bool) -> Result<AnalysisOptions> {
        AnalysisOptions::builder()
            .min_degree(self.min_degree)
            .mutual_only(self.mutual_only)
            .skip_anchors(self.skip_anchors)
            .skip_embeds(self.skip_embeds)
            .include_tags(include_tags)
            .include_singleton_communities(self.include_singleton_communities)
            .recency_cascade(RecencyCascade::from(self.recency_cascade))
            .include_patterns(self.include.clone())
            .exclude_patterns(self.exclude.clone())
            .build()
    }

    /// Loader for `root` honoring the ignore and content-time settings
    pub fn scanner(&self, root: &Path) -> VaultScanner {
        VaultScanner::new(root)
            .with_ignore(self.ignore.iter().cloned())
            .content_times(self.content_times)
    }
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| Error::config_error("vault path contains invalid UTF-8"))?;
    let expanded = shellexpand::full(raw)
        .map_err(|e| Error::config_error(format!("failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
