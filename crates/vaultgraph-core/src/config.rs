//! Analysis options.
//!
//! One immutable [`AnalysisOptions`] value is handed to the analyzer per run.
//! Follows a builder pattern with validation on `build()`.

use crate::error::{Error, Result};
use crate::patterns::PatternSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether freshness propagates across links.
///
/// Distinguishes "never configured" from an explicit choice so callers can
/// layer settings without losing the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyCascade {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl RecencyCascade {
    /// Unset resolves to enabled
    pub fn is_enabled(self) -> bool {
        !matches!(self, RecencyCascade::Disabled)
    }

    /// Keep `self` unless it is unset
    pub fn or(self, other: RecencyCascade) -> RecencyCascade {
        match self {
            RecencyCascade::Unset => other,
            explicit => explicit,
        }
    }
}

impl From<bool> for RecencyCascade {
    fn from(enabled: bool) -> Self {
        if enabled {
            RecencyCascade::Enabled
        } else {
            RecencyCascade::Disabled
        }
    }
}

impl From<Option<bool>> for RecencyCascade {
    fn from(value: Option<bool>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// HITS iteration limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitsConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for HitsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-9,
        }
    }
}

/// Recency window and cascade decay.
///
/// Freshness travels at most `cascade_passes` hops and each hop ages the
/// propagated time by `hop_offset_days`. Only neighbors whose time lies
/// within `fresh_window_days` of the reference time propagate, and at most
/// `neighbor_sample_limit` of the freshest ones are considered per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyPolicy {
    pub window_days: i64,
    pub fresh_window_days: i64,
    pub hop_offset_days: i64,
    pub neighbor_sample_limit: usize,
    pub cascade_passes: usize,
}

impl Default for RecencyPolicy {
    fn default() -> Self {
        Self {
            window_days: 30,
            fresh_window_days: 180,
            hop_offset_days: 7,
            neighbor_sample_limit: 5,
            cascade_passes: 2,
        }
    }
}

/// Options for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Drop links carrying an anchor (`[[Note#Section]]`)
    pub skip_anchors: bool,
    /// Drop embeds (`![[Note]]`)
    pub skip_embeds: bool,
    /// Minimum in+out degree for a node to survive (0 disables)
    pub min_degree: usize,
    /// Keep only reciprocated edges
    pub mutual_only: bool,
    /// Carry tags into nodes and community summaries
    pub include_tags: bool,
    pub recency_cascade: RecencyCascade,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub hits: HitsConfig,
    pub recency: RecencyPolicy,
    pub max_label_rounds: usize,
    pub top_tags_limit: usize,
    pub top_authority_limit: usize,
    /// Report size-1 communities (otherwise their node has no community)
    pub include_singleton_communities: bool,
    /// "Now" for recency computations; current time when absent
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            skip_anchors: false,
            skip_embeds: false,
            min_degree: 2,
            mutual_only: false,
            include_tags: true,
            recency_cascade: RecencyCascade::Unset,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            hits: HitsConfig::default(),
            recency: RecencyPolicy::default(),
            max_label_rounds: 20,
            top_tags_limit: 5,
            top_authority_limit: 5,
            include_singleton_communities: true,
            reference_time: None,
        }
    }
}

impl AnalysisOptions {
    /// Create options with builder
    pub fn builder() -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder::new()
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.max_label_rounds == 0 {
            return Err(Error::config_error("max_label_rounds must be at least 1"));
        }
        if self.hits.max_iterations == 0 {
            return Err(Error::config_error("hits.max_iterations must be at least 1"));
        }
        if !(self.hits.tolerance.is_finite() && self.hits.tolerance > 0.0) {
            return Err(Error::config_error(format!(
                "hits.tolerance must be a positive finite number, got {}",
                self.hits.tolerance
            )));
        }
        if self.recency.window_days <= 0 {
            return Err(Error::config_error("recency.window_days must be positive"));
        }
        if self.recency.fresh_window_days < 0 || self.recency.hop_offset_days < 0 {
            return Err(Error::config_error(
                "recency windows and hop offsets cannot be negative",
            ));
        }
        self.compile_patterns()?;
        Ok(())
    }

    /// Compile include and exclude patterns
    pub fn compile_patterns(&self) -> Result<(PatternSet, PatternSet)> {
        let include = PatternSet::compile(&self.include_patterns)?;
        let exclude = PatternSet::compile(&self.exclude_patterns)?;
        Ok((include, exclude))
    }

    /// Reference time, or now
    pub fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

/// Builder for AnalysisOptions
#[derive(Debug, Default)]
pub struct AnalysisOptionsBuilder {
    options: AnalysisOptions,
}

impl AnalysisOptionsBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_anchors(mut self, skip: bool) -> Self {
        self.options.skip_anchors = skip;
        self
    }

    pub fn skip_embeds(mut self, skip: bool) -> Self {
        self.options.skip_embeds = skip;
        self
    }

    pub fn min_degree(mut self, min_degree: usize) -> Self {
        self.options.min_degree = min_degree;
        self
    }

    pub fn mutual_only(mut self, mutual_only: bool) -> Self {
        self.options.mutual_only = mutual_only;
        self
    }

    pub fn include_tags(mut self, include: bool) -> Self {
        self.options.include_tags = include;
        self
    }

    pub fn recency_cascade(mut self, cascade: impl Into<RecencyCascade>) -> Self {
        self.options.recency_cascade = cascade.into();
        self
    }

    /// Add an include pattern
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.options.include_patterns.push(pattern.into());
        self
    }

    /// Add an exclude pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.options.exclude_patterns.push(pattern.into());
        self
    }

    pub fn include_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .include_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn hits(mut self, hits: HitsConfig) -> Self {
        self.options.hits = hits;
        self
    }

    pub fn recency(mut self, recency: RecencyPolicy) -> Self {
        self.options.recency = recency;
        self
    }

    pub fn max_label_rounds(mut self, rounds: usize) -> Self {
        self.options.max_label_rounds = rounds;
        self
    }

    pub fn top_tags_limit(mut self, limit: usize) -> Self {
        self.options.top_tags_limit = limit;
        self
    }

    pub fn top_authority_limit(mut self, limit: usize) -> Self {
        self.options.top_authority_limit = limit;
        self
    }

    pub fn include_singleton_communities(mut self, include: bool) -> Self {
        self.options.include_singleton_communities = include;
        self
    }

    pub fn reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.options.reference_time = Some(now);
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<AnalysisOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
