//! Output formats and the shared rendering trait

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use vaultgraph_core::{Error, Result};
use vaultgraph_graph::GraphTimingsMillis;

/// How a report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Plain text for terminals
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: json, text",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// A report renderable in every [`OutputFormat`]
pub trait Report: Serialize {
    /// Plain text rendering
    fn render_text(&self) -> String;

    /// Render in the requested format
    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("failed to encode report: {}", e))),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }
}

/// Text block listing phase timings
pub fn render_timings(timings: &GraphTimingsMillis) -> String {
    format!(
        "Timings:\n  load:    {} ms\n  build:   {} ms\n  hits:    {} ms\n  label:   {} ms\n  recency: {} ms\n  total:   {} ms\n",
        timings.load_ms,
        timings.build_ms,
        timings.hits_ms,
        timings.label_propagation_ms,
        timings.recency_ms,
        timings.total_ms
    )
}

pub(crate) fn tag_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" tags:{}", tags.join(","))
    }
}
