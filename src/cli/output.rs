//! Output formatting for the CLI
//!
//! Every printable result can be rendered as JSON, YAML or human-readable
//! text. The structured formats serialize the library types directly.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::pipeline::BuildPlan;
use crate::platform::{DetectionOutcome, PlatformId};
use crate::version::VersionSpecifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

#[derive(Serialize)]
struct Resolution<'a> {
    specifier: &'a VersionSpecifier,
    version: &'a str,
}

#[derive(Serialize)]
struct PlatformEntry {
    name: &'static str,
    display_name: &'static str,
    priority: usize,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn structured<T: Serialize>(&self, value: &T, what: &str) -> Result<Option<String>> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map(Some)
                .with_context(|| format!("Failed to serialize {} to JSON", what)),
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .map(Some)
                .with_context(|| format!("Failed to serialize {} to YAML", what)),
            OutputFormat::Human => Ok(None),
        }
    }

    pub fn format_detection(&self, outcome: &DetectionOutcome) -> Result<String> {
        if let Some(output) = self.structured(outcome, "detection outcome")? {
            return Ok(output);
        }

        let mut out = String::new();
        for (index, result) in outcome.results.iter().enumerate() {
            let role = if index == 0 { "primary" } else { "secondary" };
            let _ = writeln!(
                out,
                "{} ({}) - version: {}",
                result.platform.display_name(),
                role,
                result.detected_version.as_deref().unwrap_or("unspecified")
            );
            for (key, value) in &result.attributes {
                let _ = writeln!(out, "  {}: {}", key, value);
            }
        }
        if !outcome.shadowed.is_empty() {
            let names: Vec<&str> = outcome.shadowed.iter().map(|p| p.display_name()).collect();
            let _ = writeln!(out, "Also matched (not built): {}", names.join(", "));
        }
        Ok(out)
    }

    pub fn format_plan(&self, plan: &BuildPlan) -> Result<String> {
        if let Some(output) = self.structured(plan, "build plan")? {
            return Ok(output);
        }
        Ok(plan.script.text.clone())
    }

    pub fn format_resolution(&self, specifier: &VersionSpecifier, version: &str) -> Result<String> {
        let resolution = Resolution { specifier, version };
        if let Some(output) = self.structured(&resolution, "resolved version")? {
            return Ok(output);
        }
        Ok(format!("{}\n", version))
    }

    pub fn format_platforms(&self, platforms: &[PlatformId]) -> Result<String> {
        let entries: Vec<PlatformEntry> = platforms
            .iter()
            .map(|p| PlatformEntry {
                name: p.name(),
                display_name: p.display_name(),
                priority: p.priority(),
            })
            .collect();
        if let Some(output) = self.structured(&entries, "platform list")? {
            return Ok(output);
        }

        let mut out = String::new();
        for entry in entries {
            let _ = writeln!(out, "{:<8} {}", entry.name, entry.display_name);
        }
        Ok(out)
    }
}
