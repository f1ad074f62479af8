//! Output formatting for multiple formats
//!
//! Rendered manifests and configuration can be printed as JSON, YAML,
//! human-readable text, or (for manifests) the raw build file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::ImageScriptConfig;
use crate::image::{ImageBuilder, ImageReference, Manifest};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
    /// The build file exactly as it would be written
    Dockerfile,
}

/// Everything `render` knows about an image before it is built
#[derive(Debug, Clone, Serialize)]
pub struct ManifestReport {
    pub image: ImageReference,
    pub source: ImageReference,
    pub manifest_path: PathBuf,
    pub build_command: String,
    pub manifest: Manifest,
    pub content: String,
}

impl ManifestReport {
    /// Collects the report from a builder whose source is set
    pub fn from_builder(builder: &ImageBuilder) -> Result<Self> {
        let manifest = builder.preview()?;
        let source = builder
            .source()
            .cloned()
            .context("builder has no source image")?;

        Ok(Self {
            image: builder.reference().clone(),
            source,
            manifest_path: builder.manifest_path(),
            build_command: builder.build_command().to_string(),
            content: manifest.render(),
            manifest,
        })
    }
}

/// Formats reports and configuration for the terminal
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_manifest(&self, report: &ManifestReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize report to YAML")
            }
            OutputFormat::Human => Ok(self.format_manifest_human(report)),
            OutputFormat::Dockerfile => Ok(report.content.clone()),
        }
    }

    /// Formats configuration display
    ///
    /// The `dockerfile` format has no meaning for configuration and falls
    /// back to human-readable text.
    pub fn format_config(&self, config: &ImageScriptConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(config).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human | OutputFormat::Dockerfile => Ok(config.to_string()),
        }
    }

    fn format_manifest_human(&self, report: &ManifestReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("Image: {} ({})\n", report.image, report.image.os()));
        output.push_str(&format!("From: {}\n", report.source));
        output.push_str(&format!("Stages: {}\n", report.manifest.stages.len()));
        output.push_str(&format!("Manifest: {}\n", report.manifest_path.display()));
        output.push_str(&format!("Command: {}\n", report.build_command));
        output.push('\n');
        for line in report.content.lines() {
            output.push_str("  ");
            output.push_str(line);
            output.push('\n');
        }

        output
    }
}
