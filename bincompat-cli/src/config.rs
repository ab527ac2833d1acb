//! bincompat configuration loading from `.bincompat.toml`.
//!
//! Configuration is optional; every section falls back to defaults when the
//! file is missing or cannot be parsed.
//!
//! # Example Configuration
//!
//! ```toml
//! [queries]
//! preset = "public"
//! methods = ["public * *(*)", "protected virtual * *(*)"]
//!
//! [scan]
//! extensions = ["json"]
//! skip = [".XmlSerializers.json"]
//! recursive = true
//!
//! [output]
//! format = "table"
//! color = true
//! ```

use anyhow::Context;
use bincompat_core::scanner::ScanOptions;
use bincompat_core::{QueryAggregator, TypeQueryMode};
use serde::Deserialize;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".bincompat.toml";

/// Root configuration structure loaded from `.bincompat.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct BincompatConfig {
    /// Which part of a module counts as API surface.
    #[serde(default)]
    pub queries: QueriesConfig,

    /// Module file discovery.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Built-in query sets.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryPreset {
    /// Public and protected members of public types
    #[default]
    Public,
    /// Adds internal types and members
    External,
}

/// Query configuration.
///
/// A non-empty list replaces the preset's queries for that member kind only.
#[derive(Debug, Deserialize, Default)]
pub struct QueriesConfig {
    #[serde(default)]
    pub preset: QueryPreset,

    /// Type query lists, each `;`-separated (`"public MyCompany.*; class Other.Type"`).
    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub methods: Vec<String>,

    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default)]
    pub events: Vec<String>,
}

/// Scanner configuration controlling which files are compared.
#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Module file extensions, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// File name suffixes never compared (serializer modules).
    #[serde(default = "default_skip")]
    pub skip: Vec<String>,

    /// Descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,
}

fn default_extensions() -> Vec<String> {
    ScanOptions::default().extensions
}

fn default_skip() -> Vec<String> {
    ScanOptions::default().skip_suffixes
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip: default_skip(),
            recursive: false,
        }
    }
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Valid values: `table`, `json`
    #[serde(default)]
    pub format: Option<String>,

    /// Force colored output on or off.
    #[serde(default)]
    pub color: Option<bool>,
}

impl BincompatConfig {
    /// Load `.bincompat.toml` from `root`, or defaults when absent or invalid.
    pub fn load(root: &Path) -> Self {
        Self::load_file(&root.join(CONFIG_FILE))
    }

    /// Load an explicit config file, or defaults when absent or invalid.
    pub fn load_file(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", config_path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Build the query aggregator: the preset, with configured lists replacing
    /// whole member kinds.
    pub fn aggregator(&self) -> anyhow::Result<QueryAggregator> {
        let queries = &self.queries;
        let mut aggregator = match queries.preset {
            QueryPreset::Public => QueryAggregator::public_api(),
            QueryPreset::External => QueryAggregator::externally_visible(),
        };

        if !queries.types.is_empty() {
            aggregator.type_queries.clear();
            for list in &queries.types {
                aggregator
                    .add_type_queries(list, TypeQueryMode::API_RELEVANT)
                    .with_context(|| format!("in [queries].types of {}", CONFIG_FILE))?;
            }
        }
        if !queries.methods.is_empty() {
            aggregator.method_queries.clear();
            for query in &queries.methods {
                aggregator
                    .add_method_query(query)
                    .with_context(|| format!("in [queries].methods of {}", CONFIG_FILE))?;
            }
        }
        if !queries.fields.is_empty() {
            aggregator.field_queries.clear();
            for query in &queries.fields {
                aggregator
                    .add_field_query(query)
                    .with_context(|| format!("in [queries].fields of {}", CONFIG_FILE))?;
            }
        }
        if !queries.events.is_empty() {
            aggregator.event_queries.clear();
            for query in &queries.events {
                aggregator
                    .add_event_query(query)
                    .with_context(|| format!("in [queries].events of {}", CONFIG_FILE))?;
            }
        }
        Ok(aggregator)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extensions: self.scan.extensions.clone(),
            skip_suffixes: self.scan.skip.clone(),
            recursive: self.scan.recursive,
        }
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}
