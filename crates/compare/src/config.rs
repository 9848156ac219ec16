//! Comparison settings via a TOML file
//!
//! Every key is optional; missing keys keep the built-in defaults. Command
//! line flags are applied on top of the file by the caller.

use crate::options::CompareOptions;
use crate::tolerance::Tolerance;
use sage_core::{Error, FieldId, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Comparison settings loaded from a TOML file.
///
/// # Example
///
/// ```toml
/// exclude = ["SAGEHaloIndex", "SAGETreeIndex"]
/// rtol = 1e-5
/// atol = 0.0
/// sort_keys = ["SimulationHaloIndex"]
/// fail_fast = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    /// Field names to skip
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Relative tolerance for float fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtol: Option<f64>,
    /// Absolute tolerance for float fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atol: Option<f64>,
    /// Alignment sort keys; an empty list keeps file order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_keys: Option<Vec<String>>,
    /// Record every offending record, not just the first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_all: Option<bool>,
    /// Stop at the first mismatching tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,
    /// Cap on recorded indices per field and tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_report_entries: Option<usize>,
    /// Compare trees in parallel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl CompareConfig {
    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# sagediff comparison settings
#
# Fields to skip, by producer name (case-insensitive).
# exclude = ["SAGEHaloIndex", "SAGETreeIndex"]

# Float fields match when |a - b| <= atol + rtol * max(|a|, |b|).
rtol = 1e-6
atol = 0.0

# Records of a tree are stably sorted by these fields before comparison.
# An empty list compares in file order.
sort_keys = ["SimulationHaloIndex"]

# Record every offending record of a field (false: first only).
collect_all = true

# Stop after the first tree with any difference.
fail_fast = false

# At most this many offending records are listed per field and tree.
max_report_entries = 1000

# Compare trees on a thread pool.
parallel = false
"#
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse config from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: CompareConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        // Surface bad field names and tolerances at load time
        config.to_options()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply this config on top of the defaults
    pub fn to_options(&self) -> Result<CompareOptions> {
        self.apply(CompareOptions::default())
    }

    /// Apply the keys present in this config on top of `base`
    pub fn apply(&self, mut base: CompareOptions) -> Result<CompareOptions> {
        base.excluded.extend(parse_fields(&self.exclude)?);
        if self.rtol.is_some() || self.atol.is_some() {
            base.tolerance = Tolerance::new(
                self.rtol.unwrap_or(base.tolerance.rtol),
                self.atol.unwrap_or(base.tolerance.atol),
            )?;
        }
        if let Some(keys) = &self.sort_keys {
            base.sort_keys = parse_fields(keys)?;
        }
        if let Some(v) = self.collect_all {
            base.collect_all = v;
        }
        if let Some(v) = self.fail_fast {
            base.fail_fast = v;
        }
        if let Some(v) = self.max_report_entries {
            base.max_report_entries = v;
        }
        if let Some(v) = self.parallel {
            base.parallel = v;
        }
        Ok(base)
    }
}

/// Resolve field names, failing on the first unknown one
pub fn parse_fields<S: AsRef<str>>(names: &[S]) -> Result<Vec<FieldId>> {
    names.iter().map(|n| n.as_ref().parse::<FieldId>()).collect()
}
