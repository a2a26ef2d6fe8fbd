use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tier assigned to anything no configured pattern matches.
pub const DEFAULT_TIER: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTier {
    pub tier: u8,
    /// Lower-cased substrings matched against a link's host or the source name.
    pub patterns: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub tiers: Vec<SourceTier>,
}

impl SourcesFile {
    /// Tier for an item, best (lowest) tier wins when several patterns match.
    ///
    /// `host` is the link's host and `source` the publisher name; both are
    /// matched case-insensitively.
    #[must_use]
    pub fn tier_for(&self, host: &str, source: &str) -> u8 {
        let host = host.to_lowercase();
        let source = source.to_lowercase();
        self.tiers
            .iter()
            .filter(|t| {
                t.patterns.iter().any(|p| {
                    let p = p.to_lowercase();
                    host.contains(&p) || (!source.is_empty() && source.contains(&p))
                })
            })
            .map(|t| t.tier)
            .min()
            .unwrap_or(DEFAULT_TIER)
    }
}

/// Load and validate the source-tier table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate source tiers from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&sources)?;
    Ok(sources)
}

fn validate_sources(sources: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_patterns = HashSet::new();

    for entry in &sources.tiers {
        if ![1, 2, 3].contains(&entry.tier) {
            return Err(ConfigError::Validation(format!(
                "invalid tier {}; must be 1, 2, or 3",
                entry.tier
            )));
        }

        if entry.patterns.is_empty() {
            return Err(ConfigError::Validation(format!(
                "tier {} has no patterns",
                entry.tier
            )));
        }

        for pattern in &entry.patterns {
            if pattern.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "tier {} contains an empty pattern",
                    entry.tier
                )));
            }
            if !seen_patterns.insert(pattern.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate pattern: '{pattern}'"
                )));
            }
        }
    }

    Ok(())
}
