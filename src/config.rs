use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_PATH_ENV;
use crate::domain::MoneyKind;
use crate::error::{CleanerError, Result};
use crate::pipeline::processing::dedup::DedupConfig;
use crate::pipeline::processing::enrich::EnrichConfig;
use crate::pipeline::processing::normalize::rules::PatternOverrides;
use crate::pipeline::processing::normalize::MoneyRanges;
use crate::pipeline::processing::quality_gate::noise::NoiseConfig;
use crate::pipeline::processing::quality_gate::QualityConfig;

/// Cleaner configuration. Every section is optional; missing keys fall back
/// to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub ranges: MoneyRanges,
    pub patterns: PatternOverrides,
    pub noise: NoiseConfig,
    pub quality: QualityConfig,
    pub dedup: DedupConfig,
    pub enrich: EnrichConfig,
}

impl CleanerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CleanerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path first, then `LISTING_CLEANER_CONFIG`, then defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit.map(Path::to_path_buf).or_else(|| {
            std::env::var(CONFIG_PATH_ENV)
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
        })
    }

    pub fn validate(&self) -> Result<()> {
        for kind in MoneyKind::ALL {
            let range = self.ranges.for_kind(kind);
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(CleanerError::Config(format!(
                    "{} range must satisfy min <= max (got {} to {})",
                    kind, range.min, range.max
                )));
            }
            if let Some(rules) = self.patterns.for_kind(kind) {
                if rules.is_empty() {
                    return Err(CleanerError::Config(format!(
                        "{} pattern list is empty; omit it to use the built-in rules",
                        kind
                    )));
                }
            }
        }

        if self.dedup.keys.is_empty() {
            return Err(CleanerError::Config(
                "dedup.keys must name at least one key".to_string(),
            ));
        }
        if self.dedup.name_prefix_len == 0 {
            return Err(CleanerError::Config(
                "dedup.name_prefix_len must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.quality.min_quality_score) {
            return Err(CleanerError::Config(
                "quality.min_quality_score must be between 0 and 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::dedup::{DedupKeyKind, KeepPolicy};
    use crate::pipeline::processing::quality_gate::NoisePolicy;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CleanerConfig::from_toml_str("").unwrap();
        assert_eq!(config, CleanerConfig::default());
        assert_eq!(config.ranges.profit.max, 10_000_000.0);
    }

    #[test]
    fn test_partial_sections() {
        let config = CleanerConfig::from_toml_str(
            r#"
            [ranges.price]
            min = 5000
            max = 50000000

            [dedup]
            keys = ["name"]
            keep = "last"

            [quality]
            noise_policy = "flag"

            [[patterns.revenue]]
            name = "turnover"
            pattern = 'turnover\s*:?\s*\$?{amount}'
            "#,
        )
        .unwrap();

        assert_eq!(config.ranges.price.min, 5_000.0);
        assert_eq!(config.ranges.revenue.min, 1_000.0);
        assert_eq!(config.dedup.keys, vec![DedupKeyKind::Name]);
        assert_eq!(config.dedup.keep, KeepPolicy::Last);
        assert_eq!(config.dedup.name_prefix_len, 50);
        assert_eq!(config.quality.noise_policy, NoisePolicy::Flag);
        assert_eq!(config.patterns.revenue.as_ref().map(|r| r.len()), Some(1));
        assert!(config.patterns.price.is_none());
    }

    #[test]
    fn test_validation_rejects_inverted_range() {
        let err = CleanerConfig::from_toml_str(
            r#"
            [ranges.profit]
            min = 100
            max = 10
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }

    #[test]
    fn test_validation_rejects_empty_key_list() {
        assert!(CleanerConfig::from_toml_str("[dedup]\nkeys = []").is_err());
        assert!(CleanerConfig::from_toml_str("[dedup]\nname_prefix_len = 0").is_err());
    }

    #[test]
    fn test_unknown_enum_value_is_a_toml_error() {
        let err = CleanerConfig::from_toml_str("[dedup]\nkeep = \"middle\"").unwrap_err();
        assert!(matches!(err, CleanerError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = CleanerConfig::load("/nonexistent/listing_cleaner.toml").unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }
}
