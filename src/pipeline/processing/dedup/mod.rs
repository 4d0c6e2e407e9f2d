//! Collapsing repeated listings.
//!
//! Deduplication runs as an ordered pipeline of key stages: each stage keeps
//! one record per key value and hands the survivors to the next stage. The
//! default is URL first, then name. Order matters: a pair of records merged
//! by URL can no longer collide by name.

pub mod keys;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::ListingRecord;
use crate::error::CleanerError;
pub use keys::{KeyExtractor, NameKey, UrlKey, UrlKeyConfig};

/// Which occurrence of a duplicated key survives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    #[default]
    First,
    Last,
}

impl FromStr for KeepPolicy {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(KeepPolicy::First),
            "last" => Ok(KeepPolicy::Last),
            _ => Err(CleanerError::UnknownKind {
                kind: "keep policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Built-in key extractors selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupKeyKind {
    Url,
    Name,
}

/// Deduplication settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Key stages, applied in order
    pub keys: Vec<DedupKeyKind>,
    pub keep: KeepPolicy,
    /// Characters of the normalized name used as the name key
    pub name_prefix_len: usize,
    pub url: UrlKeyConfig,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            keys: vec![DedupKeyKind::Url, DedupKeyKind::Name],
            keep: KeepPolicy::First,
            name_prefix_len: crate::constants::DEFAULT_NAME_PREFIX_LEN,
            url: UrlKeyConfig::default(),
        }
    }
}

/// Record counts around one key stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub key: String,
    pub before: usize,
    pub after: usize,
}

impl StageReport {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Surviving records plus per-stage counts
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub records: Vec<ListingRecord>,
    pub stages: Vec<StageReport>,
}

impl DedupOutcome {
    pub fn removed(&self) -> usize {
        self.stages.iter().map(StageReport::removed).sum()
    }
}

/// Configured key pipeline
pub struct Deduplicator {
    extractors: Vec<Box<dyn KeyExtractor + Send + Sync>>,
    keep: KeepPolicy,
}

impl Deduplicator {
    pub fn new(extractors: Vec<Box<dyn KeyExtractor + Send + Sync>>, keep: KeepPolicy) -> Self {
        Self { extractors, keep }
    }

    pub fn from_config(config: &DedupConfig) -> Self {
        let extractors = config
            .keys
            .iter()
            .map(|kind| -> Box<dyn KeyExtractor + Send + Sync> {
                match kind {
                    DedupKeyKind::Url => Box::new(UrlKey::new(config.url.clone())),
                    DedupKeyKind::Name => Box::new(NameKey::new(config.name_prefix_len)),
                }
            })
            .collect();
        Self::new(extractors, config.keep)
    }

    /// Same pipeline with a different keep policy
    pub fn with_keep(mut self, keep: KeepPolicy) -> Self {
        self.keep = keep;
        self
    }

    pub fn keep(&self) -> KeepPolicy {
        self.keep
    }

    pub fn deduplicate(&self, records: Vec<ListingRecord>) -> DedupOutcome {
        let extractors: Vec<&dyn KeyExtractor> = self
            .extractors
            .iter()
            .map(|e| e.as_ref() as &dyn KeyExtractor)
            .collect();
        deduplicate(records, &extractors, self.keep)
    }

    /// First non-empty key any stage produces for a record
    pub fn primary_key(&self, record: &ListingRecord) -> Option<String> {
        self.extractors.iter().find_map(|e| e.key(record))
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::from_config(&DedupConfig::default())
    }
}

/// Apply each key stage in order, keeping one record per key value.
///
/// Records without a key value in a stage pass that stage untouched.
/// Survivors keep their relative input order.
pub fn deduplicate(
    records: Vec<ListingRecord>,
    keys: &[&dyn KeyExtractor],
    keep: KeepPolicy,
) -> DedupOutcome {
    let mut records = records;
    let mut stages = Vec::with_capacity(keys.len());

    for extractor in keys {
        let before = records.len();
        records = apply_stage(records, *extractor, keep);
        stages.push(StageReport {
            key: extractor.name().to_string(),
            before,
            after: records.len(),
        });
    }

    DedupOutcome { records, stages }
}

fn apply_stage(
    records: Vec<ListingRecord>,
    extractor: &dyn KeyExtractor,
    keep: KeepPolicy,
) -> Vec<ListingRecord> {
    let keys: Vec<Option<String>> = records.iter().map(|r| extractor.key(r)).collect();

    let mut winners: HashMap<&str, usize> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        let Some(key) = key else { continue };
        match keep {
            KeepPolicy::First => {
                winners.entry(key.as_str()).or_insert(idx);
            }
            KeepPolicy::Last => {
                winners.insert(key.as_str(), idx);
            }
        }
    }

    records
        .into_iter()
        .zip(keys.iter())
        .enumerate()
        .filter_map(|(idx, (record, key))| match key {
            None => Some(record),
            Some(key) => (winners.get(key.as_str()) == Some(&idx)).then_some(record),
        })
        .collect()
}
