use anyhow::Context;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app::ports::ListingInputPort;
use crate::domain::ListingRecord;

/// Reads scraped listings from a JSON array file or an NDJSON file
pub struct JsonFileInputAdapter {
    path: PathBuf,
}

impl JsonFileInputAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ListingInputPort for JsonFileInputAdapter {
    fn read_listings(&mut self) -> anyhow::Result<Vec<ListingRecord>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read input file {}", self.path.display()))?;
        let records = parse_listings(&content)
            .with_context(|| format!("Failed to parse listings in {}", self.path.display()))?;
        info!(
            "Read {} listings from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Parse a JSON array of objects, or one object per line.
///
/// Non-object entries are skipped with a warning; a line that is not JSON
/// at all is an error.
pub fn parse_listings(content: &str) -> anyhow::Result<Vec<ListingRecord>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)?;
        return Ok(values
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| into_record(value, idx + 1))
            .collect());
    }

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Invalid JSON on line {}", idx + 1))?;
        if let Some(record) = into_record(value, idx + 1) {
            records.push(record);
        }
    }
    Ok(records)
}

fn into_record(value: Value, position: usize) -> Option<ListingRecord> {
    match value {
        Value::Object(map) => Some(ListingRecord::from_map(map)),
        other => {
            warn!("Skipping entry {}: expected an object, got {}", position, other);
            None
        }
    }
}
