use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    INDUSTRY_FIELD, INDUSTRY_STANDARDIZED_FIELD, LOCATION_FIELD, LOCATION_STANDARDIZED_FIELD,
    STATE_FIELD,
};
use crate::domain::ListingRecord;

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)").expect("parenthetical pattern is valid"));
static SELECT_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Select (?:State|County).*").expect("select tail pattern is valid"));
static STATE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{2})\b").expect("state code pattern is valid"));
static UNITED_STATES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bUSA\b|United States").expect("country pattern is valid"));
static UNITED_KINGDOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bUK\b|United Kingdom").expect("country pattern is valid"));

/// Label cleanup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Exact scraped label to canonical industry
    pub industry_mapping: BTreeMap<String, String>,
    /// Labels at least this long are treated as scraped prose
    pub max_industry_len: usize,
    pub fallback_industry: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        let industry_mapping = [
            ("Terms Reference", "Other"),
            ("Insights in your Mailbox", "Other"),
            ("AIAutomotive", "Automotive"),
            ("that is profitable", "Other"),
            ("In Consumer Goods", "Consumer Goods"),
            ("In Sporting Goods", "Sporting Goods"),
            ("In Medical Devices", "Healthcare"),
            ("In Retail Outdoor Equipment", "Outdoor & Recreation"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            industry_mapping,
            max_industry_len: 50,
            fallback_industry: "Other".to_string(),
        }
    }
}

/// Country or `United States - ST` form of a free-text location
pub fn standardize_location(raw: &str) -> Option<String> {
    let cleaned = PARENTHETICAL.replace_all(raw.trim(), "");
    let cleaned = SELECT_TAIL.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if UNITED_STATES.is_match(cleaned) {
        return Some("United States".to_string());
    }
    if cleaned.contains("Australia") {
        return Some("Australia".to_string());
    }
    if cleaned.contains("Canada") {
        return Some("Canada".to_string());
    }
    if UNITED_KINGDOM.is_match(cleaned) {
        return Some("United Kingdom".to_string());
    }

    match cleaned.rsplit_once(',') {
        Some((_, last)) => {
            let last = last.trim();
            if last.chars().count() == 2 {
                Some(format!("United States - {last}"))
            } else if last.is_empty() {
                None
            } else {
                Some(last.to_string())
            }
        }
        None => Some(cleaned.to_string()),
    }
}

/// First standalone two-letter upper-case token
pub fn extract_state(raw: &str) -> Option<String> {
    STATE_CODE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn standardize_industry(raw: &str, config: &EnrichConfig) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let label = config
        .industry_mapping
        .get(trimmed)
        .map(String::as_str)
        .unwrap_or(trimmed);

    if label.chars().count() >= config.max_industry_len {
        Some(config.fallback_industry.clone())
    } else {
        Some(label.to_string())
    }
}

/// Adds standardized location, state and industry columns
#[derive(Debug, Clone, Default)]
pub struct ListingEnricher {
    config: EnrichConfig,
}

impl ListingEnricher {
    pub fn new(config: EnrichConfig) -> Self {
        Self { config }
    }

    pub fn enrich(&self, record: &mut ListingRecord) {
        let location = record.text(LOCATION_FIELD).map(str::to_string);
        let industry = record.text(INDUSTRY_FIELD).map(str::to_string);

        let standardized = location.as_deref().and_then(standardize_location);
        let state = location.as_deref().and_then(extract_state);
        let industry = industry
            .as_deref()
            .and_then(|i| standardize_industry(i, &self.config));

        record.set_text(LOCATION_STANDARDIZED_FIELD, standardized.as_deref());
        record.set_text(STATE_FIELD, state.as_deref());
        record.set_text(INDUSTRY_STANDARDIZED_FIELD, industry.as_deref());
    }
}
