//! Free-form financial text to numeric USD.
//!
//! Every marketplace prints money differently (`$1.2M`, `Revenue: 350,000`,
//! `Cash Flow (SDE): $130K`). The normalizer runs an ordered, per-kind rule
//! list over the raw text and keeps the first in-range amount.

pub mod registry;
pub mod rules;

use serde::{Deserialize, Serialize};

use crate::domain::{ListingRecord, MoneyKind};
use crate::error::Result;
use registry::PatternRegistry;
use rules::PatternOverrides;

/// Inclusive plausibility range for a money kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Configured ranges for every money kind. A bound missing from
/// configuration keeps that kind's built-in value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialRanges")]
pub struct MoneyRanges {
    pub price: ValueRange,
    pub revenue: ValueRange,
    pub profit: ValueRange,
}

impl Default for MoneyRanges {
    fn default() -> Self {
        Self {
            price: ValueRange::new(1_000.0, 100_000_000.0),
            revenue: ValueRange::new(1_000.0, 100_000_000.0),
            profit: ValueRange::new(1_000.0, 10_000_000.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl PartialRange {
    fn or(self, fallback: ValueRange) -> ValueRange {
        ValueRange::new(
            self.min.unwrap_or(fallback.min),
            self.max.unwrap_or(fallback.max),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialRanges {
    price: PartialRange,
    revenue: PartialRange,
    profit: PartialRange,
}

impl From<PartialRanges> for MoneyRanges {
    fn from(partial: PartialRanges) -> Self {
        let defaults = MoneyRanges::default();
        Self {
            price: partial.price.or(defaults.price),
            revenue: partial.revenue.or(defaults.revenue),
            profit: partial.profit.or(defaults.profit),
        }
    }
}

impl MoneyRanges {
    pub fn for_kind(&self, kind: MoneyKind) -> ValueRange {
        match kind {
            MoneyKind::Price => self.price,
            MoneyKind::Revenue => self.revenue,
            MoneyKind::Profit => self.profit,
        }
    }
}

/// Numeric companions of a record's three financial fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneyFields {
    pub price: Option<f64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
}

impl MoneyFields {
    pub fn get(&self, kind: MoneyKind) -> Option<f64> {
        match kind {
            MoneyKind::Price => self.price,
            MoneyKind::Revenue => self.revenue,
            MoneyKind::Profit => self.profit,
        }
    }

    pub fn set(&mut self, kind: MoneyKind, value: Option<f64>) {
        match kind {
            MoneyKind::Price => self.price = value,
            MoneyKind::Revenue => self.revenue = value,
            MoneyKind::Profit => self.profit = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.revenue.is_none() && self.profit.is_none()
    }
}

/// Rule-driven money normalizer
#[derive(Debug, Clone)]
pub struct MoneyNormalizer {
    registry: PatternRegistry,
    ranges: MoneyRanges,
}

impl MoneyNormalizer {
    pub fn new(ranges: MoneyRanges, overrides: &PatternOverrides) -> Result<Self> {
        Ok(Self {
            registry: PatternRegistry::new(overrides)?,
            ranges,
        })
    }

    pub fn with_registry(registry: PatternRegistry, ranges: MoneyRanges) -> Self {
        Self { registry, ranges }
    }

    pub fn ranges(&self) -> &MoneyRanges {
        &self.ranges
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Parse `raw` as an amount of the given kind.
    ///
    /// Rules are tried first. When none yields an in-range amount, the whole
    /// text goes through `parse_amount`, which joins whitespace-grouped
    /// digits such as `$1 200 000`. Returns `None` when neither is in range.
    pub fn normalize(&self, raw: &str, kind: MoneyKind) -> Option<f64> {
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let range = self.ranges.for_kind(kind);

        for rule in self.registry.rules_for(kind) {
            for caps in rule.regex.captures_iter(raw) {
                let token = caps
                    .name("amount")
                    .or_else(|| caps.get(1))
                    .or_else(|| caps.get(0));
                let Some(token) = token else { continue };

                if let Some(value) = parse_amount(token.as_str()) {
                    if range.contains(value) {
                        return Some(value);
                    }
                }
            }
        }

        parse_amount(raw).filter(|value| range.contains(*value))
    }

    /// Normalize the raw financial fields of a record, read through their aliases
    pub fn normalize_record(&self, record: &ListingRecord) -> MoneyFields {
        let mut fields = MoneyFields::default();
        for kind in MoneyKind::ALL {
            let value = record
                .first_text(kind.raw_aliases())
                .and_then(|raw| self.normalize(raw, kind));
            fields.set(kind, value);
        }
        fields
    }
}

impl Default for MoneyNormalizer {
    fn default() -> Self {
        Self::new(MoneyRanges::default(), &PatternOverrides::default())
            .expect("built-in money patterns are valid")
    }
}

/// Convert one matched token to dollars.
///
/// Keeps digits, `.`, `,` and a `K`/`M`/`B` magnitude suffix; the suffix is
/// applied after it is cut off and before thousands separators are dropped.
pub fn parse_amount(token: &str) -> Option<f64> {
    let lowered = token
        .to_ascii_lowercase()
        .replace("thousand", "k")
        .replace("million", "m")
        .replace("billion", "b");

    let cleaned: String = lowered
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | 'k' | 'm' | 'b'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let (number, multiplier) = match cleaned.chars().last() {
        Some('k') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('b') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value: f64 = number.replace(',', "").parse().ok()?;
    let value = round_cents(value * multiplier);
    value.is_finite().then_some(value)
}

/// Canonical emission: whole dollars with thousands separators, e.g. `$1,200,000`
pub fn format_as_dollar(value: f64) -> String {
    let whole = value.abs().round() as u64;
    let digits = whole.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0.0 && whole > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
