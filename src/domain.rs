//! Domain data shapes shared across the cleaning stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

use crate::constants;
use crate::error::CleanerError;

/// A scraped listing: a flat mapping of field names to JSON values.
///
/// Values of the wrong type are treated as absent by every accessor, so a
/// malformed field takes the same path as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord {
    fields: Map<String, Value>,
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder-style insert of a string field
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.set_text(field, Some(value));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Trimmed text of a field; `None` if missing, empty or not a string
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First present alias, in alias order
    pub fn first_text(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|field| self.text(field))
    }

    /// Numeric value of a field; `None` for null or non-numbers
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(|v| v.as_f64())
    }

    pub fn source(&self) -> Option<&str> {
        self.text(constants::SOURCE_FIELD)
    }

    pub fn url(&self) -> Option<&str> {
        self.text(constants::URL_FIELD)
    }

    pub fn name(&self) -> Option<&str> {
        self.first_text(constants::NAME_ALIASES)
    }

    /// Writes a number, or `null` when absent or not finite
    pub fn set_number(&mut self, field: &str, value: Option<f64>) {
        let value = value
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.fields.insert(field.to_string(), value);
    }

    pub fn set_text(&mut self, field: &str, value: Option<&str>) {
        let value = value
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null);
        self.fields.insert(field.to_string(), value);
    }

    pub fn set_value(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// Replaces a field with `null`, keeping the column present for export
    pub fn clear(&mut self, field: &str) {
        if self.fields.contains_key(field) {
            self.fields.insert(field.to_string(), Value::Null);
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for ListingRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}

/// Financial field kinds understood by the money normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoneyKind {
    Price,
    Revenue,
    Profit,
}

impl MoneyKind {
    pub const ALL: [MoneyKind; 3] = [MoneyKind::Price, MoneyKind::Revenue, MoneyKind::Profit];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoneyKind::Price => "price",
            MoneyKind::Revenue => "revenue",
            MoneyKind::Profit => "profit",
        }
    }

    /// Raw field aliases this kind is read from
    pub fn raw_aliases(&self) -> &'static [&'static str] {
        match self {
            MoneyKind::Price => constants::PRICE_RAW_ALIASES,
            MoneyKind::Revenue => constants::REVENUE_RAW_ALIASES,
            MoneyKind::Profit => constants::PROFIT_RAW_ALIASES,
        }
    }

    /// Numeric companion field written by the normalizer
    pub fn numeric_field(&self) -> &'static str {
        match self {
            MoneyKind::Price => constants::PRICE_NUMERIC_FIELD,
            MoneyKind::Revenue => constants::REVENUE_NUMERIC_FIELD,
            MoneyKind::Profit => constants::PROFIT_NUMERIC_FIELD,
        }
    }
}

impl fmt::Display for MoneyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoneyKind {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(MoneyKind::Price),
            "revenue" => Ok(MoneyKind::Revenue),
            "profit" => Ok(MoneyKind::Profit),
            _ => Err(CleanerError::UnknownKind {
                kind: "money",
                value: s.to_string(),
            }),
        }
    }
}

/// Field kinds the noise validator classifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Industry,
    Location,
    Price,
    Revenue,
    Profit,
    Multiple,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Industry,
        FieldKind::Location,
        FieldKind::Price,
        FieldKind::Revenue,
        FieldKind::Profit,
        FieldKind::Multiple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Industry => "industry",
            FieldKind::Location => "location",
            FieldKind::Price => "price",
            FieldKind::Revenue => "revenue",
            FieldKind::Profit => "profit",
            FieldKind::Multiple => "multiple",
        }
    }

    pub fn is_financial(&self) -> bool {
        matches!(self, FieldKind::Price | FieldKind::Revenue | FieldKind::Profit)
    }
}

impl From<MoneyKind> for FieldKind {
    fn from(kind: MoneyKind) -> Self {
        match kind {
            MoneyKind::Price => FieldKind::Price,
            MoneyKind::Revenue => FieldKind::Revenue,
            MoneyKind::Profit => FieldKind::Profit,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "industry" => Ok(FieldKind::Industry),
            "location" => Ok(FieldKind::Location),
            "price" => Ok(FieldKind::Price),
            "revenue" => Ok(FieldKind::Revenue),
            "profit" => Ok(FieldKind::Profit),
            "multiple" => Ok(FieldKind::Multiple),
            _ => Err(CleanerError::UnknownKind {
                kind: "field",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let record: ListingRecord = serde_json::from_value(json!({
            "source": "BizBuySell",
            "price": 250000,
            "industry": "   ",
            "title": "Corner Bakery"
        }))
        .unwrap();

        assert_eq!(record.source(), Some("BizBuySell"));
        assert_eq!(record.first_text(MoneyKind::Price.raw_aliases()), None);
        assert_eq!(record.text("industry"), None);
        assert_eq!(record.name(), Some("Corner Bakery"));
    }

    #[test]
    fn test_absent_numbers_serialize_as_null() {
        let mut record = ListingRecord::new().with("url", "a.com/1");
        record.set_number("price_numeric", None);
        record.set_number("revenue_numeric", Some(f64::NAN));
        record.set_number("profit_numeric", Some(130000.0));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["price_numeric"], Value::Null);
        assert_eq!(value["revenue_numeric"], Value::Null);
        assert_eq!(value["profit_numeric"], json!(130000.0));
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        assert_eq!("Revenue".parse::<MoneyKind>().unwrap(), MoneyKind::Revenue);
        assert_eq!("multiple".parse::<FieldKind>().unwrap(), FieldKind::Multiple);
        assert!(matches!(
            "ebitda".parse::<MoneyKind>(),
            Err(CleanerError::UnknownKind { kind: "money", .. })
        ));
        assert!("colour".parse::<FieldKind>().is_err());
    }
}
