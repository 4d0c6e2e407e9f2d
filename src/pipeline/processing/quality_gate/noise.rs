use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::FieldKind;
use crate::error::Result;

static MULTIPLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bx\b|multiple").expect("multiple token pattern is valid"));

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

/// Phrases that mark a scraped value as navigation, boilerplate or template
/// text, per field kind. Matching is case-insensitive substring containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoisePhrases {
    pub industry: Vec<String>,
    pub location: Vec<String>,
    pub price: Vec<String>,
    pub revenue: Vec<String>,
    pub profit: Vec<String>,
    pub multiple: Vec<String>,
}

impl NoisePhrases {
    pub fn for_kind(&self, kind: FieldKind) -> &[String] {
        match kind {
            FieldKind::Industry => &self.industry,
            FieldKind::Location => &self.location,
            FieldKind::Price => &self.price,
            FieldKind::Revenue => &self.revenue,
            FieldKind::Profit => &self.profit,
            FieldKind::Multiple => &self.multiple,
        }
    }
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for NoisePhrases {
    fn default() -> Self {
        let financial = phrases(&[
            "unlock listing",
            "sign in to view",
            "log in to view",
            "register to view",
        ]);
        Self {
            industry: phrases(&[
                "terms reference",
                "insights in your mailbox",
                "enter your email",
                "email address",
                "that is",
                "industries price",
                "listing types",
                "asking price",
                "cash flow",
                "revenue range",
                "entrepreneur",
                "filter by",
                "clear save",
                "sign in to",
            ]),
            location: phrases(&[
                "entrepreneur",
                "freedom",
                "business",
                "opportunity",
                "reference",
                "industries",
                "filter",
                "clear save",
            ]),
            price: financial.clone(),
            revenue: financial.clone(),
            profit: financial,
            multiple: phrases(&["filter", "clear save", "listing types"]),
        }
    }
}

/// Noise configuration: phrase lists plus markup/script artifact patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub phrases: NoisePhrases,
    /// Regexes that mark any kind as noise (HTML tags, inline script)
    pub artifact_patterns: Vec<String>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            phrases: NoisePhrases::default(),
            artifact_patterns: phrases(&[
                r"<[^>]+>",
                r"function\s*\(",
                r"\bvar\s+\w+",
                r"document\.",
            ]),
        }
    }
}

/// Classifies extracted field values as noise. Never mutates its input.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    phrases: NoisePhrases,
    artifacts: Vec<Regex>,
}

impl FieldValidator {
    pub fn new(config: &NoiseConfig) -> Result<Self> {
        let lower = |list: &[String]| list.iter().map(|p| p.to_lowercase()).collect::<Vec<_>>();
        let phrases = NoisePhrases {
            industry: lower(&config.phrases.industry),
            location: lower(&config.phrases.location),
            price: lower(&config.phrases.price),
            revenue: lower(&config.phrases.revenue),
            profit: lower(&config.phrases.profit),
            multiple: lower(&config.phrases.multiple),
        };

        let artifacts = config
            .artifact_patterns
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { phrases, artifacts })
    }

    /// `true` when `value` does not look like a real value of `kind`
    pub fn is_noise(&self, kind: FieldKind, value: &str) -> bool {
        let lowered = value.to_lowercase();

        if self
            .phrases
            .for_kind(kind)
            .iter()
            .any(|phrase| !phrase.is_empty() && lowered.contains(phrase.as_str()))
        {
            return true;
        }

        if self.artifacts.iter().any(|re| re.is_match(value)) {
            return true;
        }

        let has_digit = value.chars().any(|c| c.is_ascii_digit());
        match kind {
            FieldKind::Price | FieldKind::Revenue | FieldKind::Profit => {
                !(has_digit || value.contains(CURRENCY_SYMBOLS))
            }
            FieldKind::Multiple => !(has_digit || MULTIPLE_TOKEN.is_match(value)),
            FieldKind::Industry | FieldKind::Location => false,
        }
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(&NoiseConfig::default()).expect("built-in noise patterns are valid")
    }
}
