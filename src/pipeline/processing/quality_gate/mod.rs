pub mod noise;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::domain::{FieldKind, ListingRecord, MoneyKind};
use crate::error::Result;
use crate::pipeline::processing::normalize::MoneyFields;
use noise::{FieldValidator, NoiseConfig};

/// Quality assessment result from the Quality Gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// The quality gate decision
    pub decision: QualityDecision,
    /// Overall quality score (0.0 to 1.0)
    pub quality_score: f64,
    /// Share of key fields carrying a value (0 to 100)
    pub completeness_percent: f64,
    /// Specific quality issues found
    pub issues: Vec<QualityIssue>,
    /// The quality rule set version used
    pub rule_version: String,
    /// When this quality assessment was performed
    pub assessed_at: DateTime<Utc>,
}

impl QualityAssessment {
    /// Field names flagged as extraction noise, in record order
    pub fn noisy_fields(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.issue_type == QualityIssueType::ExtractionNoise)
            .filter_map(|i| i.field.as_deref())
            .collect()
    }
}

/// Quality Gate decision for a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityDecision {
    /// Record meets quality standards and proceeds to next stage
    Accept,
    /// Record has quality concerns but proceeds with warnings
    AcceptWithWarnings,
    /// Record is not a real listing or is too damaged to keep
    Quarantine,
}

impl QualityDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityDecision::Accept => "accept",
            QualityDecision::AcceptWithWarnings => "accept_with_warnings",
            QualityDecision::Quarantine => "quarantine",
        }
    }
}

/// Individual quality issue found during assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    /// The type of quality issue
    pub issue_type: QualityIssueType,
    /// Severity level of the issue
    pub severity: QualitySeverity,
    /// Human-readable description of the issue
    pub description: String,
    /// Field that triggered this issue
    pub field: Option<String>,
}

/// Types of quality issues that can be detected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssueType {
    /// Missing required data
    MissingData,
    /// Name is a placeholder such as "Unlock Listing"
    Placeholder,
    /// Name or URL belongs to a navigation or category page
    NavigationContent,
    /// Data too short or otherwise suspicious
    SuspiciousValue,
    /// A field value matched a noise rule
    ExtractionNoise,
}

/// Severity levels for quality issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum QualitySeverity {
    /// Minor issue, record can proceed
    Info,
    /// Notable issue worth flagging
    Warning,
    /// Significant issue requiring attention
    Error,
    /// Critical issue requiring quarantine
    Critical,
}

/// What the cleaning run does with a field the validator flags as noise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoisePolicy {
    /// Replace the field (and its numeric companion) with null
    #[default]
    NullField,
    /// Keep the value, list the field under `flagged_fields`
    Flag,
    /// Drop the whole record
    DropRecord,
}

/// Configuration for Quality Gate assessment rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Minimum quality score for acceptance
    pub min_quality_score: f64,
    /// Names shorter than this are suspicious
    pub min_name_len: usize,
    /// Rule version identifier
    pub rule_version: String,
    /// Substrings marking a placeholder name
    pub placeholder_names: Vec<String>,
    /// Word sequences marking a navigation or category name
    pub navigation_name_terms: Vec<String>,
    /// Whole names that are category labels rather than listings
    pub generic_names: Vec<String>,
    /// URL fragments of category and navigation pages
    pub category_url_patterns: Vec<String>,
    pub noise_policy: NoisePolicy,
    /// Remove quarantined records from the output
    pub drop_quarantined: bool,
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_quality_score: constants::DEFAULT_MIN_QUALITY_SCORE,
            min_name_len: constants::DEFAULT_MIN_NAME_LEN,
            rule_version: "v1.0.0".to_string(),
            placeholder_names: strings(&["unlock listing", "sponsored", "advertisement"]),
            navigation_name_terms: strings(&[
                "my business",
                "my listings",
                "my saved listings",
                "add a new listing",
                "get valuation",
                "how to buy",
                "how to sell",
                "value a business",
                "sell a business",
                "buy a franchise",
                "list business for sale",
                "for sale by owner",
                "managed by broker",
                "sign in",
            ]),
            generic_names: strings(&[
                "businesses",
                "franchises",
                "brokers",
                "dashboard",
                "listings",
                "established",
                "internet",
                "profitable",
                "cash flow",
                "register",
                "business opportunities",
                "retail franchises",
                "restaurant and food franchises",
                "low cost franchises",
                "established businesses",
                "asset sales",
            ]),
            category_url_patterns: strings(&[
                "/buy/",
                "/sell/",
                "/franchise-for-sale/",
                "/how-to-",
                "/brokers/",
                "/mybbs/",
                "/fsbo/",
                "/business-valuation",
                "/business/cash-flow/",
                "/business/established/",
                "/business/internet/",
                "/business/profitable/",
                "/business/for-sale-by-owner/",
                "/business/brokered/",
                "/partner/",
            ]),
            noise_policy: NoisePolicy::default(),
            drop_quarantined: true,
        }
    }
}

/// Trait for implementing Quality Gate assessment logic
pub trait QualityGate {
    /// Assess a listing whose financial fields have already been normalized
    fn assess(&self, record: &ListingRecord, money: &MoneyFields) -> QualityAssessment;
}

/// Default Quality Gate: record-level listing heuristics plus per-field noise
pub struct ListingQualityGate {
    /// Configuration for quality assessment rules
    pub config: QualityConfig,
    validator: FieldValidator,
}

impl ListingQualityGate {
    pub fn new(config: QualityConfig, noise: &NoiseConfig) -> Result<Self> {
        Ok(Self {
            config,
            validator: FieldValidator::new(noise)?,
        })
    }

    pub fn with_validator(config: QualityConfig, validator: FieldValidator) -> Self {
        Self { config, validator }
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    /// Name and URL checks that tell listings apart from site chrome
    fn assess_identity(&self, record: &ListingRecord) -> Vec<QualityIssue> {
        let mut issues = Vec::new();

        match record.name() {
            None => issues.push(QualityIssue {
                issue_type: QualityIssueType::MissingData,
                severity: QualitySeverity::Error,
                description: "Listing name is missing".to_string(),
                field: Some("name".to_string()),
            }),
            Some(name) => {
                let lowered = name.to_lowercase();
                if contains_any(&lowered, &self.config.placeholder_names) {
                    issues.push(QualityIssue {
                        issue_type: QualityIssueType::Placeholder,
                        severity: QualitySeverity::Critical,
                        description: format!("Placeholder listing name '{}'", name),
                        field: Some("name".to_string()),
                    });
                }
                if contains_phrase(&lowered, &self.config.navigation_name_terms)
                    || self
                        .config
                        .generic_names
                        .iter()
                        .any(|g| g.eq_ignore_ascii_case(lowered.trim()))
                {
                    issues.push(QualityIssue {
                        issue_type: QualityIssueType::NavigationContent,
                        severity: QualitySeverity::Critical,
                        description: format!("Name '{}' is navigation or category text", name),
                        field: Some("name".to_string()),
                    });
                }
                if name.chars().count() < self.config.min_name_len {
                    issues.push(QualityIssue {
                        issue_type: QualityIssueType::SuspiciousValue,
                        severity: QualitySeverity::Error,
                        description: format!(
                            "Name is shorter than {} characters",
                            self.config.min_name_len
                        ),
                        field: Some("name".to_string()),
                    });
                }
            }
        }

        if let Some(url) = record.url() {
            let lowered = url.to_lowercase();
            if contains_any(&lowered, &self.config.category_url_patterns) {
                issues.push(QualityIssue {
                    issue_type: QualityIssueType::NavigationContent,
                    severity: QualitySeverity::Critical,
                    description: "URL points at a category or navigation page".to_string(),
                    field: Some(constants::URL_FIELD.to_string()),
                });
            }
        }

        issues
    }

    /// Per-field noise checks; one issue per noisy field
    fn assess_fields(&self, record: &ListingRecord) -> Vec<QualityIssue> {
        let mut checks: Vec<(FieldKind, &str, &str)> = Vec::new();

        for (kind, field) in [
            (FieldKind::Industry, constants::INDUSTRY_FIELD),
            (FieldKind::Location, constants::LOCATION_FIELD),
            (FieldKind::Multiple, constants::MULTIPLE_FIELD),
        ] {
            if let Some(value) = record.text(field) {
                checks.push((kind, field, value));
            }
        }
        for kind in MoneyKind::ALL {
            for field in kind.raw_aliases() {
                if let Some(value) = record.text(field) {
                    checks.push((kind.into(), *field, value));
                }
            }
        }

        checks
            .into_iter()
            .filter(|(kind, _, value)| self.validator.is_noise(*kind, value))
            .map(|(kind, field, _)| QualityIssue {
                issue_type: QualityIssueType::ExtractionNoise,
                severity: QualitySeverity::Warning,
                description: format!("Value does not look like a {}", kind),
                field: Some(field.to_string()),
            })
            .collect()
    }

    /// Share of key fields present, 0 to 100
    fn completeness(&self, record: &ListingRecord, money: &MoneyFields) -> f64 {
        let text_fields = [
            constants::INDUSTRY_FIELD,
            constants::LOCATION_FIELD,
            constants::DESCRIPTION_FIELD,
        ];
        let present = MoneyKind::ALL
            .iter()
            .filter(|k| money.get(**k).is_some())
            .count()
            + text_fields.iter().filter(|f| record.text(f).is_some()).count();

        present as f64 / (MoneyKind::ALL.len() + text_fields.len()) as f64 * 100.0
    }

    /// Calculate overall quality score based on issues
    fn calculate_quality_score(&self, issues: &[QualityIssue]) -> f64 {
        let mut score: f64 = 1.0;

        for issue in issues {
            let deduction = match issue.severity {
                QualitySeverity::Info => 0.01,
                QualitySeverity::Warning => 0.05,
                QualitySeverity::Error => 0.15,
                QualitySeverity::Critical => 0.30,
            };
            score = (score - deduction).max(0.0);
        }

        score
    }

    /// Determine quality decision based on score and issues
    fn determine_decision(&self, quality_score: f64, issues: &[QualityIssue]) -> QualityDecision {
        if issues.iter().any(|i| i.severity == QualitySeverity::Critical) {
            return QualityDecision::Quarantine;
        }

        if quality_score < self.config.min_quality_score {
            return QualityDecision::Quarantine;
        }

        if issues.iter().any(|i| i.severity >= QualitySeverity::Warning) {
            return QualityDecision::AcceptWithWarnings;
        }

        QualityDecision::Accept
    }
}

impl QualityGate for ListingQualityGate {
    fn assess(&self, record: &ListingRecord, money: &MoneyFields) -> QualityAssessment {
        let mut issues = self.assess_identity(record);
        issues.extend(self.assess_fields(record));

        if money.is_empty() {
            issues.push(QualityIssue {
                issue_type: QualityIssueType::MissingData,
                severity: QualitySeverity::Warning,
                description: "No price, revenue or profit could be parsed".to_string(),
                field: None,
            });
        }

        let quality_score = self.calculate_quality_score(&issues);
        let decision = self.determine_decision(quality_score, &issues);

        QualityAssessment {
            decision,
            quality_score,
            completeness_percent: self.completeness(record, money),
            issues,
            rule_version: self.config.rule_version.clone(),
            assessed_at: Utc::now(),
        }
    }
}

impl Default for ListingQualityGate {
    fn default() -> Self {
        Self::with_validator(QualityConfig::default(), FieldValidator::default())
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(n.to_lowercase().as_str()))
}

/// True when every word of some phrase appears consecutively in `text`.
/// Both sides split on non-alphanumeric characters, so `sign in` does not
/// match inside `Sign Installation`.
fn contains_phrase(text: &str, phrases: &[String]) -> bool {
    let text_words = words(text);
    phrases.iter().any(|phrase| {
        let phrase = phrase.to_lowercase();
        let phrase_words = words(&phrase);
        !phrase_words.is_empty()
            && text_words
                .windows(phrase_words.len())
                .any(|window| window == phrase_words.as_slice())
    })
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}
