//! Metrics for listing cleaning runs
//!
//! Recording goes through the `metrics` facade; with no recorder installed
//! every call is a no-op, so library users and tests pay nothing.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Every metric the cleaner emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Normalize metrics
    NormalizeValuesParsed,
    NormalizeValuesUnparsed,

    // Quality Gate metrics
    QualityGateRecordsAccepted,
    QualityGateRecordsAcceptedWithWarnings,
    QualityGateRecordsQuarantined,
    QualityGateQualityScore,
    QualityGateIssuesDetected,
    QualityGateFieldsNulled,

    // Dedup metrics
    DedupRecordsRemoved,

    // Ratio metrics
    RatiosComputed,

    // Run metrics
    CleanRecordsIn,
    CleanRecordsOut,
    CleanDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeValuesParsed => "listing_cleaner_normalize_values_parsed_total",
            MetricName::NormalizeValuesUnparsed => "listing_cleaner_normalize_values_unparsed_total",
            MetricName::QualityGateRecordsAccepted => "listing_cleaner_quality_gate_records_accepted_total",
            MetricName::QualityGateRecordsAcceptedWithWarnings => {
                "listing_cleaner_quality_gate_records_accepted_with_warnings_total"
            }
            MetricName::QualityGateRecordsQuarantined => {
                "listing_cleaner_quality_gate_records_quarantined_total"
            }
            MetricName::QualityGateQualityScore => "listing_cleaner_quality_gate_quality_score",
            MetricName::QualityGateIssuesDetected => "listing_cleaner_quality_gate_issues_detected_total",
            MetricName::QualityGateFieldsNulled => "listing_cleaner_quality_gate_fields_nulled_total",
            MetricName::DedupRecordsRemoved => "listing_cleaner_dedup_records_removed_total",
            MetricName::RatiosComputed => "listing_cleaner_ratios_computed_total",
            MetricName::CleanRecordsIn => "listing_cleaner_clean_records_in_total",
            MetricName::CleanRecordsOut => "listing_cleaner_clean_records_out_total",
            MetricName::CleanDuration => "listing_cleaner_clean_duration_seconds",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            NormalizeValuesParsed,
            NormalizeValuesUnparsed,
            QualityGateRecordsAccepted,
            QualityGateRecordsAcceptedWithWarnings,
            QualityGateRecordsQuarantined,
            QualityGateQualityScore,
            QualityGateIssuesDetected,
            QualityGateFieldsNulled,
            DedupRecordsRemoved,
            RatiosComputed,
            CleanRecordsIn,
            CleanRecordsOut,
            CleanDuration,
        ]
        .into_iter()
    }

    /// Returns (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::NormalizeValuesParsed => ("normalize", "Raw money values parsed in range", None),
            MetricName::NormalizeValuesUnparsed => {
                ("normalize", "Raw money values with no usable amount", None)
            }
            MetricName::QualityGateRecordsAccepted => ("quality_gate", "Records accepted", None),
            MetricName::QualityGateRecordsAcceptedWithWarnings => {
                ("quality_gate", "Records accepted with warnings", None)
            }
            MetricName::QualityGateRecordsQuarantined => ("quality_gate", "Records quarantined", None),
            MetricName::QualityGateQualityScore => ("quality_gate", "Record quality score", Some("ratio")),
            MetricName::QualityGateIssuesDetected => ("quality_gate", "Quality issues by type", None),
            MetricName::QualityGateFieldsNulled => ("quality_gate", "Noisy fields replaced by null", None),
            MetricName::DedupRecordsRemoved => ("dedup", "Duplicates removed per key stage", None),
            MetricName::RatiosComputed => ("ratios", "Ratio values computed", None),
            MetricName::CleanRecordsIn => ("clean", "Records read by a run", None),
            MetricName::CleanRecordsOut => ("clean", "Records written by a run", None),
            MetricName::CleanDuration => ("clean", "Wall time of a run", Some("seconds")),
        }
    }
}

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() -> anyhow::Result<()> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    let _ = PROMETHEUS_HANDLE.set(handle);
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition of everything recorded so far
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

pub mod normalize {
    use super::MetricName;

    pub fn value_parsed(kind: &'static str) {
        ::metrics::counter!(MetricName::NormalizeValuesParsed.as_str(), "kind" => kind).increment(1);
    }

    pub fn value_unparsed(kind: &'static str) {
        ::metrics::counter!(MetricName::NormalizeValuesUnparsed.as_str(), "kind" => kind).increment(1);
    }
}

pub mod quality_gate {
    use super::MetricName;

    pub fn record_accepted() {
        ::metrics::counter!(MetricName::QualityGateRecordsAccepted.as_str()).increment(1);
    }

    pub fn record_accepted_with_warnings() {
        ::metrics::counter!(MetricName::QualityGateRecordsAcceptedWithWarnings.as_str()).increment(1);
    }

    pub fn record_quarantined() {
        ::metrics::counter!(MetricName::QualityGateRecordsQuarantined.as_str()).increment(1);
    }

    pub fn quality_score_recorded(score: f64) {
        ::metrics::histogram!(MetricName::QualityGateQualityScore.as_str()).record(score);
    }

    pub fn issue_detected(issue_type: &str, severity: &str) {
        ::metrics::counter!(
            MetricName::QualityGateIssuesDetected.as_str(),
            "issue_type" => issue_type.to_string(),
            "severity" => severity.to_string()
        )
        .increment(1);
    }

    pub fn field_nulled(field: &str) {
        ::metrics::counter!(MetricName::QualityGateFieldsNulled.as_str(), "field" => field.to_string())
            .increment(1);
    }
}

pub mod dedup {
    use super::MetricName;

    pub fn records_removed(key: &str, count: usize) {
        ::metrics::counter!(MetricName::DedupRecordsRemoved.as_str(), "key" => key.to_string())
            .increment(count as u64);
    }
}

pub mod ratios {
    use super::MetricName;

    pub fn ratio_computed(ratio: &'static str) {
        ::metrics::counter!(MetricName::RatiosComputed.as_str(), "ratio" => ratio).increment(1);
    }
}

pub mod clean {
    use super::MetricName;

    pub fn run_completed(records_in: usize, records_out: usize, secs: f64) {
        ::metrics::counter!(MetricName::CleanRecordsIn.as_str()).increment(records_in as u64);
        ::metrics::counter!(MetricName::CleanRecordsOut.as_str()).increment(records_out as u64);
        ::metrics::histogram!(MetricName::CleanDuration.as_str()).record(secs);
    }
}
