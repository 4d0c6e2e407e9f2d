use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::app::ports::ListingOutputPort;
use crate::config::CleanerConfig;
use crate::constants::{
    COMPLETENESS_FIELD, FLAGGED_FIELDS_FIELD, QUALITY_DECISION_FIELD, QUALITY_SCORE_FIELD,
};
use crate::domain::{ListingRecord, MoneyKind};
use crate::observability::metrics;
use crate::pipeline::processing::dedup::{Deduplicator, KeepPolicy, UrlKey};
use crate::pipeline::processing::enrich::ListingEnricher;
use crate::pipeline::processing::identity::assign_listing_id;
use crate::pipeline::processing::normalize::{MoneyFields, MoneyNormalizer};
use crate::pipeline::processing::quality_gate::{
    ListingQualityGate, NoisePolicy, QualityAssessment, QualityDecision, QualityGate,
};
use crate::pipeline::processing::ratios::apply_ratios;
use crate::pipeline::report::{CoverageReport, RunCounts};

/// Result of one cleaning run
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub records: Vec<ListingRecord>,
    pub report: CoverageReport,
}

/// Runs the whole cleaning pipeline over a batch of scraped listings:
/// normalize, quality gate, enrich, deduplicate, identify, compute ratios.
pub struct CleanListingsUseCase {
    normalizer: MoneyNormalizer,
    quality_gate: Box<dyn QualityGate + Send + Sync>,
    noise_policy: NoisePolicy,
    drop_quarantined: bool,
    enricher: ListingEnricher,
    deduplicator: Deduplicator,
    url_key: UrlKey,
}

impl CleanListingsUseCase {
    pub fn from_config(config: &CleanerConfig) -> Result<Self> {
        let normalizer = MoneyNormalizer::new(config.ranges, &config.patterns)
            .context("Failed to compile money patterns")?;
        let quality_gate = ListingQualityGate::new(config.quality.clone(), &config.noise)
            .context("Failed to compile noise patterns")?;

        Ok(Self {
            normalizer,
            quality_gate: Box::new(quality_gate),
            noise_policy: config.quality.noise_policy,
            drop_quarantined: config.quality.drop_quarantined,
            enricher: ListingEnricher::new(config.enrich.clone()),
            deduplicator: Deduplicator::from_config(&config.dedup),
            url_key: UrlKey::new(config.dedup.url.clone()),
        })
    }

    /// Swap the quality gate implementation
    pub fn with_quality_gate(mut self, quality_gate: Box<dyn QualityGate + Send + Sync>) -> Self {
        self.quality_gate = quality_gate;
        self
    }

    pub fn with_keep(mut self, keep: KeepPolicy) -> Self {
        self.deduplicator = self.deduplicator.with_keep(keep);
        self
    }

    pub fn execute(
        &self,
        records: Vec<ListingRecord>,
        output: &mut dyn ListingOutputPort,
    ) -> Result<CleanOutcome> {
        let started = Instant::now();
        let mut counts = RunCounts {
            input_records: records.len(),
            ..Default::default()
        };
        info!(records = records.len(), "Starting listing cleaning run");

        let mut survivors = Vec::with_capacity(records.len());
        for mut record in records {
            let money = self.normalizer.normalize_record(&record);
            let assessment = self.quality_gate.assess(&record, &money);
            record_assessment_metrics(&assessment);

            if assessment.decision == QualityDecision::Quarantine && self.drop_quarantined {
                counts.quarantined += 1;
                debug!(
                    url = record.url().unwrap_or_default(),
                    score = assessment.quality_score,
                    "Quarantined listing"
                );
                continue;
            }

            let noisy: Vec<String> = assessment
                .noisy_fields()
                .into_iter()
                .map(str::to_string)
                .collect();
            let money = match self.noise_policy {
                NoisePolicy::DropRecord if !noisy.is_empty() => {
                    counts.dropped_for_noise += 1;
                    warn!(
                        url = record.url().unwrap_or_default(),
                        fields = ?noisy,
                        "Dropping listing with noisy fields"
                    );
                    continue;
                }
                NoisePolicy::NullField if !noisy.is_empty() => {
                    for field in &noisy {
                        record.clear(field);
                        metrics::quality_gate::field_nulled(field);
                    }
                    counts.fields_nulled += noisy.len();
                    self.normalizer.normalize_record(&record)
                }
                NoisePolicy::Flag => {
                    counts.fields_flagged += noisy.len();
                    money
                }
                _ => money,
            };

            write_money(&mut record, &money);
            record.set_text(QUALITY_DECISION_FIELD, Some(assessment.decision.as_str()));
            record.set_number(QUALITY_SCORE_FIELD, Some(assessment.quality_score));
            record.set_number(COMPLETENESS_FIELD, Some(assessment.completeness_percent));
            record.set_value(
                FLAGGED_FIELDS_FIELD,
                Value::Array(noisy.into_iter().map(Value::String).collect()),
            );

            self.enricher.enrich(&mut record);
            survivors.push(record);
        }

        let dedup = self.deduplicator.deduplicate(survivors);
        for stage in &dedup.stages {
            metrics::dedup::records_removed(&stage.key, stage.removed());
            info!(
                key = %stage.key,
                before = stage.before,
                after = stage.after,
                "Deduplication stage complete"
            );
        }

        let mut records = dedup.records;
        for record in records.iter_mut() {
            assign_listing_id(record, &self.url_key);
            let money = read_money(record);
            let ratios = apply_ratios(record, &money);
            for (name, value) in [
                ("price_to_revenue", ratios.price_to_revenue),
                ("price_to_profit", ratios.price_to_profit),
                ("profit_margin_percent", ratios.profit_margin_percent),
            ] {
                if value.is_some() {
                    metrics::ratios::ratio_computed(name);
                }
            }
            output
                .write_listing(record)
                .context("Failed to write cleaned listing")?;
        }
        output.finish().context("Failed to finish listing output")?;

        let report = CoverageReport::build(counts, dedup.stages, &records);
        let elapsed = started.elapsed().as_secs_f64();
        metrics::clean::run_completed(report.input_records, report.output_records, elapsed);
        info!(
            input = report.input_records,
            output = report.output_records,
            quarantined = report.quarantined,
            duplicates = report.duplicates_removed(),
            fields_nulled = report.fields_nulled,
            elapsed_secs = elapsed,
            "Listing cleaning run complete"
        );

        Ok(CleanOutcome { records, report })
    }
}

fn write_money(record: &mut ListingRecord, money: &MoneyFields) {
    for kind in MoneyKind::ALL {
        let value = money.get(kind);
        if record.first_text(kind.raw_aliases()).is_some() {
            if value.is_some() {
                metrics::normalize::value_parsed(kind.as_str());
            } else {
                metrics::normalize::value_unparsed(kind.as_str());
            }
        }
        record.set_number(kind.numeric_field(), value);
    }
}

fn read_money(record: &ListingRecord) -> MoneyFields {
    let mut money = MoneyFields::default();
    for kind in MoneyKind::ALL {
        money.set(kind, record.number(kind.numeric_field()));
    }
    money
}

fn record_assessment_metrics(assessment: &QualityAssessment) {
    match assessment.decision {
        QualityDecision::Accept => metrics::quality_gate::record_accepted(),
        QualityDecision::AcceptWithWarnings => metrics::quality_gate::record_accepted_with_warnings(),
        QualityDecision::Quarantine => metrics::quality_gate::record_quarantined(),
    }
    metrics::quality_gate::quality_score_recorded(assessment.quality_score);
    for issue in &assessment.issues {
        metrics::quality_gate::issue_detected(
            &format!("{:?}", issue.issue_type),
            &format!("{:?}", issue.severity),
        );
    }
}
