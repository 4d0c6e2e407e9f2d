use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    INDUSTRY_FIELD, LOCATION_FIELD, PRICE_NUMERIC_FIELD, PROFIT_NUMERIC_FIELD,
    REVENUE_NUMERIC_FIELD,
};
use crate::domain::ListingRecord;
use crate::pipeline::processing::dedup::StageReport;

const UNKNOWN_SOURCE: &str = "unknown";

/// How many records carry a field, and what share that is
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStat {
    pub present: usize,
    pub percent: f64,
}

impl CoverageStat {
    fn new(present: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (present as f64 / total as f64 * 1000.0).round() / 10.0
        };
        Self { present, percent }
    }
}

/// Field coverage over a group of output records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub records: usize,
    pub price: CoverageStat,
    pub revenue: CoverageStat,
    pub profit: CoverageStat,
    pub industry: CoverageStat,
    pub location: CoverageStat,
}

impl FieldCoverage {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ListingRecord>,
    {
        let mut total = 0;
        let mut counts = [0usize; 5];

        for record in records {
            total += 1;
            let present = [
                record.number(PRICE_NUMERIC_FIELD).is_some(),
                record.number(REVENUE_NUMERIC_FIELD).is_some(),
                record.number(PROFIT_NUMERIC_FIELD).is_some(),
                record.text(INDUSTRY_FIELD).is_some(),
                record.text(LOCATION_FIELD).is_some(),
            ];
            for (count, hit) in counts.iter_mut().zip(present) {
                *count += usize::from(hit);
            }
        }

        Self {
            records: total,
            price: CoverageStat::new(counts[0], total),
            revenue: CoverageStat::new(counts[1], total),
            profit: CoverageStat::new(counts[2], total),
            industry: CoverageStat::new(counts[3], total),
            location: CoverageStat::new(counts[4], total),
        }
    }
}

/// Counters collected while records flow through the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub input_records: usize,
    /// Records removed by the quality gate
    pub quarantined: usize,
    /// Records removed under the drop-record noise policy
    pub dropped_for_noise: usize,
    pub fields_nulled: usize,
    pub fields_flagged: usize,
}

/// Data quality summary of one cleaning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub generated_at: DateTime<Utc>,
    pub input_records: usize,
    pub output_records: usize,
    pub quarantined: usize,
    pub dropped_for_noise: usize,
    pub fields_nulled: usize,
    pub fields_flagged: usize,
    pub dedup_stages: Vec<StageReport>,
    pub overall: FieldCoverage,
    pub by_source: BTreeMap<String, FieldCoverage>,
}

impl CoverageReport {
    pub fn build(counts: RunCounts, dedup_stages: Vec<StageReport>, records: &[ListingRecord]) -> Self {
        let mut grouped: BTreeMap<String, Vec<&ListingRecord>> = BTreeMap::new();
        for record in records {
            let source = record.source().unwrap_or(UNKNOWN_SOURCE).to_string();
            grouped.entry(source).or_default().push(record);
        }

        let by_source = grouped
            .into_iter()
            .map(|(source, group)| (source, FieldCoverage::from_records(group)))
            .collect();

        Self {
            generated_at: Utc::now(),
            input_records: counts.input_records,
            output_records: records.len(),
            quarantined: counts.quarantined,
            dropped_for_noise: counts.dropped_for_noise,
            fields_nulled: counts.fields_nulled,
            fields_flagged: counts.fields_flagged,
            dedup_stages,
            overall: FieldCoverage::from_records(records),
            by_source,
        }
    }

    pub fn duplicates_removed(&self) -> usize {
        self.dedup_stages.iter().map(StageReport::removed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(source: &str, price: Option<f64>) -> ListingRecord {
        let mut record = ListingRecord::new().with("source", source);
        record.set_number(PRICE_NUMERIC_FIELD, price);
        record
    }

    #[test]
    fn test_coverage_by_source() {
        let records = vec![
            priced("BizBuySell", Some(250_000.0)),
            priced("BizBuySell", None),
            priced("Flippa", Some(90_000.0)),
        ];
        let report = CoverageReport::build(
            RunCounts {
                input_records: 5,
                quarantined: 2,
                ..Default::default()
            },
            vec![StageReport {
                key: "url".to_string(),
                before: 3,
                after: 3,
            }],
            &records,
        );

        assert_eq!(report.output_records, 3);
        assert_eq!(report.overall.price.present, 2);
        assert_eq!(report.overall.price.percent, 66.7);
        assert_eq!(report.by_source["BizBuySell"].price.percent, 50.0);
        assert_eq!(report.by_source["Flippa"].records, 1);
        assert_eq!(report.duplicates_removed(), 0);
    }

    #[test]
    fn test_empty_run_reports_zero_percent() {
        let report = CoverageReport::build(RunCounts::default(), Vec::new(), &[]);
        assert_eq!(report.overall.records, 0);
        assert_eq!(report.overall.industry.percent, 0.0);
        assert!(report.by_source.is_empty());
    }
}
