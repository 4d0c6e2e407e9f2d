use std::collections::HashSet;

use listing_cleaner::domain::{FieldKind, ListingRecord, MoneyKind};
use listing_cleaner::pipeline::processing::dedup::{
    deduplicate, KeepPolicy, KeyExtractor, NameKey, UrlKey,
};
use listing_cleaner::pipeline::processing::normalize::{format_as_dollar, MoneyNormalizer};
use listing_cleaner::pipeline::processing::quality_gate::noise::FieldValidator;
use listing_cleaner::pipeline::processing::ratios::{compute_ratios, DerivedRatios};

const RAW_SAMPLES: &[&str] = &[
    "$1.2M",
    "350,000",
    "Cash Flow: $130K",
    "Not Disclosed",
    "$500",
    "$250,000,000",
    "Asking Price: $3.4 million",
    "Revenue $12K / Profit $4K",
    "SDE: 0",
    "EBITDA (TTM): $2,100,000",
    "$9.99B valuation",
    "1,000",
    "999",
    "$ 45 000",
    "Price: Contact Broker",
    "Gross Revenue: $1,150,000 Cash Flow: $240,500",
    "12345678901234567890",
    ".5M",
];

fn listing(url: &str, name: &str) -> ListingRecord {
    ListingRecord::new()
        .with("source", "BizQuest")
        .with("url", url)
        .with("name", name)
}

#[test]
fn test_reference_normalizations() {
    let normalizer = MoneyNormalizer::default();
    assert_eq!(normalizer.normalize("$1.2M", MoneyKind::Revenue), Some(1_200_000.0));
    assert_eq!(normalizer.normalize("350,000", MoneyKind::Revenue), Some(350_000.0));
    assert_eq!(normalizer.normalize("Cash Flow: $130K", MoneyKind::Profit), Some(130_000.0));
    assert_eq!(normalizer.normalize("Not Disclosed", MoneyKind::Price), None);
}

#[test]
fn test_normalized_values_stay_in_range() {
    let normalizer = MoneyNormalizer::default();
    for raw in RAW_SAMPLES {
        for kind in MoneyKind::ALL {
            if let Some(value) = normalizer.normalize(raw, kind) {
                let range = normalizer.ranges().for_kind(kind);
                assert!(
                    range.contains(value),
                    "{raw:?} as {kind} gave {value}, outside {}..={}",
                    range.min,
                    range.max
                );
            }
        }
    }
}

#[test]
fn test_dollar_emission_round_trips_across_range() {
    let normalizer = MoneyNormalizer::default();
    for kind in MoneyKind::ALL {
        let range = normalizer.ranges().for_kind(kind);
        let mut value = range.min;
        while value <= range.max {
            let emitted = format_as_dollar(value);
            assert_eq!(normalizer.normalize(&emitted, kind), Some(value), "{emitted} as {kind}");
            value = (value * 3.7 + 13.0).round();
        }
        assert_eq!(normalizer.normalize(&format_as_dollar(range.max), kind), Some(range.max));
    }
}

#[test]
fn test_deduplication_properties() {
    let records = vec![
        listing("a.com/1", "Widget Shop Inc"),
        listing("a.com/1/", "Widget Shop Inc."),
        listing("a.com/2", "Totally Different Co"),
        listing("a.com/3?utm_campaign=spring", "Harbor Marina Services"),
        listing("a.com/3", "Harbor Marina"),
        listing("b.com/8", "Harbor Marina Services"),
        ListingRecord::new().with("source", "Flippa"),
        listing("c.com/4", ""),
        listing("c.com/5", ""),
    ];
    let url = UrlKey::default();
    let name = NameKey::default();
    let keys: [&dyn KeyExtractor; 2] = [&url, &name];

    for keep in [KeepPolicy::First, KeepPolicy::Last] {
        let once = deduplicate(records.clone(), &keys, keep);
        let twice = deduplicate(once.records.clone(), &keys, keep);

        assert!(once.records.len() <= records.len());
        assert_eq!(twice.records, once.records, "idempotent under {keep:?}");

        for extractor in keys {
            let mut seen = HashSet::new();
            for record in &once.records {
                if let Some(key) = extractor.key(record) {
                    assert!(seen.insert(key.clone()), "duplicate {} key {key}", extractor.name());
                }
            }
        }
    }
}

#[test]
fn test_url_then_name_scenario() {
    let records = vec![
        listing("a.com/1", "Widget Shop Inc"),
        listing("a.com/1/", "Widget Shop Inc."),
        listing("a.com/2", "Totally Different Co"),
    ];
    let url = UrlKey::default();
    let name = NameKey::new(50);

    let keys: [&dyn KeyExtractor; 2] = [&url, &name];

    let outcome = deduplicate(records, &keys, KeepPolicy::First);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].url(), Some("a.com/1"));
    assert_eq!(outcome.records[1].url(), Some("a.com/2"));
}

#[test]
fn test_reference_ratios() {
    let ratios = compute_ratios(Some(200_000.0), Some(100_000.0), Some(20_000.0));
    assert_eq!(
        ratios,
        DerivedRatios {
            price_to_revenue: Some(2.0),
            price_to_profit: Some(10.0),
            profit_margin_percent: Some(20.0),
        }
    );
    assert_eq!(compute_ratios(Some(200_000.0), None, None), DerivedRatios::default());
}

#[test]
fn test_reference_noise_checks() {
    let validator = FieldValidator::default();
    assert!(validator.is_noise(FieldKind::Industry, "Terms Reference"));
    assert!(!validator.is_noise(FieldKind::Industry, "Sporting Goods"));
    assert!(validator.is_noise(FieldKind::Price, "contact for details"));
}
