use anyhow::Result;
use serde_json::{json, Value};
use tempfile::tempdir;

use listing_cleaner::app::ports::{ListingInputPort, ListingOutputPort};
use listing_cleaner::app::CleanListingsUseCase;
use listing_cleaner::config::CleanerConfig;
use listing_cleaner::domain::ListingRecord;
use listing_cleaner::infra::json_input_adapter::parse_listings;
use listing_cleaner::infra::{JsonFileInputAdapter, JsonLinesOutputAdapter, MemoryOutputAdapter};
use listing_cleaner::pipeline::processing::dedup::KeepPolicy;

fn raw_batch() -> Vec<ListingRecord> {
    let raw = json!([
        {
            "source": "BizBuySell",
            "url": "https://www.bizbuysell.com/business-opportunity/hvac-company/2201/",
            "name": "Established HVAC Company With Service Contracts",
            "price": "Asking Price: $1,250,000",
            "revenue": "Gross Revenue: $2.1M",
            "cash_flow": "Cash Flow (SDE): $410K",
            "industry": "Building and Construction",
            "location": "Phoenix, AZ",
            "description": "Family owned for 22 years."
        },
        {
            "source": "BizBuySell",
            "url": "https://www.bizbuysell.com/business-opportunity/hvac-company/2201?utm_source=newsletter",
            "name": "Established HVAC Company With Service Contracts",
            "price": "$1,250,000",
            "industry": "Building and Construction",
            "location": "Phoenix, AZ"
        },
        {
            "source": "BizBuySell",
            "url": "https://www.bizbuysell.com/buy/",
            "name": "Established Businesses",
            "price": "Unlock Listing"
        },
        {
            "source": "QuietLight",
            "url": "https://quietlight.com/listings/17329/",
            "title": "Amazon FBA Brand In Outdoor Gear",
            "asking_price": "$3.4M",
            "annual_revenue": "Revenue: $4,000,000",
            "annual_profit": "SDE $850,000",
            "industry": "In Retail Outdoor Equipment",
            "location": "Remote, USA",
            "multiple": "4.0x"
        },
        {
            "source": "Flippa",
            "url": "https://flippa.com/11804455",
            "name": "Recipe Blog With Newsletter",
            "price": "Not Disclosed",
            "revenue": "$96,000",
            "profit": "$60,000",
            "industry": "Insights in your Mailbox",
            "location": "Toronto, Ontario (Canada)"
        }
    ]);
    parse_listings(&raw.to_string()).expect("fixture is a JSON array")
}

fn find<'a>(records: &'a [ListingRecord], source: &str) -> &'a ListingRecord {
    records
        .iter()
        .find(|r| r.source() == Some(source))
        .expect("record for source")
}

#[test]
fn test_clean_batch_end_to_end() -> Result<()> {
    let use_case = CleanListingsUseCase::from_config(&CleanerConfig::default())?;
    let mut output = MemoryOutputAdapter::default();

    let outcome = use_case.execute(raw_batch(), &mut output)?;

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(output.records, outcome.records);
    assert_eq!(outcome.report.input_records, 5);
    assert_eq!(outcome.report.quarantined, 1);
    assert_eq!(outcome.report.duplicates_removed(), 1);
    // "Not Disclosed" price and navigation-text industry on the blog listing
    assert_eq!(outcome.report.fields_nulled, 2);

    let hvac = find(&outcome.records, "BizBuySell");
    assert_eq!(hvac.number("price_numeric"), Some(1_250_000.0));
    assert_eq!(hvac.number("revenue_numeric"), Some(2_100_000.0));
    assert_eq!(hvac.number("profit_numeric"), Some(410_000.0));
    assert_eq!(hvac.text("location_standardized"), Some("United States - AZ"));
    assert_eq!(hvac.text("value_category"), Some("1m_5m"));
    assert_eq!(hvac.text("quality_decision"), Some("accept"));
    assert_eq!(hvac.text("listing_id").map(str::len), Some(64));

    let fba = find(&outcome.records, "QuietLight");
    assert_eq!(fba.number("price_to_revenue"), Some(0.85));
    assert_eq!(fba.number("price_to_profit"), Some(4.0));
    assert_eq!(fba.number("profit_margin_percent"), Some(21.25));
    assert_eq!(fba.text("industry_standardized"), Some("Outdoor & Recreation"));
    assert_eq!(fba.text("location_standardized"), Some("United States"));

    let blog = find(&outcome.records, "Flippa");
    assert_eq!(blog.get("price_numeric"), Some(&Value::Null));
    assert_eq!(blog.get("price_to_revenue"), Some(&Value::Null));
    assert_eq!(blog.get("industry"), Some(&Value::Null));
    assert_eq!(blog.number("profit_margin_percent"), Some(62.5));
    assert_eq!(blog.number("monthly_revenue"), Some(8_000.0));
    assert_eq!(blog.text("location_standardized"), Some("Ontario"));
    assert_eq!(blog.text("quality_decision"), Some("accept_with_warnings"));

    assert_eq!(outcome.report.by_source["BizBuySell"].records, 1);
    assert_eq!(outcome.report.overall.price.present, 2);
    Ok(())
}

#[test]
fn test_keep_last_and_flag_policy_from_config_file() -> Result<()> {
    let dir = tempdir()?;
    let config_path = dir.path().join("cleaner.toml");
    std::fs::write(
        &config_path,
        r#"
        [quality]
        noise_policy = "flag"

        [dedup]
        keep = "last"
        "#,
    )?;

    let config = CleanerConfig::load(&config_path)?;
    let use_case = CleanListingsUseCase::from_config(&config)?;
    let outcome = use_case.execute(raw_batch(), &mut MemoryOutputAdapter::default())?;

    // The later, query-tagged copy of the HVAC listing survives
    let hvac = find(&outcome.records, "BizBuySell");
    assert_eq!(hvac.text("revenue"), None);
    assert_eq!(hvac.get("revenue_numeric"), Some(&Value::Null));

    let blog = find(&outcome.records, "Flippa");
    assert_eq!(blog.text("industry"), Some("Insights in your Mailbox"));
    assert_eq!(blog.get("flagged_fields"), Some(&json!(["industry", "price"])));
    assert_eq!(outcome.report.fields_flagged, 2);
    assert_eq!(outcome.report.fields_nulled, 0);
    Ok(())
}

#[test]
fn test_file_round_trip_through_adapters() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("raw.jsonl");
    let output_path = dir.path().join("clean").join("listings.jsonl");

    let lines: Vec<String> = raw_batch()
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<_, _>>()?;
    std::fs::write(&input_path, lines.join("\n"))?;

    let records = JsonFileInputAdapter::new(&input_path).read_listings()?;
    assert_eq!(records.len(), 5);

    let use_case =
        CleanListingsUseCase::from_config(&CleanerConfig::default())?.with_keep(KeepPolicy::First);
    let mut sink = JsonLinesOutputAdapter::to_file(&output_path)?;
    let outcome = use_case.execute(records, &mut sink)?;
    assert_eq!(sink.written(), outcome.records.len());

    let written = parse_listings(&std::fs::read_to_string(&output_path)?)?;
    assert_eq!(written, outcome.records);

    let first = written[0].fields();
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(columns.first(), Some(&"source"));
    assert!(columns.contains(&"profit_margin_percent"));
    Ok(())
}

#[test]
fn test_empty_batch() -> Result<()> {
    let use_case = CleanListingsUseCase::from_config(&CleanerConfig::default())?;
    let mut output = MemoryOutputAdapter::default();
    let outcome = use_case.execute(Vec::new(), &mut output)?;

    output.finish()?;
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.report.overall.records, 0);
    Ok(())
}
