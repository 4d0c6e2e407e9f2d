use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    MONTHLY_REVENUE_FIELD, PRICE_TO_PROFIT_FIELD, PRICE_TO_REVENUE_FIELD, PROFIT_MARGIN_FIELD,
    VALUE_CATEGORY_FIELD,
};
use crate::domain::ListingRecord;
use crate::pipeline::processing::normalize::MoneyFields;

/// Valuation ratios derived from the normalized financials
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    /// Asking price over annual revenue
    pub price_to_revenue: Option<f64>,
    /// Asking price over annual profit (the earnings multiple)
    pub price_to_profit: Option<f64>,
    /// Profit as a percentage of revenue
    pub profit_margin_percent: Option<f64>,
}

/// Compute the three ratios. A ratio is present only when both inputs are
/// present and its divisor is strictly positive.
pub fn compute_ratios(
    price: Option<f64>,
    revenue: Option<f64>,
    profit: Option<f64>,
) -> DerivedRatios {
    DerivedRatios {
        price_to_revenue: divide(price, revenue),
        price_to_profit: divide(price, profit),
        profit_margin_percent: divide(profit.map(|p| p * 100.0), revenue),
    }
}

fn divide(numerator: Option<f64>, divisor: Option<f64>) -> Option<f64> {
    match (numerator, divisor) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d).filter(|v| v.is_finite()),
        _ => None,
    }
}

pub fn monthly_revenue(revenue: Option<f64>) -> Option<f64> {
    revenue.map(|r| r / 12.0).filter(|v| v.is_finite())
}

/// Asking-price bucket. Upper bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueCategory {
    #[serde(rename = "under_100k")]
    Under100k,
    #[serde(rename = "100k_500k")]
    From100kTo500k,
    #[serde(rename = "500k_1m")]
    From500kTo1m,
    #[serde(rename = "1m_5m")]
    From1mTo5m,
    #[serde(rename = "over_5m")]
    Over5m,
}

impl ValueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueCategory::Under100k => "under_100k",
            ValueCategory::From100kTo500k => "100k_500k",
            ValueCategory::From500kTo1m => "500k_1m",
            ValueCategory::From1mTo5m => "1m_5m",
            ValueCategory::Over5m => "over_5m",
        }
    }
}

impl fmt::Display for ValueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn value_category(price: Option<f64>) -> Option<ValueCategory> {
    let price = price.filter(|p| p.is_finite() && *p > 0.0)?;
    let category = if price <= 100_000.0 {
        ValueCategory::Under100k
    } else if price <= 500_000.0 {
        ValueCategory::From100kTo500k
    } else if price <= 1_000_000.0 {
        ValueCategory::From500kTo1m
    } else if price <= 5_000_000.0 {
        ValueCategory::From1mTo5m
    } else {
        ValueCategory::Over5m
    };
    Some(category)
}

/// Write ratio, monthly revenue and value category fields onto a record
pub fn apply_ratios(record: &mut ListingRecord, money: &MoneyFields) -> DerivedRatios {
    let ratios = compute_ratios(money.price, money.revenue, money.profit);

    record.set_number(PRICE_TO_REVENUE_FIELD, ratios.price_to_revenue);
    record.set_number(PRICE_TO_PROFIT_FIELD, ratios.price_to_profit);
    record.set_number(PROFIT_MARGIN_FIELD, ratios.profit_margin_percent);
    record.set_number(MONTHLY_REVENUE_FIELD, monthly_revenue(money.revenue));
    record.set_text(
        VALUE_CATEGORY_FIELD,
        value_category(money.price).map(|c| c.as_str()),
    );

    ratios
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ratios_present() {
        let ratios = compute_ratios(Some(200_000.0), Some(100_000.0), Some(20_000.0));
        assert_eq!(ratios.price_to_revenue, Some(2.0));
        assert_eq!(ratios.price_to_profit, Some(10.0));
        assert_eq!(ratios.profit_margin_percent, Some(20.0));
    }

    #[test]
    fn test_missing_inputs_give_absent_ratios() {
        let ratios = compute_ratios(Some(200_000.0), None, Some(50_000.0));
        assert_eq!(ratios.price_to_revenue, None);
        assert_eq!(ratios.price_to_profit, Some(4.0));
        assert_eq!(ratios.profit_margin_percent, None);

        assert_eq!(compute_ratios(None, None, None), DerivedRatios::default());
    }

    #[test]
    fn test_non_positive_divisors_are_absent() {
        let ratios = compute_ratios(Some(200_000.0), Some(0.0), Some(-5_000.0));
        assert_eq!(ratios, DerivedRatios::default());
    }

    #[test]
    fn test_negative_profit_still_gives_margin() {
        let ratios = compute_ratios(None, Some(100_000.0), Some(-10_000.0));
        assert_eq!(ratios.profit_margin_percent, Some(-10.0));
    }

    #[test]
    fn test_value_category_bounds() {
        assert_eq!(value_category(Some(100_000.0)), Some(ValueCategory::Under100k));
        assert_eq!(value_category(Some(100_001.0)), Some(ValueCategory::From100kTo500k));
        assert_eq!(value_category(Some(1_000_000.0)), Some(ValueCategory::From500kTo1m));
        assert_eq!(value_category(Some(5_000_000.0)), Some(ValueCategory::From1mTo5m));
        assert_eq!(value_category(Some(12_000_000.0)), Some(ValueCategory::Over5m));
        assert_eq!(value_category(None), None);
    }

    #[test]
    fn test_apply_ratios_writes_nulls_not_blanks() {
        let mut record = ListingRecord::new().with("url", "https://a.com/1");
        let money = MoneyFields {
            price: Some(750_000.0),
            revenue: Some(1_200_000.0),
            profit: None,
        };

        apply_ratios(&mut record, &money);
        assert_eq!(record.number(PRICE_TO_REVENUE_FIELD), Some(0.625));
        assert_eq!(record.get(PRICE_TO_PROFIT_FIELD), Some(&serde_json::Value::Null));
        assert_eq!(record.number(MONTHLY_REVENUE_FIELD), Some(100_000.0));
        assert_eq!(record.text(VALUE_CATEGORY_FIELD), Some("500k_1m"));
    }
}
