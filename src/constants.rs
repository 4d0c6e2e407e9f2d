/// Field name constants shared by the cleaning stages and the export layer.
/// Raw fields are read through alias lists because every marketplace
/// scraper named its columns a little differently.
// Identity fields
pub const SOURCE_FIELD: &str = "source";
pub const URL_FIELD: &str = "url";
pub const LISTING_ID_FIELD: &str = "listing_id";
pub const NAME_ALIASES: &[&str] = &["name", "title"];

// Raw financial fields
pub const PRICE_RAW_ALIASES: &[&str] = &["price_raw", "price", "asking_price"];
pub const REVENUE_RAW_ALIASES: &[&str] = &["revenue_raw", "revenue", "annual_revenue"];
pub const PROFIT_RAW_ALIASES: &[&str] = &["profit_raw", "profit", "cash_flow", "annual_profit"];
pub const MULTIPLE_FIELD: &str = "multiple";

// Free text fields
pub const INDUSTRY_FIELD: &str = "industry";
pub const LOCATION_FIELD: &str = "location";
pub const DESCRIPTION_FIELD: &str = "description";

// Numeric companions written by the normalizer
pub const PRICE_NUMERIC_FIELD: &str = "price_numeric";
pub const REVENUE_NUMERIC_FIELD: &str = "revenue_numeric";
pub const PROFIT_NUMERIC_FIELD: &str = "profit_numeric";

// Derived fields
pub const PRICE_TO_REVENUE_FIELD: &str = "price_to_revenue";
pub const PRICE_TO_PROFIT_FIELD: &str = "price_to_profit";
pub const PROFIT_MARGIN_FIELD: &str = "profit_margin_percent";
pub const MONTHLY_REVENUE_FIELD: &str = "monthly_revenue";
pub const VALUE_CATEGORY_FIELD: &str = "value_category";
pub const LOCATION_STANDARDIZED_FIELD: &str = "location_standardized";
pub const STATE_FIELD: &str = "state";
pub const INDUSTRY_STANDARDIZED_FIELD: &str = "industry_standardized";
pub const QUALITY_DECISION_FIELD: &str = "quality_decision";
pub const QUALITY_SCORE_FIELD: &str = "quality_score";
pub const COMPLETENESS_FIELD: &str = "completeness_percent";
pub const FLAGGED_FIELDS_FIELD: &str = "flagged_fields";

// Defaults
pub const DEFAULT_NAME_PREFIX_LEN: usize = 50;
pub const DEFAULT_MIN_NAME_LEN: usize = 8;
pub const DEFAULT_MIN_QUALITY_SCORE: f64 = 0.6;
pub const CONFIG_PATH_ENV: &str = "LISTING_CLEANER_CONFIG";
