// Listing cleaning pipeline: per-record processing and run reporting

pub mod processing;
pub mod report;

pub use processing::dedup::{deduplicate, Deduplicator, KeepPolicy, KeyExtractor};
pub use processing::normalize::MoneyNormalizer;
pub use processing::quality_gate::noise::FieldValidator;
pub use processing::ratios::compute_ratios;
