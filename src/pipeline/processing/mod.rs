// Pipeline processing: normalization, validation, enrichment and deduplication

pub mod dedup;
pub mod enrich;
pub mod identity;
pub mod normalize;
pub mod quality_gate;
pub mod ratios;
