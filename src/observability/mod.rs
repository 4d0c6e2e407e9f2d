// Observability: metrics for cleaning runs

pub mod metrics;

pub use metrics::{init, render};
