// Analyzer module: aggregates submodules for different dashboard views.

pub mod dataset;
pub mod kpis;
pub mod rankings;
pub mod seasonal;
pub mod tiers;

// Re-export the types every consumer needs.
pub use dataset::{Dataset, FilterQuery};
pub use kpis::KpiSummary;
