// Analyzer module: scoring rules, indicator math and chart series.

pub mod indicators;
pub mod scoring;
pub mod series;

pub use scoring::analyze;
