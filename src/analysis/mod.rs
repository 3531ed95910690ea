/// Counting utilities for the chart generator.
///
/// This module turns classified records into frequency tables. It performs
/// no I/O: rendering is left to whatever `render::ChartSink` the caller
/// injects.
///
/// Submodules:
/// - `frequency` — single and grouped frequency tables.
/// - `aggregate` — report plans and the single-pass fold over records.

pub mod aggregate;
pub mod frequency;

pub use aggregate::{aggregate, Aggregator, ChartRequest, CrossTabRequest, Report, ReportPlan};
pub use frequency::{FrequencyTable, GroupedFrequencyTable};
