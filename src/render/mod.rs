//! Chart output.
//!
//! The aggregation core hands each finished table to a `ChartSink` as a
//! `ChartSpec` (labels, counts, title, output name). What happens next is the
//! sink's business: the SVG sink draws a pie chart, the JSON sink writes the
//! spec for an external renderer, and `MemorySink` keeps everything in memory
//! for tests. File sinks own an `OutputDir` that is cleared and recreated when
//! a run begins.

pub mod json;
pub mod output_dir;
pub mod svg;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::FrequencyTable;
use crate::model::QuakeError;

pub use json::JsonChartSink;
pub use output_dir::OutputDir;
pub use svg::SvgChartSink;

// ---------------------------------------------------------------------------
// Chart spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: u64,
}

/// Everything a renderer needs to draw one pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Output name without extension, e.g. "magnitude_distribution".
    pub name: String,
    pub title: String,
    pub slices: Vec<Slice>,
}

impl ChartSpec {
    pub fn from_table(name: &str, title: &str, table: &FrequencyTable) -> Self {
        ChartSpec {
            name: name.to_string(),
            title: title.to_string(),
            slices: table
                .iter()
                .map(|(label, count)| Slice { label: label.to_string(), count })
                .collect(),
        }
    }

    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.count).sum()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.slices.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.slices.iter().map(|s| s.count).collect()
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for rendered charts.
pub trait ChartSink {
    /// Called once before the first chart of a run.
    fn begin(&mut self) -> Result<(), QuakeError> {
        Ok(())
    }

    fn emit(&mut self, chart: &ChartSpec) -> Result<(), QuakeError>;
}

/// Prepares the sink and sends every chart to it, stopping at the first
/// failure. Returns the number of charts emitted.
pub fn emit_all(sink: &mut dyn ChartSink, charts: &[ChartSpec]) -> Result<usize, QuakeError> {
    sink.begin()?;
    for chart in charts {
        sink.emit(chart)?;
    }
    Ok(charts.len())
}

/// Collects charts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub charts: Vec<ChartSpec>,
    pub runs: usize,
}

impl MemorySink {
    pub fn find(&self, name: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.name == name)
    }
}

impl ChartSink for MemorySink {
    fn begin(&mut self) -> Result<(), QuakeError> {
        self.charts.clear();
        self.runs += 1;
        Ok(())
    }

    fn emit(&mut self, chart: &ChartSpec) -> Result<(), QuakeError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Svg,
    Json,
}

impl OutputFormat {
    /// A file sink of this format writing into `dir`.
    pub fn sink(self, dir: OutputDir) -> Box<dyn ChartSink> {
        match self {
            OutputFormat::Svg => Box::new(SvgChartSink::new(dir)),
            OutputFormat::Json => Box::new(JsonChartSink::new(dir)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Svg => write!(f, "svg"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(OutputFormat::Svg),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected svg or json)", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn spec() -> ChartSpec {
        let mut table = FrequencyTable::seeded(&[Category::label("a"), Category::label("b")]);
        table.increment(&Category::label("b"));
        table.increment(&Category::label("b"));
        ChartSpec::from_table("letters", "Letters", &table)
    }

    #[test]
    fn test_chart_spec_mirrors_table_order() {
        let chart = spec();
        assert_eq!(chart.labels(), vec!["a", "b"]);
        assert_eq!(chart.counts(), vec![0, 2]);
        assert_eq!(chart.total(), 2);
    }

    #[test]
    fn test_memory_sink_resets_between_runs() {
        let mut sink = MemorySink::default();
        emit_all(&mut sink, &[spec(), spec()]).unwrap();
        assert_eq!(sink.charts.len(), 2);
        let emitted = emit_all(&mut sink, &[spec()]).unwrap();
        assert_eq!(emitted, 1);
        assert_eq!(sink.charts.len(), 1, "begin() should clear the previous run");
        assert_eq!(sink.runs, 2);
        assert!(sink.find("letters").is_some());
    }

    #[test]
    fn test_output_format_parses() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::default(), OutputFormat::Svg);
        assert!("png".parse::<OutputFormat>().is_err());
    }
}
