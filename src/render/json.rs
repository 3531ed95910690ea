/// Writes each chart spec as pretty-printed JSON for an external renderer.

use super::{ChartSink, ChartSpec, OutputDir};
use crate::model::QuakeError;

pub struct JsonChartSink {
    dir: OutputDir,
}

impl JsonChartSink {
    pub fn new(dir: OutputDir) -> Self {
        JsonChartSink { dir }
    }
}

impl ChartSink for JsonChartSink {
    fn begin(&mut self) -> Result<(), QuakeError> {
        self.dir.reset()
    }

    fn emit(&mut self, chart: &ChartSpec) -> Result<(), QuakeError> {
        let body = serde_json::to_string_pretty(chart)?;
        self.dir.write(&chart.name, "json", &body)?;
        Ok(())
    }
}
