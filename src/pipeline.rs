/// One complete run: classify every record, aggregate, emit the charts.
///
/// The error policy applies uniformly: under `Abort` the first record that
/// cannot be classified ends the run before the sink is touched, so a
/// partially filled legend is never rendered. Under `Skip` the record is
/// logged and left out of every table.

use crate::analysis::aggregate;
use crate::classify::thresholds::ClassScheme;
use crate::classify::{classify_record, Classification};
use crate::config::{ErrorPolicy, Settings};
use crate::logging::{self, Component};
use crate::model::{QuakeError, Record};
use crate::render::{emit_all, ChartSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub classified: usize,
    pub skipped: usize,
    pub charts: usize,
}

/// Classifies `records` under `policy`, returning the classifications and
/// the number of records skipped.
pub fn classify_all(
    records: &[Record],
    scheme: &ClassScheme,
    policy: ErrorPolicy,
) -> Result<(Vec<Classification>, usize), QuakeError> {
    let mut classified = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.iter().enumerate() {
        match classify_record(record, index, scheme) {
            Ok(c) => classified.push(c),
            Err(err) => match policy {
                ErrorPolicy::Abort => {
                    logging::log_record_failure(&err, false);
                    return Err(err);
                }
                ErrorPolicy::Skip => {
                    logging::log_record_failure(&err, true);
                    skipped += 1;
                }
            },
        }
    }
    Ok((classified, skipped))
}

/// Runs the whole pipeline over in-memory records into `sink`.
pub fn run(
    records: &[Record],
    settings: &Settings,
    sink: &mut dyn ChartSink,
) -> Result<RunSummary, QuakeError> {
    let scheme = settings.scheme()?;
    let plan = settings.plan();
    logging::debug(
        Component::System,
        None,
        &format!("profile {}, {} charts planned", settings.profile, plan.charts.len()),
    );

    let (classified, skipped) = classify_all(records, &scheme, settings.on_error)?;
    let report = aggregate(&classified, &plan, &scheme)?;
    logging::debug(
        Component::Aggregate,
        None,
        &format!("{} records aggregated", report.records),
    );

    let specs = report.chart_specs();
    let charts = emit_all(sink, &specs)?;
    logging::info(Component::Render, None, &format!("Emitted {} charts", charts));

    let summary = RunSummary {
        total: records.len(),
        classified: classified.len(),
        skipped,
        charts,
    };
    logging::log_run_summary(summary.total, summary.classified, summary.skipped, summary.charts);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemorySink;

    fn records() -> Vec<Record> {
        vec![
            Record::new("X", 1.5, 5.0, "2020-03-10", "08:00"),
            Record::new("Z", 3.0, 10.0, "2020-01-01", "noon"),
            Record::new("Y", 6.0, 250.0, "2021-07-01", "20:00"),
        ]
    }

    #[test]
    fn test_abort_policy_writes_nothing() {
        let mut sink = MemorySink::default();
        let result = run(&records(), &Settings::default(), &mut sink);
        assert!(matches!(result, Err(QuakeError::Parse { field: "time", .. })), "got {:?}", result);
        assert_eq!(sink.runs, 0, "sink must not be prepared after an aborted run");
    }

    #[test]
    fn test_skip_policy_drops_only_bad_record() {
        let settings = Settings { on_error: ErrorPolicy::Skip, ..Settings::default() };
        let mut sink = MemorySink::default();
        let summary = run(&records(), &settings, &mut sink).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.classified, 2);
        assert_eq!(summary.skipped, 1);
        let cities = sink.find("city_distribution").unwrap();
        assert_eq!(cities.labels(), vec!["X", "Y"]);
        assert_eq!(cities.total(), 2);
    }

    #[test]
    fn test_empty_input_still_emits_every_planned_chart() {
        let mut sink = MemorySink::default();
        let summary = run(&[], &Settings::default(), &mut sink).unwrap();
        assert_eq!(summary.charts, 6, "no groups means no cross-tab charts");
        assert_eq!(sink.find("magnitude_distribution").unwrap().slices.len(), 4);
    }
}
