/// Single-pass aggregation of classified records into frequency tables.
///
/// A `ReportPlan` lists which single-dimension charts and which cross
/// tabulations a run produces. `Aggregator` folds classifications into one
/// table per request; `Report` holds the finished tables and turns them into
/// chart specs for a sink.

use serde::Deserialize;
use std::collections::HashSet;

use super::frequency::{FrequencyTable, GroupedFrequencyTable};
use crate::classify::thresholds::ClassScheme;
use crate::classify::Classification;
use crate::model::{Category, Dimension, QuakeError};
use crate::render::ChartSpec;

/// Placeholder substituted with the group key in cross-tab names and titles.
pub const GROUP_PLACEHOLDER: &str = "{group}";

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One chart counting records per label of `dimension`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartRequest {
    pub dimension: Dimension,
    /// Output name without extension.
    pub name: String,
    pub title: String,
}

/// One chart per value of `group_by`, each counting `dimension`.
///
/// `name` and `title` must contain `{group}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrossTabRequest {
    pub group_by: Dimension,
    pub dimension: Dimension,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportPlan {
    #[serde(default)]
    pub charts: Vec<ChartRequest>,
    #[serde(default)]
    pub cross_tabs: Vec<CrossTabRequest>,
}

impl ReportPlan {
    /// Checks the plan against the scheme it will run with: every counted
    /// dimension must be classified, cross-tab names must be templated, and
    /// no two charts may share an output name.
    pub fn validate(&self, scheme: &ClassScheme) -> Result<(), QuakeError> {
        let needs_rain = self
            .charts
            .iter()
            .map(|c| c.dimension)
            .chain(self.cross_tabs.iter().flat_map(|x| [x.group_by, x.dimension]))
            .any(|d| d == Dimension::Rain);
        if needs_rain && scheme.rain.is_none() {
            return Err(QuakeError::Config(
                "plan counts rain but the scheme has no rain buckets".to_string(),
            ));
        }

        for cross in &self.cross_tabs {
            if !cross.name.contains(GROUP_PLACEHOLDER) {
                return Err(QuakeError::Config(format!(
                    "cross-tab name '{}' must contain {}",
                    cross.name, GROUP_PLACEHOLDER
                )));
            }
        }

        let mut names = HashSet::new();
        for name in self
            .charts
            .iter()
            .map(|c| &c.name)
            .chain(self.cross_tabs.iter().map(|x| &x.name))
        {
            if !names.insert(name.as_str()) {
                return Err(QuakeError::Config(format!("duplicate chart name '{}'", name)));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

pub struct Aggregator<'a> {
    plan: &'a ReportPlan,
    tables: Vec<FrequencyTable>,
    cross_tabs: Vec<GroupedFrequencyTable>,
    records: usize,
}

impl<'a> Aggregator<'a> {
    /// Creates empty tables for every request in `plan`. Fixed-universe
    /// dimensions start out with all of the scheme's labels at zero.
    pub fn new(plan: &'a ReportPlan, scheme: &ClassScheme) -> Result<Self, QuakeError> {
        plan.validate(scheme)?;
        let tables = plan
            .charts
            .iter()
            .map(|c| match scheme.universe(c.dimension) {
                Some(keys) => FrequencyTable::seeded(&keys),
                None => FrequencyTable::new(),
            })
            .collect();
        let cross_tabs = plan
            .cross_tabs
            .iter()
            .map(|x| GroupedFrequencyTable::new(scheme.universe(x.dimension)))
            .collect();
        Ok(Aggregator {
            plan,
            tables,
            cross_tabs,
            records: 0,
        })
    }

    pub fn add(&mut self, classification: &Classification) {
        self.records += 1;
        for (request, table) in self.plan.charts.iter().zip(self.tables.iter_mut()) {
            if let Some(key) = classification.get(request.dimension) {
                table.increment(key);
            }
        }
        for (request, grouped) in self.plan.cross_tabs.iter().zip(self.cross_tabs.iter_mut()) {
            if let (Some(group), Some(key)) = (
                classification.get(request.group_by),
                classification.get(request.dimension),
            ) {
                grouped.increment(group, key);
            }
        }
    }

    /// Finishes the fold, putting year and month keys in ascending order.
    pub fn finish(self) -> Report {
        let Aggregator { plan, mut tables, mut cross_tabs, records } = self;
        for (request, table) in plan.charts.iter().zip(tables.iter_mut()) {
            if request.dimension.is_chronological() {
                table.sort_keys();
            }
        }
        for (request, grouped) in plan.cross_tabs.iter().zip(cross_tabs.iter_mut()) {
            if request.group_by.is_chronological() {
                grouped.sort_groups();
            }
            if request.dimension.is_chronological() {
                grouped.sort_inner_keys();
            }
        }
        Report {
            charts: plan.charts.iter().cloned().zip(tables).collect(),
            cross_tabs: plan.cross_tabs.iter().cloned().zip(cross_tabs).collect(),
            records,
        }
    }
}

/// Aggregates a complete list of classifications in one pass.
pub fn aggregate(
    classified: &[Classification],
    plan: &ReportPlan,
    scheme: &ClassScheme,
) -> Result<Report, QuakeError> {
    let mut aggregator = Aggregator::new(plan, scheme)?;
    for classification in classified {
        aggregator.add(classification);
    }
    Ok(aggregator.finish())
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub charts: Vec<(ChartRequest, FrequencyTable)>,
    pub cross_tabs: Vec<(CrossTabRequest, GroupedFrequencyTable)>,
    /// Number of records folded in.
    pub records: usize,
}

impl Report {
    /// The table produced for the first chart counting `dimension`.
    pub fn table(&self, dimension: Dimension) -> Option<&FrequencyTable> {
        self.charts
            .iter()
            .find(|(request, _)| request.dimension == dimension)
            .map(|(_, table)| table)
    }

    /// The grouped table for the first cross-tab of `dimension` by `group_by`.
    pub fn cross_tab(&self, group_by: Dimension, dimension: Dimension) -> Option<&GroupedFrequencyTable> {
        self.cross_tabs
            .iter()
            .find(|(request, _)| request.group_by == group_by && request.dimension == dimension)
            .map(|(_, grouped)| grouped)
    }

    /// Every chart this report renders to: single-dimension charts first,
    /// then one chart per group of each cross-tab.
    ///
    /// Output names are unique. A cross-tab name that is already taken, by a
    /// single-dimension chart or by another group whose key sanitizes to the
    /// same text, gets a numeric suffix (`_2`, `_3`, ...).
    pub fn chart_specs(&self) -> Vec<ChartSpec> {
        let mut taken = HashSet::new();
        let mut specs: Vec<ChartSpec> = self
            .charts
            .iter()
            .map(|(request, table)| {
                let name = unique_name(&request.name, &mut taken);
                ChartSpec::from_table(&name, &request.title, table)
            })
            .collect();
        for (request, grouped) in &self.cross_tabs {
            for (group, table) in grouped.iter() {
                let candidate = request.name.replace(GROUP_PLACEHOLDER, &file_safe(group));
                let name = unique_name(&candidate, &mut taken);
                let title = request.title.replace(GROUP_PLACEHOLDER, &group.to_string());
                specs.push(ChartSpec::from_table(&name, &title, table));
            }
        }
        specs
    }
}

/// Claims `candidate` in `taken`, or the first free `candidate_N` (N >= 2).
fn unique_name(candidate: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(candidate.to_string()) {
        return candidate.to_string();
    }
    let mut n = 2;
    loop {
        let name = format!("{}_{}", candidate, n);
        if taken.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

/// Group keys such as city names end up in file names; keep letters, digits,
/// '-', '_' and '.', replace everything else with '_'.
pub fn file_safe(group: &Category) -> String {
    group
        .to_string()
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_record;
    use crate::model::Record;
    use crate::profiles::{by_city_plan, by_city_scheme, by_magnitude_plan, by_magnitude_scheme};

    fn sample() -> Vec<Record> {
        vec![
            Record::new("X", 1.5, 5.0, "2020-03-10", "08:00").with_rain(2.0),
            Record::new("X", 4.0, 50.0, "2020-03-15", "14:00").with_rain(8.0),
            Record::new("Y", 6.0, 250.0, "2021-07-01", "20:00").with_rain(12.0),
        ]
    }

    fn classify_all(records: &[Record], scheme: &ClassScheme) -> Vec<Classification> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| classify_record(r, i, scheme).expect("sample records classify"))
            .collect()
    }

    fn counts(table: &FrequencyTable) -> Vec<(String, u64)> {
        table.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_magnitude_table_for_three_records() {
        let scheme = by_city_scheme();
        let report = aggregate(&classify_all(&sample(), &scheme), &by_city_plan(), &scheme).unwrap();
        let magnitude = report.table(Dimension::Magnitude).expect("magnitude chart planned");
        assert_eq!(
            counts(magnitude),
            vec![
                ("≤2.0".to_string(), 1),
                ("2.1-3.0".to_string(), 0),
                ("3.1-5.0".to_string(), 1),
                (">5.0".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_magnitude_by_city_cross_tab() {
        let scheme = by_city_scheme();
        let report = aggregate(&classify_all(&sample(), &scheme), &by_city_plan(), &scheme).unwrap();
        let grouped = report
            .cross_tab(Dimension::City, Dimension::Magnitude)
            .expect("magnitude by city planned");
        let x = grouped.get(&Category::label("X")).unwrap();
        assert_eq!(x.get(&Category::label("≤2.0")), Some(1));
        assert_eq!(x.get(&Category::label("3.1-5.0")), Some(1));
        assert_eq!(x.get(&Category::label(">5.0")), Some(0));
        let y = grouped.get(&Category::label("Y")).unwrap();
        assert_eq!(y.get(&Category::label(">5.0")), Some(1));
        assert_eq!(y.total(), 1);
    }

    #[test]
    fn test_empty_input_keeps_fixed_universes() {
        let scheme = by_city_scheme();
        let report = aggregate(&[], &by_city_plan(), &scheme).unwrap();
        assert_eq!(report.records, 0);
        assert_eq!(report.table(Dimension::Magnitude).unwrap().len(), 4);
        assert_eq!(report.table(Dimension::TimeOfDay).unwrap().len(), 4);
        assert_eq!(report.table(Dimension::Elevation).unwrap().len(), 4);
        assert!(report.table(Dimension::City).unwrap().is_empty());
        assert!(report.table(Dimension::Year).unwrap().is_empty());
        for (_, table) in &report.charts {
            assert_eq!(table.total(), 0);
        }
        assert!(report.cross_tab(Dimension::City, Dimension::TimeOfDay).unwrap().is_empty());
    }

    #[test]
    fn test_year_and_month_tables_are_sorted() {
        let scheme = by_city_scheme();
        let records = vec![
            Record::new("X", 1.0, 1.0, "2022-11-01", "01:00"),
            Record::new("X", 1.0, 1.0, "2019-02-01", "01:00"),
            Record::new("X", 1.0, 1.0, "2020-05-01", "01:00"),
        ];
        let report = aggregate(&classify_all(&records, &scheme), &by_city_plan(), &scheme).unwrap();
        let years: Vec<_> = report.table(Dimension::Year).unwrap().keys().cloned().collect();
        assert_eq!(years, vec![Category::Year(2019), Category::Year(2020), Category::Year(2022)]);
        let months: Vec<_> = report.table(Dimension::Month).unwrap().keys().cloned().collect();
        assert_eq!(months, vec![Category::Month(2), Category::Month(5), Category::Month(11)]);
    }

    #[test]
    fn test_cross_tab_grouped_by_magnitude_counts_rain() {
        let scheme = by_magnitude_scheme();
        let report =
            aggregate(&classify_all(&sample(), &scheme), &by_magnitude_plan(), &scheme).unwrap();
        let rain = report.cross_tab(Dimension::Magnitude, Dimension::Rain).unwrap();
        let groups: Vec<_> = rain.groups().map(|g| g.to_string()).collect();
        assert_eq!(groups, vec!["low_mag", "medium_mag", "high_mag"]);
        let high = rain.get(&Category::label("high_mag")).unwrap();
        assert_eq!(high.get(&Category::label("rain_sum_high")), Some(1));
        assert_eq!(high.len(), 3, "rain universe is seeded in every group");
    }

    #[test]
    fn test_rain_plan_rejected_for_scheme_without_rain() {
        let plan = by_magnitude_plan();
        let result = Aggregator::new(&plan, &by_city_scheme());
        assert!(matches!(result, Err(QuakeError::Config(_))));
    }

    #[test]
    fn test_untemplated_cross_tab_name_is_rejected() {
        let plan = ReportPlan {
            charts: vec![],
            cross_tabs: vec![CrossTabRequest {
                group_by: Dimension::City,
                dimension: Dimension::Magnitude,
                name: "magnitude".to_string(),
                title: "Magnitude".to_string(),
            }],
        };
        assert!(plan.validate(&by_city_scheme()).is_err());
    }

    #[test]
    fn test_duplicate_chart_names_are_rejected() {
        let chart = ChartRequest {
            dimension: Dimension::City,
            name: "cities".to_string(),
            title: "Cities".to_string(),
        };
        let plan = ReportPlan { charts: vec![chart.clone(), chart], cross_tabs: vec![] };
        assert!(plan.validate(&by_city_scheme()).is_err());
    }

    #[test]
    fn test_chart_specs_substitute_group_names() {
        let scheme = by_city_scheme();
        let records = vec![Record::new("San Andreas/North", 3.0, 1.0, "2020-01-01", "09:00")];
        let report = aggregate(&classify_all(&records, &scheme), &by_city_plan(), &scheme).unwrap();
        let specs = report.chart_specs();
        let spec = specs
            .iter()
            .find(|s| s.name == "magnitude_San_Andreas_North")
            .expect("per-city magnitude chart with a file-safe name");
        assert_eq!(spec.title, "Magnitude Distribution in San Andreas/North");
        assert_eq!(spec.total(), 1);
        assert_eq!(specs.len(), by_city_plan().charts.len() + 2);
    }

    #[test]
    fn test_colliding_group_names_get_distinct_outputs() {
        let scheme = by_city_scheme();
        let records = vec![
            Record::new("San Andreas", 1.0, 1.0, "2020-01-01", "09:00"),
            Record::new("San/Andreas", 4.0, 1.0, "2020-01-01", "09:00"),
            Record::new("distribution", 6.0, 1.0, "2020-01-01", "09:00"),
        ];
        let report = aggregate(&classify_all(&records, &scheme), &by_city_plan(), &scheme).unwrap();
        let specs = report.chart_specs();

        let names: HashSet<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), specs.len(), "every chart needs its own output name");

        let global = specs.iter().find(|s| s.name == "magnitude_distribution").unwrap();
        assert_eq!(global.title, "Earthquake Magnitude Distribution");
        assert_eq!(global.total(), 3, "the whole-dataset chart must not be replaced");

        let city = specs.iter().find(|s| s.name == "magnitude_distribution_2").unwrap();
        assert_eq!(city.title, "Magnitude Distribution in distribution");

        let slash = specs.iter().find(|s| s.name == "magnitude_San_Andreas_2").unwrap();
        assert_eq!(slash.title, "Magnitude Distribution in San/Andreas");
        assert!(specs.iter().any(|s| s.name == "magnitude_San_Andreas"));
    }
}
