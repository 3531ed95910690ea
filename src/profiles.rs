/// Built-in classification profiles.
///
/// A profile pairs a bucket scheme with the charts produced from it. This is
/// the single source of truth for the default thresholds; the configuration
/// file may replace a profile's scheme but starts from these.
///
///   by_city       magnitude, elevation and time-of-day buckets, with
///                 per-city magnitude and time-of-day breakdowns
///   by_magnitude  finer elevation and time-of-day buckets plus rainfall,
///                 with per-magnitude-class breakdowns

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::analysis::{ChartRequest, CrossTabRequest, ReportPlan};
use crate::classify::thresholds::{ClassScheme, HourBucket, HourScheme, RangeBucket, RangeScheme};
use crate::model::Dimension;

// ---------------------------------------------------------------------------
// Profile selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    ByCity,
    ByMagnitude,
}

impl Profile {
    pub fn scheme(self) -> ClassScheme {
        match self {
            Profile::ByCity => by_city_scheme(),
            Profile::ByMagnitude => by_magnitude_scheme(),
        }
    }

    pub fn plan(self) -> ReportPlan {
        match self {
            Profile::ByCity => by_city_plan(),
            Profile::ByMagnitude => by_magnitude_plan(),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::ByCity => write!(f, "by_city"),
            Profile::ByMagnitude => write!(f, "by_magnitude"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_city" => Ok(Profile::ByCity),
            "by_magnitude" => Ok(Profile::ByMagnitude),
            other => Err(format!("unknown profile '{}' (expected by_city or by_magnitude)", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// by_city
// ---------------------------------------------------------------------------

pub fn by_city_scheme() -> ClassScheme {
    ClassScheme {
        magnitude: RangeScheme::new(vec![
            RangeBucket::at_most("≤2.0", 2.0),
            RangeBucket::between("2.1-3.0", 2.0, 3.0),
            RangeBucket::between("3.1-5.0", 3.0, 5.0),
            RangeBucket::greater_than(">5.0", 5.0),
        ]),
        elevation: RangeScheme::new(vec![
            RangeBucket::at_most("≤10", 10.0),
            RangeBucket::between("11-80", 10.0, 80.0),
            RangeBucket::between("81-200", 80.0, 200.0),
            RangeBucket::greater_than("≥200", 200.0),
        ]),
        rain: None,
        time_of_day: HourScheme {
            buckets: vec![
                HourBucket::new("Morning", 0, 11),
                HourBucket::new("Afternoon", 12, 14),
                HourBucket::new("Evening", 15, 18),
            ],
            otherwise: "Night".to_string(),
        },
    }
}

pub fn by_city_plan() -> ReportPlan {
    ReportPlan {
        charts: vec![
            chart(Dimension::City, "city_distribution", "Earthquake Distribution by City"),
            chart(Dimension::Magnitude, "magnitude_distribution", "Earthquake Magnitude Distribution"),
            chart(Dimension::Year, "year_distribution", "Earthquakes by Year"),
            chart(Dimension::Month, "month_distribution", "Earthquakes by Month"),
            chart(Dimension::TimeOfDay, "time_distribution", "Earthquakes by Time of Day"),
            chart(Dimension::Elevation, "elevation_distribution", "Earthquakes by Elevation"),
        ],
        cross_tabs: vec![
            cross_tab(
                Dimension::City,
                Dimension::Magnitude,
                "magnitude_{group}",
                "Magnitude Distribution in {group}",
            ),
            cross_tab(
                Dimension::City,
                Dimension::TimeOfDay,
                "time_{group}",
                "Time Distribution in {group}",
            ),
        ],
    }
}

// ---------------------------------------------------------------------------
// by_magnitude
// ---------------------------------------------------------------------------

/// The medium magnitude class covers (2, 5] so that values between the
/// "≤2" and "3–5" classes are not left unclassified.
pub fn by_magnitude_scheme() -> ClassScheme {
    ClassScheme {
        magnitude: RangeScheme::new(vec![
            RangeBucket::at_most("low_mag", 2.0),
            RangeBucket::between("medium_mag", 2.0, 5.0),
            RangeBucket::greater_than("high_mag", 5.0),
        ]),
        elevation: RangeScheme::new(vec![
            RangeBucket::at_most("below sea-level", 10.0),
            RangeBucket::between("sea-level", 10.0, 30.0),
            RangeBucket::between("ground_level", 30.0, 60.0),
            RangeBucket::between("ground_level_mid", 60.0, 90.0),
            RangeBucket::greater_than("ground_level_high", 90.0),
        ]),
        rain: Some(RangeScheme::new(vec![
            RangeBucket::at_most("rain_sum_low", 5.0),
            RangeBucket::between("rain_sum_medium", 5.0, 10.0),
            RangeBucket::greater_than("rain_sum_high", 10.0),
        ])),
        time_of_day: HourScheme {
            buckets: vec![
                HourBucket::new("morning", 0, 9),
                HourBucket::new("mid_morning", 10, 12),
                HourBucket::new("afternoon", 13, 16),
                HourBucket::new("evening", 17, 19),
            ],
            otherwise: "night".to_string(),
        },
    }
}

pub fn by_magnitude_plan() -> ReportPlan {
    ReportPlan {
        charts: vec![
            chart(Dimension::TimeOfDay, "time_of_day_distribution", "Time of Day Distribution"),
            chart(Dimension::Magnitude, "magnitude_distribution", "Magnitude Distribution"),
            chart(
                Dimension::Elevation,
                "elevation_category_distribution",
                "Elevation Category Distribution",
            ),
            chart(
                Dimension::Rain,
                "rainfall_category_distribution",
                "Rainfall Category Distribution",
            ),
            chart(Dimension::Year, "yearly_distribution", "Yearly Distribution"),
            chart(Dimension::Month, "monthly_distribution", "Monthly Distribution"),
        ],
        cross_tabs: vec![
            cross_tab(
                Dimension::Magnitude,
                Dimension::TimeOfDay,
                "time_of_day_by_{group}",
                "Time of Day by {group} Magnitude",
            ),
            cross_tab(
                Dimension::Magnitude,
                Dimension::Rain,
                "rain_by_{group}",
                "Rainfall by {group} Magnitude",
            ),
        ],
    }
}

fn chart(dimension: Dimension, name: &str, title: &str) -> ChartRequest {
    ChartRequest {
        dimension,
        name: name.to_string(),
        title: title.to_string(),
    }
}

fn cross_tab(group_by: Dimension, dimension: Dimension, name: &str, title: &str) -> CrossTabRequest {
    CrossTabRequest {
        group_by,
        dimension,
        name: name.to_string(),
        title: title.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
