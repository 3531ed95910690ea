//! Per-record classification.
//!
//! Maps the raw fields of a `Record` onto the discrete labels of a
//! `ClassScheme`. Classification is a pure function of the record and the
//! scheme; the record is never modified.
//!
//! Submodules:
//! - `thresholds` — bucket boundary types and their validation.

pub mod thresholds;

use chrono::{Datelike, NaiveDate};

use crate::model::{Category, Dimension, QuakeError, Record, RecordContext};
use thresholds::ClassScheme;

/// The labels derived from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub city: Category,
    pub magnitude: Category,
    pub elevation: Category,
    /// Present only when the scheme classifies rainfall.
    pub rain: Option<Category>,
    pub time_of_day: Category,
    pub year: Category,
    pub month: Category,
}

impl Classification {
    /// The label this record carries for `dimension`.
    pub fn get(&self, dimension: Dimension) -> Option<&Category> {
        match dimension {
            Dimension::City => Some(&self.city),
            Dimension::Magnitude => Some(&self.magnitude),
            Dimension::Elevation => Some(&self.elevation),
            Dimension::Rain => self.rain.as_ref(),
            Dimension::TimeOfDay => Some(&self.time_of_day),
            Dimension::Year => Some(&self.year),
            Dimension::Month => Some(&self.month),
        }
    }
}

/// Classifies the record at position `index` of the input.
///
/// Fails with `MissingField` when a required field is absent (rain only
/// counts as required when the scheme has rain buckets), with `Parse` for a
/// malformed date or time, and with `InvalidCategory` when a value lands in
/// a gap of a custom scheme.
pub fn classify_record(
    record: &Record,
    index: usize,
    scheme: &ClassScheme,
) -> Result<Classification, QuakeError> {
    let context = record.context(index);
    let missing = |field: &'static str| QuakeError::MissingField {
        field,
        context: context.clone(),
    };

    let city = record.city.as_deref().ok_or_else(|| missing("city"))?;
    let magnitude = record.magnitude.ok_or_else(|| missing("magnitude"))?;
    let elevation = record.elevation.ok_or_else(|| missing("elevation"))?;
    let date = record.date.as_deref().ok_or_else(|| missing("date"))?;
    let time = record.time.as_deref().ok_or_else(|| missing("time"))?;

    let rain = match &scheme.rain {
        Some(rain_scheme) => {
            let rain_sum = record.rain_sum().ok_or_else(|| missing("weather.rain_sum"))?;
            Some(bucket(rain_scheme, Dimension::Rain, rain_sum, &context)?)
        }
        None => None,
    };

    let (year, month) = parse_year_month(date, &context)?;
    let hour = parse_hour(time, &context)?;

    Ok(Classification {
        city: Category::label(city),
        magnitude: bucket(&scheme.magnitude, Dimension::Magnitude, magnitude, &context)?,
        elevation: bucket(&scheme.elevation, Dimension::Elevation, elevation, &context)?,
        rain,
        time_of_day: Category::label(scheme.time_of_day.classify(hour)),
        year: Category::Year(year),
        month: Category::Month(month),
    })
}

fn bucket(
    scheme: &thresholds::RangeScheme,
    dimension: Dimension,
    value: f64,
    context: &RecordContext,
) -> Result<Category, QuakeError> {
    scheme
        .classify(value)
        .map(Category::label)
        .ok_or_else(|| QuakeError::InvalidCategory {
            dimension,
            value,
            context: context.clone(),
        })
}

/// Parses a "YYYY-MM-DD" date into its calendar year and month.
///
/// The string must be exactly four digits, '-', two digits, '-', two digits;
/// chrono then checks that it names a real calendar day.
pub fn parse_year_month(date: &str, context: &RecordContext) -> Result<(i32, u32), QuakeError> {
    let parse_error = || QuakeError::Parse {
        field: "date",
        value: date.to_string(),
        context: context.clone(),
    };
    if !is_iso_date_shape(date) {
        return Err(parse_error());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|_| parse_error())
}

fn is_iso_date_shape(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parses the hour from the leading ":"-delimited part of a time string.
///
/// "08:00", "8:00:00" and "23" are accepted; anything whose leading part is
/// not an integer in 0..=23 is a parse error.
pub fn parse_hour(time: &str, context: &RecordContext) -> Result<u32, QuakeError> {
    let leading = time.split(':').next().unwrap_or_default();
    leading
        .parse::<u32>()
        .ok()
        .filter(|hour| *hour < 24)
        .ok_or_else(|| QuakeError::Parse {
            field: "time",
            value: time.to_string(),
            context: context.clone(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
