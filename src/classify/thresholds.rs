//! Bucket boundaries for every classified dimension.
//!
//! A `RangeScheme` is an ordered list of half-open numeric ranges, each with
//! an exclusive lower bound and an inclusive upper bound:
//!
//!   (above, up_to]
//!
//! Either bound may be absent. Writing adjacent buckets as `(a, b]`, `(b, c]`
//! leaves no value unclassified, which is how the built-in profiles close the
//! gaps of the "2.1-3.0"-style labels (a magnitude of 2.05 belongs to
//! "2.1-3.0"). A custom scheme may still leave gaps; values falling into one
//! are reported as `QuakeError::InvalidCategory`.
//!
//! Time of day uses whole hours instead, as inclusive `from..=to` ranges with
//! a fallback label for every hour no range claims.

use serde::Deserialize;
use std::collections::HashSet;

use crate::model::{Category, Dimension, QuakeError};

// ---------------------------------------------------------------------------
// Numeric ranges
// ---------------------------------------------------------------------------

/// One named numeric bucket, `(above, up_to]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RangeBucket {
    pub label: String,
    #[serde(default)]
    pub above: Option<f64>,
    #[serde(default)]
    pub up_to: Option<f64>,
}

impl RangeBucket {
    /// `value <= limit`
    pub fn at_most(label: &str, limit: f64) -> Self {
        RangeBucket { label: label.to_string(), above: None, up_to: Some(limit) }
    }

    /// `lower < value <= upper`
    pub fn between(label: &str, lower: f64, upper: f64) -> Self {
        RangeBucket { label: label.to_string(), above: Some(lower), up_to: Some(upper) }
    }

    /// `value > limit`
    pub fn greater_than(label: &str, limit: f64) -> Self {
        RangeBucket { label: label.to_string(), above: Some(limit), up_to: None }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.above.map_or(true, |lower| value > lower) && self.up_to.map_or(true, |upper| value <= upper)
    }
}

/// Ordered numeric buckets for one dimension.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RangeScheme {
    pub buckets: Vec<RangeBucket>,
}

impl RangeScheme {
    pub fn new(buckets: Vec<RangeBucket>) -> Self {
        RangeScheme { buckets }
    }

    /// Returns the label of the first bucket containing `value`, or `None`
    /// if the value falls in a gap between buckets.
    pub fn classify(&self, value: f64) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.contains(value))
            .map(|b| b.label.as_str())
    }

    pub fn labels(&self) -> Vec<Category> {
        self.buckets.iter().map(|b| Category::label(&b.label)).collect()
    }

    /// Checks that buckets are non-empty, uniquely labelled and ascending
    /// without overlap. Only the last bucket may be unbounded above, and only
    /// the first unbounded below.
    pub fn validate(&self, dimension: Dimension) -> Result<(), QuakeError> {
        if self.buckets.is_empty() {
            return Err(QuakeError::Config(format!("{} scheme has no buckets", dimension)));
        }
        check_unique(dimension, self.buckets.iter().map(|b| b.label.as_str()))?;

        for (i, bucket) in self.buckets.iter().enumerate() {
            if let (Some(lower), Some(upper)) = (bucket.above, bucket.up_to) {
                if lower >= upper {
                    return Err(QuakeError::Config(format!(
                        "{} bucket '{}' is empty: ({}, {}]",
                        dimension, bucket.label, lower, upper
                    )));
                }
            }
            if i > 0 && bucket.above.is_none() {
                return Err(QuakeError::Config(format!(
                    "{} bucket '{}' needs a lower bound",
                    dimension, bucket.label
                )));
            }
            if let Some(next) = self.buckets.get(i + 1) {
                let upper = bucket.up_to.ok_or_else(|| {
                    QuakeError::Config(format!(
                        "{} bucket '{}' is unbounded but not last",
                        dimension, bucket.label
                    ))
                })?;
                if next.above.is_some_and(|lower| lower < upper) {
                    return Err(QuakeError::Config(format!(
                        "{} buckets '{}' and '{}' overlap",
                        dimension, bucket.label, next.label
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hours of the day
// ---------------------------------------------------------------------------

/// A named inclusive range of hours, `from..=to`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HourBucket {
    pub label: String,
    pub from: u32,
    pub to: u32,
}

impl HourBucket {
    pub fn new(label: &str, from: u32, to: u32) -> Self {
        HourBucket { label: label.to_string(), from, to }
    }
}

/// Time-of-day buckets plus the label for hours no bucket covers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HourScheme {
    pub buckets: Vec<HourBucket>,
    pub otherwise: String,
}

impl HourScheme {
    pub fn classify(&self, hour: u32) -> &str {
        self.buckets
            .iter()
            .find(|b| (b.from..=b.to).contains(&hour))
            .map(|b| b.label.as_str())
            .unwrap_or(self.otherwise.as_str())
    }

    /// Bucket labels in declaration order, fallback last.
    pub fn labels(&self) -> Vec<Category> {
        self.buckets
            .iter()
            .map(|b| b.label.as_str())
            .chain(std::iter::once(self.otherwise.as_str()))
            .map(Category::label)
            .collect()
    }

    pub fn validate(&self) -> Result<(), QuakeError> {
        let dimension = Dimension::TimeOfDay;
        check_unique(
            dimension,
            self.buckets
                .iter()
                .map(|b| b.label.as_str())
                .chain(std::iter::once(self.otherwise.as_str())),
        )?;
        let mut claimed = [false; 24];
        for bucket in &self.buckets {
            if bucket.from > bucket.to || bucket.to > 23 {
                return Err(QuakeError::Config(format!(
                    "{} bucket '{}' has invalid hours {}..={}",
                    dimension, bucket.label, bucket.from, bucket.to
                )));
            }
            for hour in bucket.from..=bucket.to {
                if std::mem::replace(&mut claimed[hour as usize], true) {
                    return Err(QuakeError::Config(format!(
                        "{} bucket '{}' overlaps another bucket at hour {}",
                        dimension, bucket.label, hour
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Complete scheme
// ---------------------------------------------------------------------------

/// The full set of bucket boundaries used to classify a record.
///
/// `rain` is optional: schemes without it never look at the weather block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassScheme {
    pub magnitude: RangeScheme,
    pub elevation: RangeScheme,
    #[serde(default)]
    pub rain: Option<RangeScheme>,
    pub time_of_day: HourScheme,
}

impl ClassScheme {
    pub fn validate(&self) -> Result<(), QuakeError> {
        self.magnitude.validate(Dimension::Magnitude)?;
        self.elevation.validate(Dimension::Elevation)?;
        if let Some(rain) = &self.rain {
            rain.validate(Dimension::Rain)?;
        }
        self.time_of_day.validate()
    }

    /// The full key set of a fixed-universe dimension, in scheme order.
    ///
    /// Returns `None` for open-ended dimensions (city, year, month) and for
    /// rain when the scheme does not classify it.
    pub fn universe(&self, dimension: Dimension) -> Option<Vec<Category>> {
        match dimension {
            Dimension::Magnitude => Some(self.magnitude.labels()),
            Dimension::Elevation => Some(self.elevation.labels()),
            Dimension::Rain => self.rain.as_ref().map(RangeScheme::labels),
            Dimension::TimeOfDay => Some(self.time_of_day.labels()),
            Dimension::City | Dimension::Year | Dimension::Month => None,
        }
    }
}

fn check_unique<'a>(
    dimension: Dimension,
    labels: impl Iterator<Item = &'a str>,
) -> Result<(), QuakeError> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(QuakeError::Config(format!(
                "{} scheme repeats bucket label '{}'",
                dimension, label
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
