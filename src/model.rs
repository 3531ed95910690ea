/// Core data types for the earthquake chart generator.
///
/// This module defines the shared domain model imported by all other modules:
/// the input record, the discrete category labels records are bucketed into,
/// the dimensions a chart can count over, and the crate-wide error type.
/// It contains no classification or aggregation logic.

use serde::Deserialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One earthquake observation as supplied by the loader.
///
/// Every field is optional at the type level. A record lacking a field the
/// active scheme needs is rejected by the classifier with
/// `QuakeError::MissingField`, which names the record, rather than failing
/// the whole JSON document with an anonymous serde error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub date: Option<String>, // "YYYY-MM-DD"
    #[serde(default)]
    pub time: Option<String>, // "HH:MM" or "HH:MM:SS"
    #[serde(default)]
    pub weather: Option<Weather>,
}

/// Weather attributes attached to a record.
///
/// Only `rain_sum` takes part in classification; everything else the source
/// data carries (temperatures, wind, ...) is kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Weather {
    #[serde(default)]
    pub rain_sum: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Builds a complete record without weather data.
    pub fn new(city: &str, magnitude: f64, elevation: f64, date: &str, time: &str) -> Self {
        Record {
            city: Some(city.to_string()),
            magnitude: Some(magnitude),
            elevation: Some(elevation),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            weather: None,
        }
    }

    /// Attaches a weather block carrying the given daily rain sum.
    pub fn with_rain(mut self, rain_sum: f64) -> Self {
        self.weather = Some(Weather {
            rain_sum: Some(rain_sum),
            extra: serde_json::Map::new(),
        });
        self
    }

    /// Daily rain sum, if the weather block and the field are both present.
    pub fn rain_sum(&self) -> Option<f64> {
        self.weather.as_ref().and_then(|w| w.rain_sum)
    }

    /// Identifying context used in error messages and log lines.
    pub fn context(&self, index: usize) -> RecordContext {
        RecordContext {
            index,
            city: self.city.clone(),
            date: self.date.clone(),
        }
    }
}

/// Identifies a record for diagnostics: its position in the input plus the
/// city and date when those are known.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordContext {
    pub index: usize,
    pub city: Option<String>,
    pub date: Option<String>,
}

impl fmt::Display for RecordContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record #{}", self.index)?;
        match (&self.city, &self.date) {
            (Some(city), Some(date)) => write!(f, " ({}, {})", city, date),
            (Some(city), None) => write!(f, " ({})", city),
            (None, Some(date)) => write!(f, " ({})", date),
            (None, None) => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Categories and dimensions
// ---------------------------------------------------------------------------

/// A discrete label a record is counted under.
///
/// Years and months are kept numeric so chronological tables sort by value,
/// not by their rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Label(String),
    Year(i32),
    Month(u32),
}

impl Category {
    pub fn label(s: &str) -> Self {
        Category::Label(s.to_string())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Label(s) => write!(f, "{}", s),
            Category::Year(y) => write!(f, "{}", y),
            Category::Month(m) => write!(f, "{:02}", m),
        }
    }
}

/// A record attribute that can be counted or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    City,
    Magnitude,
    Elevation,
    Rain,
    TimeOfDay,
    Year,
    Month,
}

impl Dimension {
    /// Dimensions whose keys are ordered chronologically for presentation.
    pub fn is_chronological(self) -> bool {
        matches!(self, Dimension::Year | Dimension::Month)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::City => "city",
            Dimension::Magnitude => "magnitude",
            Dimension::Elevation => "elevation",
            Dimension::Rain => "rain",
            Dimension::TimeOfDay => "time_of_day",
            Dimension::Year => "year",
            Dimension::Month => "month",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while loading, classifying, or emitting charts.
#[derive(Debug)]
pub enum QuakeError {
    /// A field the active scheme needs is absent from a record.
    MissingField {
        field: &'static str,
        context: RecordContext,
    },
    /// A date or time string does not have the expected shape.
    Parse {
        field: &'static str,
        value: String,
        context: RecordContext,
    },
    /// A value falls between the configured bucket boundaries.
    InvalidCategory {
        dimension: Dimension,
        value: f64,
        context: RecordContext,
    },
    /// The configuration file or a bucket scheme is unusable.
    Config(String),
    /// Reading input or writing charts failed.
    Io(std::io::Error),
    /// The input file is not a JSON array of records, or a chart could not
    /// be serialized.
    Json(serde_json::Error),
}

impl fmt::Display for QuakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuakeError::MissingField { field, context } => {
                write!(f, "Missing field '{}' in {}", field, context)
            }
            QuakeError::Parse { field, value, context } => {
                write!(f, "Parse error: {} '{}' in {}", field, value, context)
            }
            QuakeError::InvalidCategory { dimension, value, context } => write!(
                f,
                "Invalid category: {} value {} matches no bucket in {}",
                dimension, value, context
            ),
            QuakeError::Config(msg) => write!(f, "Config error: {}", msg),
            QuakeError::Io(e) => write!(f, "I/O error: {}", e),
            QuakeError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for QuakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuakeError::Io(e) => Some(e),
            QuakeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for QuakeError {
    fn from(e: std::io::Error) -> Self {
        QuakeError::Io(e)
    }
}

impl From<serde_json::Error> for QuakeError {
    fn from(e: serde_json::Error) -> Self {
        QuakeError::Json(e)
    }
}

impl From<toml::de::Error> for QuakeError {
    fn from(e: toml::de::Error) -> Self {
        QuakeError::Config(e.to_string())
    }
}

impl QuakeError {
    /// The field a per-record error concerns, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            QuakeError::MissingField { field, .. } | QuakeError::Parse { field, .. } => Some(field),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_with_nested_weather() {
        let json = r#"{
            "city": "Izmir",
            "magnitude": 4.2,
            "elevation": 35.0,
            "date": "2020-10-30",
            "time": "14:51:24",
            "weather": { "rain_sum": 3.4, "temperature_2m_max": 21.5 }
        }"#;
        let record: Record = serde_json::from_str(json).expect("valid record json");
        assert_eq!(record.city.as_deref(), Some("Izmir"));
        assert_eq!(record.rain_sum(), Some(3.4));
        let weather = record.weather.expect("weather block should be present");
        assert!(
            weather.extra.contains_key("temperature_2m_max"),
            "unknown weather attributes should be preserved"
        );
    }

    #[test]
    fn test_record_with_missing_fields_still_deserializes() {
        let record: Record = serde_json::from_str(r#"{"city": "Van"}"#).unwrap();
        assert_eq!(record.magnitude, None);
        assert_eq!(record.rain_sum(), None);
    }

    #[test]
    fn test_context_display_includes_city_and_date() {
        let record = Record::new("Van", 3.0, 1700.0, "2011-10-23", "10:41");
        assert_eq!(record.context(4).to_string(), "record #4 (Van, 2011-10-23)");
        assert_eq!(Record::default().context(0).to_string(), "record #0");
    }

    #[test]
    fn test_chronological_categories_order_numerically() {
        assert!(Category::Year(999) < Category::Year(2020));
        assert!(Category::Month(2) < Category::Month(11));
        assert_eq!(Category::Month(3).to_string(), "03");
    }

    #[test]
    fn test_missing_field_message_names_field_and_record() {
        let err = QuakeError::MissingField {
            field: "magnitude",
            context: Record::new("Elazig", 0.0, 0.0, "2020-01-24", "20:55").context(7),
        };
        let msg = err.to_string();
        assert!(msg.contains("magnitude"), "got: {}", msg);
        assert!(msg.contains("record #7 (Elazig, 2020-01-24)"), "got: {}", msg);
        assert_eq!(err.field(), Some("magnitude"));
    }
}
