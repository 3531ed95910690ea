/// Earthquake record loader.
///
/// Reads the merged earthquake/weather export: a JSON array of objects, one
/// per event, each with city, magnitude, elevation, date, time and a nested
/// weather block. Field presence is not checked here; the classifier reports
/// missing fields with the offending record's context.

use std::fs;
use std::path::Path;

use crate::logging::{self, Component};
use crate::model::{QuakeError, Record};

/// Parses a JSON array of records.
pub fn parse_records(json: &str) -> Result<Vec<Record>, QuakeError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses the records file at `path`.
pub fn load_records(path: &Path) -> Result<Vec<Record>, QuakeError> {
    let text = fs::read_to_string(path)?;
    let records = parse_records(&text)?;
    logging::info(
        Component::Ingest,
        None,
        &format!("Loaded {} records from {}", records.len(), path.display()),
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"city": "X", "magnitude": 1.5, "elevation": 5, "date": "2020-03-10",
         "time": "08:00", "weather": {"rain_sum": 2}},
        {"city": "Y", "magnitude": 6.0, "elevation": 250, "date": "2021-07-01",
         "time": "20:00", "weather": {"rain_sum": 12, "wind_speed_10m_max": 14.2}}
    ]"#;

    #[test]
    fn test_parse_records_accepts_integer_numbers() {
        let records = parse_records(SAMPLE).expect("sample should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].elevation, Some(5.0));
        assert_eq!(records[1].rain_sum(), Some(12.0));
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        let result = parse_records(r#"{"city": "X"}"#);
        assert!(matches!(result, Err(QuakeError::Json(_))), "got {:?}", result);
    }

    #[test]
    fn test_parse_records_allows_empty_array() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_load_records_reports_missing_file() {
        let scratch = tempfile::tempdir().unwrap();
        let result = load_records(&scratch.path().join("missing.json"));
        assert!(matches!(result, Err(QuakeError::Io(_))), "got {:?}", result);
    }

    #[test]
    fn test_load_records_reads_file() {
        let scratch = tempfile::tempdir().unwrap();
        let path = scratch.path().join("merged_data.json");
        fs::write(&path, SAMPLE).unwrap();
        let records = load_records(&path).unwrap();
        assert_eq!(records[1].city.as_deref(), Some("Y"));
    }
}
