//! CSV parser for sample files.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::quality::is_valid_reading;
use crate::sample::NewSample;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Decodes un-graded sample rows from CSV bytes with a header row.
///
/// # Errors
///
/// Returns an error naming the offending line if a row cannot be decoded.
pub fn parse_samples(bytes: &[u8]) -> Result<Vec<NewSample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let record: NewSample = result.with_context(|| format!("Invalid sample row {}", i + 1))?;
        rows.push(record);
    }

    Ok(rows)
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date. Naive values are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

/// Blank, non-numeric, non-finite or negative readings are absent rather
/// than errors.
pub(crate) fn deserialize_reading<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| is_valid_reading(*v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::Grade;
    use chrono::TimeZone;

    #[test]
    fn test_parse_empty_bytes_returns_no_rows() {
        let rows = parse_samples(&[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_minimal_rows() {
        let csv = "\
river_name,method,sampling_date,detection_date,cod,ammonia_nitrogen,total_phosphorus,permanganate
Qinhuai,grab,2024-05-01 09:00:00,2024-05-02,15,0.1,0.01,1
Qinhuai,, 2024-05-03 ,2024-05-04,,n/a,,
";
        let rows = parse_samples(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].river_name, "Qinhuai");
        assert_eq!(rows[0].method.as_deref(), Some("grab"));
        assert_eq!(rows[0].cod, Some(15.0));
        assert_eq!(
            rows[0].sampling_date,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
        );

        assert_eq!(rows[1].method, None);
        assert_eq!(rows[1].cod, None);
        assert_eq!(rows[1].ammonia_nitrogen, None);
    }

    #[test]
    fn test_parse_drops_invalid_readings() {
        let csv = "\
river_name,sampling_date,detection_date,cod,ammonia_nitrogen,total_phosphorus,permanganate
A,2024-05-01,2024-05-02,NaN,inf,-0.2,0
";
        let rows = parse_samples(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].cod, None);
        assert_eq!(rows[0].ammonia_nitrogen, None);
        assert_eq!(rows[0].total_phosphorus, None);
        assert_eq!(rows[0].permanganate, Some(0.0));
    }

    #[test]
    fn test_parse_grade_overrides() {
        let csv = "\
river_name,sampling_date,detection_date,cod,composite_grade
Qinhuai,2024-05-01,2024-05-02,10,重度黑臭
";
        let rows = parse_samples(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].composite_grade, Some(Grade::SevereBlackOdor));
        assert_eq!(rows[0].cod_grade, None);
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        let csv = "river_name,sampling_date,detection_date\nQinhuai,yesterday,2024-05-02\n";
        assert!(parse_samples(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01"), Some(expected));
        assert_eq!(parse_timestamp("2024/05/01"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T08:00:00+08:00"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }
}
