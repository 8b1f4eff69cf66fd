use chrono::{Local, TimeZone};
use creeper_core::{NodeId, SpeedRecord};
use serde::Deserialize;
use serde_json::Value;

use crate::ApiError;

/// Body written by the manager for one measured node.
#[derive(Debug, Deserialize)]
struct SpeedReport {
    update: Option<f64>,
    result: Option<SpeedResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpeedResult {
    connection_time: String,
    download_speed: String,
    average_dl_speed: String,
}

/// Extracts the number from texts such as `3.52MiB/s`.
pub fn parse_speed_text(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// `YYYY-mm-dd HH:MM:SS` in `tz` for unix seconds `secs`.
pub fn format_update_time<Tz>(secs: f64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    tz.timestamp_opt(whole, nanos)
        .single()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Converts a test-speed response into a record. A report carrying an
/// error, or no result, is a failed test.
pub fn parse_speed_report(body: Value) -> Result<SpeedRecord, ApiError> {
    let report: SpeedReport =
        serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
    record_from_report(report, &Local)
}

fn record_from_report<Tz>(report: SpeedReport, tz: &Tz) -> Result<SpeedRecord, ApiError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if let Some(error) = report.error {
        return Err(ApiError::Rejected(error));
    }
    let result = report
        .result
        .ok_or_else(|| ApiError::Decode("speed result missing".to_string()))?;
    Ok(SpeedRecord {
        speed_number: parse_speed_text(&result.average_dl_speed),
        title: Some(format!(
            "Connection: {}, Download: {}",
            result.connection_time, result.download_speed
        )),
        result_text: result.average_dl_speed,
        last_updated_text: report
            .update
            .and_then(|secs| format_update_time(secs, tz))
            .unwrap_or_default(),
    })
}

/// Reads the manager's `speed.json`: node id → report. Entries that record
/// a failure are skipped so they never displace a display value.
pub fn parse_speed_cache(body: &Value) -> Vec<(NodeId, SpeedRecord)> {
    let Some(entries) = body.as_object() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|(node_id, entry)| {
            let report: SpeedReport = serde_json::from_value(entry.clone()).ok()?;
            let record = record_from_report(report, &Local).ok()?;
            Some((node_id.clone(), record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn speed_text_keeps_digits_and_dots() {
        assert_eq!(parse_speed_text("3.52MiB/s"), Some(3.52));
        assert_eq!(parse_speed_text("12MiB/s"), Some(12.0));
        assert_eq!(parse_speed_text("infMiB/s"), None);
        assert_eq!(parse_speed_text(""), None);
    }

    #[test]
    fn report_becomes_record() {
        let report: SpeedReport = serde_json::from_value(json!({
            "update": 1_700_000_000.25,
            "result": {
                "connection_time": "0.42s",
                "download_speed": "4.10MiB/s",
                "average_dl_speed": "3.50MiB/s"
            }
        }))
        .unwrap();
        let record = record_from_report(report, &Utc).unwrap();

        assert_eq!(record.result_text, "3.50MiB/s");
        assert_eq!(record.speed_number, Some(3.5));
        assert_eq!(
            record.title.as_deref(),
            Some("Connection: 0.42s, Download: 4.10MiB/s")
        );
        assert_eq!(record.last_updated_text, "2023-11-14 22:13:20");
    }

    #[test]
    fn error_report_is_a_failure() {
        let err = parse_speed_report(json!({"update": 1.0, "error": "Timeout: \"\""})).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[test]
    fn cache_skips_failures_and_garbage() {
        let cache = json!({
            "n1": {"update": 1.0, "result": {
                "connection_time": "1s", "download_speed": "1MiB/s", "average_dl_speed": "1MiB/s"
            }},
            "n2": {"update": 2.0, "error": "boom"},
            "n3": 17
        });
        let records = parse_speed_cache(&cache);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "n1");
    }
}
