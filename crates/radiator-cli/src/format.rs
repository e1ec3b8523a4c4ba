//! Output formatting for thermostat state.

use anyhow::Result;

use radiator_core::ControlRecord;

use crate::cli::OutputFormat;

/// Format a record in the requested format. The result has no trailing
/// newline.
pub fn format_record(record: &ControlRecord, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_record_text(record),
        OutputFormat::Terse => format_record_terse(record),
        OutputFormat::Json => serde_json::to_string_pretty(record)?,
    })
}

/// Half-degree values always have at most one decimal.
fn degrees(value: f32) -> String {
    format!("{value:.1}")
}

/// Three labelled lines.
pub fn format_record_text(record: &ControlRecord) -> String {
    format!(
        "current temperature: {} set temperature: {} offset: {}\n\
         auto => low: {} high: {}\n\
         open window => interval: {} duration: {}",
        degrees(record.current_temperature),
        degrees(record.manual_setpoint),
        degrees(record.calibration_offset),
        degrees(record.low_auto_setpoint),
        degrees(record.high_auto_setpoint),
        record.open_window_interval,
        record.open_window_duration,
    )
}

/// `current set offset`, space separated.
pub fn format_record_terse(record: &ControlRecord) -> String {
    format!(
        "{} {} {}",
        degrees(record.current_temperature),
        degrees(record.manual_setpoint),
        degrees(record.calibration_offset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ControlRecord {
        ControlRecord::decode(&[40, 42, 20, 28, 5, 10, 15])
    }

    #[test]
    fn test_text() {
        assert_eq!(
            format_record_text(&record()),
            "current temperature: 20.0 set temperature: 21.0 offset: 2.5\n\
             auto => low: 10.0 high: 14.0\n\
             open window => interval: 10 duration: 15"
        );
    }

    #[test]
    fn test_terse() {
        assert_eq!(format_record_terse(&record()), "20.0 21.0 2.5");
    }

    #[test]
    fn test_terse_shows_raw_offset_byte_value() {
        let record = ControlRecord::decode(&[40, 42, 20, 28, 251, 10, 15]);
        assert_eq!(format_record_terse(&record), "20.0 21.0 125.5");
    }

    #[test]
    fn test_json() {
        let json = format_record(&record(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["current_temperature"], 20.0);
        assert_eq!(value["manual_setpoint"], 21.0);
        assert_eq!(value["open_window_duration"], 15);
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(
            format_record(&record(), OutputFormat::Terse).unwrap(),
            "20.0 21.0 2.5"
        );
        assert!(
            format_record(&record(), OutputFormat::Text)
                .unwrap()
                .starts_with("current temperature: 20.0")
        );
    }
}
