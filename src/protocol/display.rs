//! Human-readable rendering of telemetry for operators and the console.

use super::{EventRecord, SensorReading};
use chrono::{Local, TimeZone};

/// Format epoch seconds as local time, `YYYY-MM-DD HH:MM:SS ZZZ`.
pub fn format_timestamp(timestamp: u32) -> String {
    Local
        .timestamp_opt(i64::from(timestamp), 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S %Z").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Multi-line rendering of a sensor reading as delivered to operators.
pub fn sensor_reading_to_string(reading: &SensorReading) -> String {
    format!(
        "Temperature: {}°C\nHumidity: {}%\nLight: {}%\nMode: {}\nVoltage: {:.2}V\nTimestamp: {}\nLocal Time: {}\n",
        reading.temp,
        reading.humidity,
        reading.light,
        reading.mode,
        reading.voltage,
        reading.timestamp,
        format_timestamp(reading.timestamp),
    )
}

/// Two-line rendering of an event record as delivered to operators.
pub fn event_record_to_string(record: &EventRecord) -> String {
    format!(
        "Event: {}\nTimestamp: {}",
        record.event, record.timestamp
    )
}

/// Console report for an unsolicited beacon.
pub fn print_beacon(reading: &SensorReading) {
    println!("Beacon Data:");
    println!("Mode: {}", reading.mode);
    println!("Timestamp: {}", reading.timestamp);
    println!("Local Time: {}", format_timestamp(reading.timestamp));
    println!("-----------------");
}

/// Console report for a satellite event.
pub fn print_event(record: &EventRecord) {
    println!("Event: {}", record.event);
    println!("Timestamp: {}", record.timestamp);
    println!("Local Time: {}", format_timestamp(record.timestamp));
    println!("-----------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{EventKind, Mode};

    #[test]
    fn sensor_rendering_lists_every_field() {
        let reading = SensorReading {
            timestamp: 10_000_000,
            temp: 20,
            humidity: 45,
            light: 50,
            mode: Mode::Ok,
            voltage: 2.1,
        };
        let text = sensor_reading_to_string(&reading);
        assert!(text.contains("Temperature: 20°C"));
        assert!(text.contains("Humidity: 45%"));
        assert!(text.contains("Light: 50%"));
        assert!(text.contains("Mode: OK"));
        assert!(text.contains("Voltage: 2.10V"));
        assert!(text.contains("Timestamp: 10000000"));
        assert!(text.contains("Local Time: "));
    }

    #[test]
    fn event_rendering() {
        let record = EventRecord {
            timestamp: 123,
            event: EventKind::SafeToOk,
        };
        assert_eq!(
            event_record_to_string(&record),
            "Event: Safe to OK\nTimestamp: 123"
        );
    }

    #[test]
    fn timestamp_formatting_shape() {
        // Zone name varies with the host; the date/time layout does not.
        let text = format_timestamp(10_000_000);
        assert!(text.starts_with("1970-04-26 ") || text.contains("-"));
        assert_eq!(text.matches(':').count(), 2);
    }
}
