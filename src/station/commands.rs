//! Operator text-command parsing.
//!
//! Commands arrive from the gateway as whitespace-separated tokens; parse
//! and range failures are reported to the originating operator only and
//! cause no wire traffic.

use super::{GroundStation, Operator};
use crate::protocol::display;
use std::sync::Arc;

const HELP_TEXT: &str = "🛰️ === SATELLITE COMMAND CENTER === 🛰️\n\n\
📊 SENSOR DATA COMMANDS:\n\
  • get_sensor_data         - Get the latest sensor readings\n\
  • get_recent_sensor_data  - Get sensor data from the last minute\n\n\
⏰ TIME MANAGEMENT:\n\
  • get_current_time        - Get the current time from the satellite\n\
  • set_time <timestamp>    - Set custom time for the satellite\n\n\
🔧 SATELLITE CONFIGURATION:\n\
  • update_light <value>    - Set light level (0-100)\n\
  • update_min_temp <value> - Set minimum temperature\n\
  • update_max_temp <value> - Set maximum temperature\n\
  • update_humidity <value> - Set humidity level (0-100)\n\
  • update_voltage <value>  - Set voltage level (0.1-3.3V)\n\n\
📝 LOG RETRIEVAL:\n\
  • get_sensor_logs <start> <end> - Request sensor logs between timestamps (MAX 10)\n\
  • get_events_logs <start> <end> - Request events logs between timestamps (MAX 10)\n\n\
ℹ️ HELP:\n\
  • help                    - Show this help message\n\n";

impl GroundStation {
    /// Parse one operator message and act on it. Replies, echoes, and
    /// errors all go back through `op`.
    pub fn handle_command(&self, message: &str, op: &Arc<dyn Operator>) {
        log::info!("Operator command: {}", message.trim_end());

        let mut tokens = message.split_whitespace();
        let command = tokens.next().unwrap_or("");

        match command {
            "get_sensor_data" => {
                let data = self.latest();
                op.send_text(&format!(
                    "Temperature: {}°C, Humidity: {}%, Light: {}%, Voltage: {}V, Mode: {}",
                    data.temp, data.humidity, data.light, data.voltage, data.mode
                ));
            }
            "get_recent_sensor_data" => {
                let data = self.latest();
                if data.timestamp > 0 {
                    let end = data.timestamp;
                    let start = end.saturating_sub(50);
                    self.request_sensor_range(start, end, op);
                    op.send_text("Retrieving sensor data from the last minute...");
                } else {
                    op.send_text("Error: No sensor data available yet. Wait for a beacon.");
                }
            }
            "update_light" => match tokens.next().and_then(|t| t.parse::<i64>().ok()) {
                Some(value) if (0..=100).contains(&value) => {
                    self.update_light(value as u8, op);
                    op.send_text(&format!("Light updated to {}%", value));
                }
                _ => op.send_text("Error: Light value must be between 0 and 100"),
            },
            "update_min_temp" => match tokens.next().and_then(|t| t.parse::<u8>().ok()) {
                Some(value) => {
                    self.update_min_temp(value, op);
                    op.send_text(&format!("Minimum temperature updated to {}°C", value));
                }
                None => op.send_text("Error: Invalid temperature value"),
            },
            "update_max_temp" => match tokens.next().and_then(|t| t.parse::<u8>().ok()) {
                Some(value) => {
                    self.update_max_temp(value, op);
                    op.send_text(&format!("Maximum temperature updated to {}°C", value));
                }
                None => op.send_text("Error: Invalid temperature value"),
            },
            "update_humidity" => match tokens.next().and_then(|t| t.parse::<i64>().ok()) {
                Some(value) if (0..=100).contains(&value) => {
                    self.update_humidity(value as u8, op);
                    op.send_text(&format!("Humidity updated to {}%", value));
                }
                Some(_) => op.send_text("Error: Humidity value must be between 0 and 100"),
                None => op.send_text("Error: Invalid humidity value"),
            },
            "update_voltage" => match tokens.next().and_then(|t| t.parse::<f32>().ok()) {
                Some(value) => {
                    if !(0.1..=3.3).contains(&value) {
                        op.send_text("Error: Voltage value must be between 0.1 and 3.3");
                    } else {
                        self.update_voltage(value, op);
                        op.send_text(&format!("Voltage updated to {:.6}V", value));
                    }
                }
                None => op.send_text("Error: Invalid voltage value"),
            },
            "get_sensor_logs" => match parse_range(&mut tokens) {
                Some((start, end)) => {
                    self.request_sensor_range(start, end, op);
                    op.send_text(&format!(
                        "Requested logs between {} and {}. Processing...",
                        start, end
                    ));
                }
                None => op.send_text(
                    "Error: Invalid timestamp values. Format: get_logs <start_timestamp> <end_timestamp>",
                ),
            },
            "get_events_logs" => match parse_range(&mut tokens) {
                Some((start, end)) => {
                    self.request_event_range(start, end, op);
                    op.send_text(&format!(
                        "Requested logs between {} and {}. Processing...",
                        start, end
                    ));
                }
                None => op.send_text(
                    "Error: Invalid timestamp values. Format: get_events_logs <start_timestamp> <end_timestamp>",
                ),
            },
            "get_current_time" => {
                self.request_current_time(op);
            }
            "set_time" => match tokens.next().and_then(|t| t.parse::<u32>().ok()) {
                Some(new_time) => {
                    let latest = self.latest();
                    if latest.timestamp > 0 && new_time < latest.timestamp {
                        op.send_text(&format!(
                            "Error: Cannot set time before the latest sensor data timestamp ({})",
                            latest.timestamp
                        ));
                    } else {
                        self.send_custom_time(new_time);
                        op.send_text(&format!(
                            "\nSet custom time to:{}\n",
                            display::format_timestamp(new_time)
                        ));
                    }
                }
                None => op.send_text("Error: Invalid time value. Format: set_time <unix_timestamp>"),
            },
            "help" => op.send_text(HELP_TEXT),
            _ => op.send_text(&format!(
                "Unknown command: {}. Type 'help' for available commands.",
                command
            )),
        }
    }
}

fn parse_range<'a, I>(tokens: &mut I) -> Option<(u32, u32)>
where
    I: Iterator<Item = &'a str>,
{
    let start = tokens.next()?.parse().ok()?;
    let end = tokens.next()?.parse().ok()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::END_MARK;
    use crate::transport::{LoopbackTransport, Transport};
    use std::sync::Mutex;

    struct TestOperator {
        inbox: Mutex<Vec<String>>,
    }

    impl TestOperator {
        fn new() -> Arc<TestOperator> {
            Arc::new(TestOperator {
                inbox: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.inbox.lock().unwrap().clone()
        }
    }

    impl Operator for TestOperator {
        fn send_text(&self, text: &str) {
            self.inbox.lock().unwrap().push(text.to_string());
        }
    }

    fn setup() -> (GroundStation, LoopbackTransport, Arc<TestOperator>, Arc<dyn Operator>) {
        let (ground, sat) = LoopbackTransport::pair();
        let station = GroundStation::new(Box::new(ground));
        let op = TestOperator::new();
        let handle: Arc<dyn Operator> = op.clone();
        (station, sat, op, handle)
    }

    fn read_packet(sat: &mut LoopbackTransport) -> Vec<u8> {
        let mut buf = [0u8; 64];
        let n = sat.recv(&mut buf).unwrap();
        assert!(n > 0, "expected a packet on the link");
        buf[..n].to_vec()
    }

    fn assert_no_traffic(sat: &mut LoopbackTransport) {
        let mut buf = [0u8; 64];
        assert_eq!(sat.recv(&mut buf).unwrap(), 0);
    }

    const BEACON_FRAME: [u8; 17] = [
        0x10, 0x01, 0xFF, 0x00, 0x14, 0x2D, 0x32, 0x03, 0x66, 0x66, 0x06, 0x40, 0x80, 0x96, 0x98,
        0x00, 0x55,
    ];

    #[test]
    fn voltage_out_of_range_is_rejected_without_wire_traffic() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("update_voltage 5.0", &handle);

        assert_eq!(
            op.messages(),
            vec!["Error: Voltage value must be between 0.1 and 3.3".to_string()]
        );
        assert_no_traffic(&mut sat);
    }

    #[test]
    fn voltage_in_range_is_sent_and_echoed() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("update_voltage 2.5", &handle);

        let packet = read_packet(&mut sat);
        assert_eq!(packet[1], 0x05);
        assert_eq!(&packet[4..8], &2.5f32.to_le_bytes());
        assert_eq!(
            op.messages(),
            vec!["Voltage updated to 2.500000V".to_string()]
        );
    }

    #[test]
    fn set_time_before_latest_beacon_is_rejected() {
        let (station, mut sat, op, handle) = setup();
        station.handle_frame(BEACON_FRAME.to_vec());

        station.handle_command("set_time 9999999", &handle);
        assert_eq!(
            op.messages(),
            vec![
                "Error: Cannot set time before the latest sensor data timestamp (10000000)"
                    .to_string()
            ]
        );
        assert_no_traffic(&mut sat);
    }

    #[test]
    fn set_time_sends_and_echoes() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("set_time 20000000", &handle);

        let packet = read_packet(&mut sat);
        assert_eq!(packet[1], 0x02);
        assert_eq!(&packet[4..8], &20_000_000u32.to_le_bytes());
        assert_eq!(*packet.last().unwrap(), END_MARK);

        let messages = op.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("\nSet custom time to:"));
    }

    #[test]
    fn light_range_and_echo() {
        let (station, mut sat, op, handle) = setup();

        station.handle_command("update_light 80", &handle);
        let packet = read_packet(&mut sat);
        assert_eq!(packet[1], 0x06);
        assert_eq!(packet[4], 80);

        station.handle_command("update_light 101", &handle);
        station.handle_command("update_light abc", &handle);
        assert_no_traffic(&mut sat);

        assert_eq!(
            op.messages(),
            vec![
                "Light updated to 80%".to_string(),
                "Error: Light value must be between 0 and 100".to_string(),
                "Error: Light value must be between 0 and 100".to_string(),
            ]
        );
    }

    #[test]
    fn humidity_parse_and_range_errors_are_distinct() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("update_humidity abc", &handle);
        station.handle_command("update_humidity 120", &handle);
        assert_no_traffic(&mut sat);

        assert_eq!(
            op.messages(),
            vec![
                "Error: Invalid humidity value".to_string(),
                "Error: Humidity value must be between 0 and 100".to_string(),
            ]
        );
    }

    #[test]
    fn temperature_updates_echo_and_reject_garbage() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("update_min_temp 5", &handle);
        station.handle_command("update_max_temp 40", &handle);
        station.handle_command("update_max_temp warm", &handle);

        assert_eq!(read_packet(&mut sat)[1], 0x03);
        assert_eq!(read_packet(&mut sat)[1], 0x0A);
        assert_no_traffic(&mut sat);

        assert_eq!(
            op.messages(),
            vec![
                "Minimum temperature updated to 5°C".to_string(),
                "Maximum temperature updated to 40°C".to_string(),
                "Error: Invalid temperature value".to_string(),
            ]
        );
    }

    #[test]
    fn sensor_log_request_echoes_and_sends() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("get_sensor_logs 100 200", &handle);

        let packet = read_packet(&mut sat);
        assert_eq!(packet[1], 0x13);
        assert_eq!(
            op.messages(),
            vec!["Requested logs between 100 and 200. Processing...".to_string()]
        );
    }

    #[test]
    fn malformed_log_requests_are_rejected() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("get_sensor_logs 100", &handle);
        station.handle_command("get_events_logs x y", &handle);
        assert_no_traffic(&mut sat);

        let messages = op.messages();
        assert!(messages[0].starts_with("Error: Invalid timestamp values."));
        assert!(messages[1].contains("get_events_logs <start_timestamp>"));
    }

    #[test]
    fn recent_data_needs_a_beacon_first() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("get_recent_sensor_data", &handle);
        assert_no_traffic(&mut sat);
        assert_eq!(
            op.messages(),
            vec!["Error: No sensor data available yet. Wait for a beacon.".to_string()]
        );
    }

    #[test]
    fn recent_data_requests_the_trailing_window() {
        let (station, mut sat, op, handle) = setup();
        station.handle_frame(BEACON_FRAME.to_vec());

        station.handle_command("get_recent_sensor_data", &handle);
        let packet = read_packet(&mut sat);
        assert_eq!(packet[1], 0x13);
        assert_eq!(&packet[4..8], &9_999_950u32.to_le_bytes());
        assert_eq!(&packet[8..12], &10_000_000u32.to_le_bytes());
        assert_eq!(
            op.messages(),
            vec!["Retrieving sensor data from the last minute...".to_string()]
        );
    }

    #[test]
    fn latest_snapshot_summary() {
        let (station, _sat, op, handle) = setup();
        station.handle_frame(BEACON_FRAME.to_vec());
        station.handle_command("get_sensor_data", &handle);

        let messages = op.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Temperature: 20°C"));
        assert!(messages[0].contains("Humidity: 45%"));
        assert!(messages[0].contains("Mode: OK"));
    }

    #[test]
    fn help_and_unknown_commands() {
        let (station, mut sat, op, handle) = setup();
        station.handle_command("help", &handle);
        station.handle_command("reboot_satellite", &handle);
        assert_no_traffic(&mut sat);

        let messages = op.messages();
        assert!(messages[0].contains("SATELLITE COMMAND CENTER"));
        assert_eq!(
            messages[1],
            "Unknown command: reboot_satellite. Type 'help' for available commands."
        );
    }
}
