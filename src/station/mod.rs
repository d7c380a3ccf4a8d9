//! Ground-station dispatch engine.
//!
//! [`GroundStation`] owns the packet codec, frame reader, correlator,
//! sensor index, and id allocator. It drives the link listen loop,
//! classifies inbound frames by response type, and translates operator
//! requests into outbound packets.

mod commands;
mod correlator;
mod ids;
mod index;

pub use correlator::Correlator;
pub use ids::IdAllocator;
pub use index::SensorIndex;

use crate::protocol::display;
use crate::protocol::framer::{FrameEvent, FrameReader, MAX_FRAME_LEN};
use crate::protocol::packet::{self, MessagePacket};
use crate::protocol::{ResponseType, SensorReading, PACKET_HEADER_SIZE, SATELLITE_ID};
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Back-channel to a connected operator.
///
/// The gateway owns the strong reference; the correlator keeps only weak
/// handles, so delivery to a disconnected operator is a silent drop.
pub trait Operator: Send + Sync {
    fn send_text(&self, text: &str);
}

/// The dispatch engine: one per link.
pub struct GroundStation {
    link: Mutex<Box<dyn Transport>>,
    ids: IdAllocator,
    correlator: Correlator,
    index: SensorIndex,
    latest: Mutex<SensorReading>,
}

impl GroundStation {
    pub fn new(link: Box<dyn Transport>) -> Self {
        GroundStation {
            link: Mutex::new(link),
            ids: IdAllocator::new(),
            correlator: Correlator::new(),
            index: SensorIndex::new(),
            latest: Mutex::new(SensorReading::default()),
        }
    }

    /// The most recent beacon reading (zero-valued before the first beacon).
    pub fn latest(&self) -> SensorReading {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Historical sensor readings collected from log retrievals.
    pub fn index(&self) -> &SensorIndex {
        &self.index
    }

    // ------------------------------------------------------------------
    // Listen loop (inbound)
    // ------------------------------------------------------------------

    /// Drive the link until `running` clears.
    ///
    /// Reads one byte at a time, feeds the frame reader, and handles each
    /// emitted event before the next byte is consumed. No error on this
    /// path is fatal: transport faults are logged and the loop continues.
    pub fn listen(&self, running: &AtomicBool) {
        let mut reader = FrameReader::new();
        let mut byte = [0u8; 1];

        while running.load(Ordering::Relaxed) {
            let received = {
                let mut link = self.link.lock().unwrap_or_else(PoisonError::into_inner);
                link.recv(&mut byte)
            };

            match received {
                Ok(0) => continue,
                Ok(_) => {
                    if let Some(event) = reader.push(byte[0]) {
                        self.handle_link_event(event);
                    }
                }
                Err(e) => {
                    log::error!("Link read error: {}", e);
                    thread::sleep(Duration::from_millis(10));
                }
            }
        }

        log::info!("Listen loop exiting");
    }

    fn handle_link_event(&self, event: FrameEvent) {
        match event {
            FrameEvent::Text(line) => {
                if line.len() > 1 {
                    print!("Satellite Debug: {}", line);
                }
            }
            FrameEvent::Frame(frame) => self.handle_frame(frame),
            FrameEvent::Overrun => {
                log::warn!("Binary frame exceeded {} bytes, dropped", MAX_FRAME_LEN);
            }
        }
    }

    /// Classify one binary frame and run its handler.
    pub fn handle_frame(&self, mut frame: Vec<u8>) {
        if frame.len() < PACKET_HEADER_SIZE {
            log::warn!("Dropping short frame ({} bytes)", frame.len());
            return;
        }

        // Event frames arrive without their length byte, so the reader
        // hands us nine bytes; rebuild the self-describing ten-byte frame
        // before classification. This is the only packet shape that needs
        // fixing up.
        if frame.len() == 9 {
            frame.insert(0, 10);
        }

        let id = packet::response_id(&frame);
        match packet::response_type(&frame) {
            Some(ResponseType::TimeRequest) => self.handle_time_request(),
            Some(ResponseType::Beacon) => self.handle_beacon(&frame),
            Some(ResponseType::SensorLog) => self.handle_sensor_log(&frame, id),
            Some(ResponseType::TotalLogs) => self.handle_sensor_log_end(id),
            Some(ResponseType::Ack) => self.handle_ack(id),
            Some(ResponseType::Nack) => self.handle_nack(id),
            Some(ResponseType::Event) => self.handle_event(&frame),
            Some(ResponseType::EventLog) => self.handle_event_log(&frame, id),
            Some(ResponseType::EventLogEnd) => self.handle_event_log_end(id),
            Some(ResponseType::ResponseCurrentTime) => self.handle_current_time(&frame, id),
            _ => {
                log::warn!("Unknown response type: {}", frame[1]);
            }
        }
    }

    fn handle_time_request(&self) {
        self.send_current_time();
    }

    fn handle_beacon(&self, frame: &[u8]) {
        match packet::parse_sensor(frame) {
            Ok(reading) => {
                // Beacons are ephemeral state, not history: update the
                // latest snapshot and leave the index alone.
                *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = reading;
                display::print_beacon(&reading);
            }
            Err(e) => log::warn!("Bad beacon payload: {}", e),
        }
    }

    fn handle_sensor_log(&self, frame: &[u8], id: u8) {
        let reading = match packet::parse_sensor(frame) {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("Bad sensor log payload: {}", e);
                return;
            }
        };
        self.index.insert(reading);

        if let Some(op) = self.correlator.peek(id) {
            op.send_text(&format!(
                "\nSensor log data:\n{}",
                display::sensor_reading_to_string(&reading)
            ));
        }
    }

    fn handle_sensor_log_end(&self, id: u8) {
        if let Some(op) = self.correlator.complete(id) {
            op.send_text("Completed retrieval of sensor logs.\n");
        }
    }

    fn handle_ack(&self, id: u8) {
        if let Some(op) = self.correlator.complete(id) {
            // Text matches the deployed operator tooling, typo included.
            op.send_text("Sucess operation");
        }
    }

    fn handle_nack(&self, id: u8) {
        if let Some(op) = self.correlator.complete(id) {
            op.send_text("Request failed. Please try again.");
        }
    }

    fn handle_event(&self, frame: &[u8]) {
        println!("Event");
        match packet::parse_event(frame) {
            Ok(record) => display::print_event(&record),
            Err(e) => log::warn!("Bad event payload: {}", e),
        }
    }

    fn handle_event_log(&self, frame: &[u8], id: u8) {
        let record = match packet::parse_event(frame) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Bad event log payload: {}", e);
                return;
            }
        };
        display::print_event(&record);

        if let Some(op) = self.correlator.peek(id) {
            op.send_text(&format!(
                "\nEvent log data:\n{}",
                display::event_record_to_string(&record)
            ));
        }
    }

    fn handle_event_log_end(&self, id: u8) {
        if let Some(op) = self.correlator.complete(id) {
            op.send_text("\nCompleted retrieval of events logs.\n");
        }
    }

    fn handle_current_time(&self, frame: &[u8], id: u8) {
        if let Some(op) = self.correlator.complete(id) {
            if frame.len() < 8 {
                log::warn!("Short current-time response ({} bytes)", frame.len());
                return;
            }
            let mut stamp = [0u8; 4];
            stamp.copy_from_slice(&frame[4..8]);
            let current = u32::from_le_bytes(stamp);
            op.send_text(&format!(
                "Current time: {}\n",
                display::format_timestamp(current)
            ));
        }
    }

    // ------------------------------------------------------------------
    // Outbound commands
    // ------------------------------------------------------------------

    /// Reply to a satellite time request with the ground clock.
    pub fn send_current_time(&self) {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        log::info!("Sending time {}", epoch);
        self.send_custom_time(epoch);
    }

    /// Push an operator-chosen clock value to the satellite.
    pub fn send_custom_time(&self, custom_time: u32) {
        let mut packet = MessagePacket::new(ResponseType::TimeSend, self.ids.next_id());
        packet.push_u32(custom_time);
        self.send_packet(packet);
    }

    pub fn update_max_temp(&self, max_temp: u8, op: &Arc<dyn Operator>) {
        self.send_update_u8(ResponseType::UpdateMaxTemp, max_temp, op);
    }

    pub fn update_min_temp(&self, min_temp: u8, op: &Arc<dyn Operator>) {
        self.send_update_u8(ResponseType::UpdateMinTemp, min_temp, op);
    }

    pub fn update_humidity(&self, humidity: u8, op: &Arc<dyn Operator>) {
        self.send_update_u8(ResponseType::UpdateHumidity, humidity, op);
    }

    pub fn update_light(&self, light: u8, op: &Arc<dyn Operator>) {
        self.send_update_u8(ResponseType::UpdateLight, light, op);
    }

    pub fn update_voltage(&self, voltage: f32, op: &Arc<dyn Operator>) {
        let mut packet = MessagePacket::new(ResponseType::UpdateVoltage, self.ids.next_id());
        packet.push_f32(voltage);
        self.correlator.register(packet.response_id, op);
        self.send_packet(packet);
    }

    /// Request sensor logs in `[start, end]`; replies stream back to `op`.
    pub fn request_sensor_range(&self, start: u32, end: u32, op: &Arc<dyn Operator>) {
        self.send_range_request(ResponseType::RequestSensorLogs, start, end, op);
    }

    /// Request event logs in `[start, end]`; replies stream back to `op`.
    pub fn request_event_range(&self, start: u32, end: u32, op: &Arc<dyn Operator>) {
        self.send_range_request(ResponseType::RequestEventLog, start, end, op);
    }

    /// Ask the satellite for its clock; the reply goes to `op`.
    pub fn request_current_time(&self, op: &Arc<dyn Operator>) {
        let mut packet = MessagePacket::new(ResponseType::RequestCurrentTime, self.ids.next_id());
        // The flight firmware has only ever seen the padded nine-byte form
        // of this request; keep the four spare bytes for wire compatibility.
        packet.push_u32(0);
        self.correlator.register(packet.response_id, op);
        self.send_packet(packet);
    }

    fn send_update_u8(&self, packet_type: ResponseType, value: u8, op: &Arc<dyn Operator>) {
        let mut packet = MessagePacket::new(packet_type, self.ids.next_id());
        packet.push_u8(value);
        self.correlator.register(packet.response_id, op);
        self.send_packet(packet);
    }

    fn send_range_request(
        &self,
        packet_type: ResponseType,
        start: u32,
        end: u32,
        op: &Arc<dyn Operator>,
    ) {
        let mut packet = MessagePacket::new(packet_type, self.ids.next_id());
        packet.push_u32(start);
        packet.push_u32(end);
        self.correlator.register(packet.response_id, op);
        self.send_packet(packet);
    }

    /// Serialize and write one packet; the link mutex keeps its bytes
    /// contiguous on the wire against concurrent senders.
    fn send_packet(&self, mut packet: MessagePacket) {
        // 0xFF marks satellite-originated traffic and must never go out on
        // a ground command.
        if packet.response_id == SATELLITE_ID {
            packet.response_id = self.ids.next_id();
        }

        let bytes = packet.encode();
        let mut link = self.link.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = link.send(&bytes) {
            log::error!("Link write error: {}", e);
        }
    }
}
