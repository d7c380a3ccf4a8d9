//! Packet codec: outbound packet construction and typed payload parsers.

use super::{
    EventKind, EventRecord, Mode, ResponseType, SensorReading, END_MARK, PACKET_HEADER_SIZE,
    SATELLITE_ID,
};
use crate::error::{Error, Result};

/// Offset of the payload's first byte within a frame.
const PAYLOAD_OFFSET: usize = 4;

/// Outbound message packet.
///
/// Build one with [`MessagePacket::new`], append payload scalars with the
/// `push_*` methods (each bumps `data_len` by the exact byte count), then
/// serialize with [`MessagePacket::encode`].
#[derive(Debug, Clone)]
pub struct MessagePacket {
    /// Total on-wire length, inclusive of header and end marker.
    pub data_len: u8,
    pub packet_type: ResponseType,
    pub response_id: u8,
    /// Reserved. Zero-filled on every packet and never verified.
    pub checksum: u8,
    payload: Vec<u8>,
}

impl MessagePacket {
    pub fn new(packet_type: ResponseType, response_id: u8) -> Self {
        MessagePacket {
            data_len: PACKET_HEADER_SIZE as u8,
            packet_type,
            response_id,
            checksum: 0x00,
            payload: Vec::new(),
        }
    }

    pub fn push_u8(&mut self, value: u8) {
        self.push_bytes(&[value]);
    }

    pub fn push_u32(&mut self, value: u32) {
        self.push_bytes(&value.to_le_bytes());
    }

    pub fn push_f32(&mut self, value: f32) {
        self.push_bytes(&value.to_le_bytes());
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.payload.extend_from_slice(bytes);
        self.data_len = self.data_len.wrapping_add(bytes.len() as u8);
    }

    /// Serialize to exactly `data_len` bytes:
    /// `[data_len, type, id, checksum, payload..., end_mark]`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.data_len as usize);
        buffer.push(self.data_len);
        buffer.push(self.packet_type.wire());
        buffer.push(self.response_id);
        buffer.push(self.checksum);
        buffer.extend_from_slice(&self.payload);
        buffer.push(END_MARK);
        buffer
    }
}

/// Extract the response type, or `None` for frames too short to carry one
/// or carrying a code outside the registry.
pub fn response_type(frame: &[u8]) -> Option<ResponseType> {
    frame.get(1).copied().and_then(ResponseType::from_wire)
}

/// Extract the correlation id. Frames shorter than the header never reach
/// the handlers, so a missing byte maps to the satellite sentinel.
pub fn response_id(frame: &[u8]) -> u8 {
    frame.get(2).copied().unwrap_or(SATELLITE_ID)
}

/// Parse the sensor reading carried by beacon and sensor-log frames.
///
/// Layout after the header: `temp, humid, light, mode` at 4..8, `voltage`
/// (f32) at 8..12, `timestamp` (u32) at 12..16.
pub fn parse_sensor(frame: &[u8]) -> Result<SensorReading> {
    if frame.len() < 16 {
        return Err(Error::Frame(format!(
            "sensor payload needs 16 bytes, got {}",
            frame.len()
        )));
    }

    let mode = Mode::from_wire(frame[7])
        .ok_or_else(|| Error::Frame(format!("unknown mode 0x{:02X}", frame[7])))?;

    let mut voltage = [0u8; 4];
    voltage.copy_from_slice(&frame[8..12]);
    let mut timestamp = [0u8; 4];
    timestamp.copy_from_slice(&frame[12..16]);

    Ok(SensorReading {
        timestamp: u32::from_le_bytes(timestamp),
        temp: frame[PAYLOAD_OFFSET],
        humidity: frame[5],
        light: frame[6],
        mode,
        voltage: f32::from_le_bytes(voltage),
    })
}

/// Parse the event record carried by event and event-log frames.
///
/// Layout after the header: event code at 4, `timestamp` (u32) at 5..9.
pub fn parse_event(frame: &[u8]) -> Result<EventRecord> {
    if frame.len() < 9 {
        return Err(Error::Frame(format!(
            "event payload needs 9 bytes, got {}",
            frame.len()
        )));
    }

    let event = EventKind::from_wire(frame[PAYLOAD_OFFSET]).ok_or_else(|| {
        Error::Frame(format!("unknown event code {}", frame[PAYLOAD_OFFSET]))
    })?;

    let mut timestamp = [0u8; 4];
    timestamp.copy_from_slice(&frame[5..9]);

    Ok(EventRecord {
        timestamp: u32::from_le_bytes(timestamp),
        event,
    })
}

/// A frame is well-formed iff it is non-empty, at least header-sized, ends
/// with the end marker, and its length byte matches its actual length.
pub fn is_well_formed(frame: &[u8]) -> bool {
    !frame.is_empty()
        && frame.len() >= PACKET_HEADER_SIZE
        && frame.last() == Some(&END_MARK)
        && frame.len() == frame[0] as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Beacon frame: temp=20, humid=45, light=50, mode=OK, voltage=2.1,
    /// timestamp=10_000_000.
    const BEACON_FRAME: [u8; 17] = [
        0x11, 0x01, 0xFF, 0x00, 0x14, 0x2D, 0x32, 0x03, 0x66, 0x66, 0x06, 0x40, 0x80, 0x96, 0x98,
        0x00, 0x55,
    ];

    #[test]
    fn encode_layout() {
        let mut packet = MessagePacket::new(ResponseType::TimeSend, 7);
        packet.push_u32(0x0102_0304);
        let bytes = packet.encode();

        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 9); // data_len includes header + end mark
        assert_eq!(bytes[1], 0x02);
        assert_eq!(bytes[2], 7);
        assert_eq!(bytes[3], 0x00);
        assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]); // little-endian
        assert_eq!(bytes[8], END_MARK);
    }

    #[test]
    fn builder_packets_are_well_formed() {
        let mut range = MessagePacket::new(ResponseType::RequestSensorLogs, 1);
        range.push_u32(100);
        range.push_u32(200);
        assert!(is_well_formed(&range.encode()));

        let mut single = MessagePacket::new(ResponseType::UpdateLight, 2);
        single.push_u8(80);
        assert!(is_well_formed(&single.encode()));

        let mut voltage = MessagePacket::new(ResponseType::UpdateVoltage, 3);
        voltage.push_f32(2.5);
        assert!(is_well_formed(&voltage.encode()));

        let empty = MessagePacket::new(ResponseType::RequestCurrentTime, 4);
        assert!(is_well_formed(&empty.encode()));
    }

    #[test]
    fn parse_sensor_reads_all_fields() {
        let reading = parse_sensor(&BEACON_FRAME).unwrap();
        assert_eq!(reading.temp, 20);
        assert_eq!(reading.humidity, 45);
        assert_eq!(reading.light, 50);
        assert_eq!(reading.mode, Mode::Ok);
        assert!((reading.voltage - 2.1).abs() < 1e-6);
        assert_eq!(reading.timestamp, 10_000_000);
    }

    #[test]
    fn sensor_round_trip() {
        let reading = parse_sensor(&BEACON_FRAME).unwrap();

        let mut packet = MessagePacket::new(ResponseType::Beacon, SATELLITE_ID);
        packet.push_u8(reading.temp);
        packet.push_u8(reading.humidity);
        packet.push_u8(reading.light);
        packet.push_u8(reading.mode.wire());
        packet.push_f32(reading.voltage);
        packet.push_u32(reading.timestamp);

        assert_eq!(packet.encode(), BEACON_FRAME.to_vec());
    }

    #[test]
    fn event_round_trip() {
        let frame: [u8; 10] = [0x0A, 0x07, 0xFF, 0x00, 0x02, 0xA0, 0x86, 0x01, 0x00, 0x55];
        let record = parse_event(&frame).unwrap();
        assert_eq!(record.event, EventKind::WatchdogReset);
        assert_eq!(record.timestamp, 100_000);

        let mut packet = MessagePacket::new(ResponseType::Event, SATELLITE_ID);
        packet.push_u8(record.event.wire());
        packet.push_u32(record.timestamp);
        assert_eq!(packet.encode(), frame.to_vec());
    }

    #[test]
    fn parse_rejects_short_frames() {
        assert!(parse_sensor(&BEACON_FRAME[..15]).is_err());
        assert!(parse_event(&[0x05, 0x07, 0xFF, 0x00, 0x55]).is_err());
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        let mut bad_mode = BEACON_FRAME;
        bad_mode[7] = 0x09;
        assert!(parse_sensor(&bad_mode).is_err());

        let bad_event: [u8; 10] = [0x0A, 0x07, 0xFF, 0x00, 0x42, 0x00, 0x00, 0x00, 0x00, 0x55];
        assert!(parse_event(&bad_event).is_err());
    }

    #[test]
    fn response_type_extraction() {
        assert_eq!(response_type(&BEACON_FRAME), Some(ResponseType::Beacon));
        assert_eq!(response_type(&[0x01]), None);
        assert_eq!(response_type(&[]), None);
        assert_eq!(response_type(&[0x05, 0x0B, 0x00, 0x00, 0x55]), None);
    }

    #[test]
    fn response_id_extraction() {
        assert_eq!(response_id(&BEACON_FRAME), 0xFF);
        let frame = [0x05, 0x08, 0x2A, 0x00, 0x55];
        assert_eq!(response_id(&frame), 0x2A);
    }

    #[test]
    fn well_formedness() {
        assert!(is_well_formed(&BEACON_FRAME));
        assert!(!is_well_formed(&[]));
        assert!(!is_well_formed(&[0x04, 0x08, 0x00, 0x55])); // shorter than header
        assert!(!is_well_formed(&[0x05, 0x08, 0x00, 0x00, 0x54])); // bad end mark
        assert!(!is_well_formed(&[0x06, 0x08, 0x00, 0x00, 0x55])); // length mismatch
    }
}
