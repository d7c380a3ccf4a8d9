//! Satellite wire protocol: shared types and constants.
//!
//! Packet format: `[DATA_LEN] [TYPE] [ID] [CHECKSUM] [PAYLOAD...] [0x55]`
//! where `DATA_LEN` counts every byte including the header and end marker.
//! All multi-byte payload scalars are little-endian, matching the
//! satellite's native layout.

pub mod display;
pub mod framer;
pub mod packet;

/// End marker terminating every binary packet.
pub const END_MARK: u8 = 0x55;

/// Fixed per-packet overhead: data_len + type + id + checksum + end mark.
pub const PACKET_HEADER_SIZE: usize = 5;

/// Correlation id reserved for satellite-originated packets (beacons,
/// asynchronous events). Never assigned to a ground-originated command.
pub const SATELLITE_ID: u8 = 0xFF;

/// Operating modes reported by the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Error = 0x01,
    Safe = 0x02,
    Ok = 0x03,
}

impl Mode {
    pub fn from_wire(value: u8) -> Option<Mode> {
        match value {
            0x01 => Some(Mode::Error),
            0x02 => Some(Mode::Safe),
            0x03 => Some(Mode::Ok),
            _ => None,
        }
    }

    pub fn wire(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Error => "Error",
            Mode::Safe => "Safe",
            Mode::Ok => "OK",
        };
        write!(f, "{}", name)
    }
}

/// Mode-transition and lifecycle events raised by the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    OkToError = 0,
    ErrorToOk = 1,
    WatchdogReset = 2,
    Init = 3,
    OkToSafe = 4,
    SafeToError = 5,
    SafeToOk = 6,
    ErrorToSafe = 7,
}

impl EventKind {
    pub fn from_wire(value: u8) -> Option<EventKind> {
        match value {
            0 => Some(EventKind::OkToError),
            1 => Some(EventKind::ErrorToOk),
            2 => Some(EventKind::WatchdogReset),
            3 => Some(EventKind::Init),
            4 => Some(EventKind::OkToSafe),
            5 => Some(EventKind::SafeToError),
            6 => Some(EventKind::SafeToOk),
            7 => Some(EventKind::ErrorToSafe),
            _ => None,
        }
    }

    pub fn wire(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::OkToError => "OK to Error",
            EventKind::ErrorToOk => "Error to OK",
            EventKind::WatchdogReset => "Watchdog Reset",
            EventKind::Init => "Initialization",
            EventKind::OkToSafe => "OK to Safe",
            EventKind::SafeToError => "Safe to Error",
            EventKind::SafeToOk => "Safe to OK",
            EventKind::ErrorToSafe => "Error to safe",
        };
        write!(f, "{}", name)
    }
}

/// Every packet kind exchanged with the satellite, by wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    Beacon = 0x01,
    TimeSend = 0x02,
    UpdateMinTemp = 0x03,
    UpdateHumidity = 0x04,
    UpdateVoltage = 0x05,
    UpdateLight = 0x06,
    Event = 0x07,
    Ack = 0x08,
    Nack = 0x09,
    UpdateMaxTemp = 0x0A,
    TimeRequest = 0x10,
    SensorLog = 0x11,
    TotalLogs = 0x12,
    RequestSensorLogs = 0x13,
    EventLog = 0x14,
    EventLogEnd = 0x15,
    RequestEventLog = 0x16,
    RequestCurrentTime = 0x17,
    ResponseCurrentTime = 0x18,
}

impl ResponseType {
    pub fn from_wire(value: u8) -> Option<ResponseType> {
        match value {
            0x01 => Some(ResponseType::Beacon),
            0x02 => Some(ResponseType::TimeSend),
            0x03 => Some(ResponseType::UpdateMinTemp),
            0x04 => Some(ResponseType::UpdateHumidity),
            0x05 => Some(ResponseType::UpdateVoltage),
            0x06 => Some(ResponseType::UpdateLight),
            0x07 => Some(ResponseType::Event),
            0x08 => Some(ResponseType::Ack),
            0x09 => Some(ResponseType::Nack),
            0x0A => Some(ResponseType::UpdateMaxTemp),
            0x10 => Some(ResponseType::TimeRequest),
            0x11 => Some(ResponseType::SensorLog),
            0x12 => Some(ResponseType::TotalLogs),
            0x13 => Some(ResponseType::RequestSensorLogs),
            0x14 => Some(ResponseType::EventLog),
            0x15 => Some(ResponseType::EventLogEnd),
            0x16 => Some(ResponseType::RequestEventLog),
            0x17 => Some(ResponseType::RequestCurrentTime),
            0x18 => Some(ResponseType::ResponseCurrentTime),
            _ => None,
        }
    }

    pub fn wire(self) -> u8 {
        self as u8
    }
}

/// One sensor sample as carried by beacons and sensor-log packets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Epoch seconds at which the satellite sampled the reading.
    pub timestamp: u32,
    /// Temperature in °C.
    pub temp: u8,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Light level in percent.
    pub light: u8,
    pub mode: Mode,
    /// Battery voltage in volts.
    pub voltage: f32,
}

impl Default for SensorReading {
    fn default() -> Self {
        SensorReading {
            timestamp: 0,
            temp: 0,
            humidity: 0,
            light: 0,
            mode: Mode::Ok,
            voltage: 0.0,
        }
    }
}

/// One satellite event as carried by event and event-log packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    /// Epoch seconds at which the event occurred.
    pub timestamp: u32,
    pub event: EventKind,
}
