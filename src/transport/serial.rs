//! Serial transport implementation

use super::Transport;
use crate::error::Result;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// Serial transport for the satellite UART link
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port in raw 8-N-1 mode
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        // The read timeout bounds how long the dispatcher holds the link
        // mutex per poll; writers on operator threads must get a turn.
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(50))
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<usize> {
        self.port.write_all(data)?;
        Ok(data.len())
    }
}
