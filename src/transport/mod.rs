//! Link transport layer: the duplex byte channel to the satellite.

use crate::error::Result;

mod loopback;
mod serial;

pub use loopback::LoopbackTransport;
pub use serial::SerialTransport;

/// Duplex byte channel to the satellite.
///
/// `recv` returning zero means no data arrived within the transport's
/// polling window; the caller just tries again. Errors are transient from
/// the dispatcher's point of view: it logs them and keeps listening.
pub trait Transport: Send {
    /// Read available bytes into `buf`, returning the count.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer, returning the count.
    fn send(&mut self, data: &[u8]) -> Result<usize>;
}
