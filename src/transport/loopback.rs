//! In-memory loopback transport for hardware-free testing

use super::Transport;
use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::VecDeque;
use std::time::Duration;

/// How long a `recv` waits for the peer before reporting an empty read.
const POLL_WINDOW: Duration = Duration::from_millis(20);

/// One end of an in-memory duplex channel.
///
/// [`LoopbackTransport::pair`] returns the two ends; tests hold one as the
/// satellite and hand the other to the dispatcher. Writes arrive at the
/// peer in whole-packet chunks; reads drain a byte buffer so callers may
/// consume one byte at a time.
pub struct LoopbackTransport {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl LoopbackTransport {
    /// Create a connected pair of transports.
    pub fn pair() -> (LoopbackTransport, LoopbackTransport) {
        let (left_tx, left_rx) = unbounded();
        let (right_tx, right_rx) = unbounded();
        (
            LoopbackTransport {
                tx: left_tx,
                rx: right_rx,
                pending: VecDeque::new(),
            },
            LoopbackTransport {
                tx: right_tx,
                rx: left_rx,
                pending: VecDeque::new(),
            },
        )
    }
}

impl Transport for LoopbackTransport {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(POLL_WINDOW) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Link("loopback peer disconnected".to_string()))
                }
            }
        }

        let count = self.pending.len().min(buf.len());
        for slot in buf.iter_mut().take(count) {
            *slot = self.pending.pop_front().unwrap_or(0);
        }
        Ok(count)
    }

    fn send(&mut self, data: &[u8]) -> Result<usize> {
        self.tx
            .send(data.to_vec())
            .map_err(|_| Error::Link("loopback peer disconnected".to_string()))?;
        Ok(data.len())
    }
}
