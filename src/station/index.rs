//! In-memory, timestamp-sorted log of received sensor readings.

use crate::protocol::SensorReading;
use std::sync::{Mutex, PoisonError};

/// Mutex-guarded sorted container keyed by sample timestamp.
///
/// Inserts arrive from the dispatcher's inbound path while operator request
/// paths read; critical sections are a binary search plus a vector insert
/// or copy.
#[derive(Debug, Default)]
pub struct SensorIndex {
    readings: Mutex<Vec<SensorReading>>,
}

impl SensorIndex {
    pub fn new() -> Self {
        SensorIndex {
            readings: Mutex::new(Vec::with_capacity(100)),
        }
    }

    /// Insert a reading at its sorted position. A duplicate timestamp is a
    /// no-op; either way the insert counts as a success.
    pub fn insert(&self, reading: SensorReading) {
        let mut readings = self.lock();
        match readings.binary_search_by_key(&reading.timestamp, |r| r.timestamp) {
            Ok(_) => {}
            Err(pos) => readings.insert(pos, reading),
        }
    }

    /// Exact-match lookup by timestamp.
    pub fn get(&self, timestamp: u32) -> Option<SensorReading> {
        let readings = self.lock();
        readings
            .binary_search_by_key(&timestamp, |r| r.timestamp)
            .ok()
            .map(|pos| readings[pos])
    }

    /// The readings with `start <= timestamp <= end`.
    ///
    /// Returns `None` when the index is empty or `start` lies beyond the
    /// latest stored timestamp; otherwise the (possibly empty) slice.
    pub fn range(&self, start: u32, end: u32) -> Option<Vec<SensorReading>> {
        let readings = self.lock();
        let last = readings.last()?;
        if start > last.timestamp {
            return None;
        }

        let lower = readings.partition_point(|r| r.timestamp < start);
        let upper = readings.partition_point(|r| r.timestamp <= end);
        Some(readings[lower..upper].to_vec())
    }

    /// The most recent stored reading.
    pub fn latest(&self) -> Option<SensorReading> {
        self.lock().last().copied()
    }

    pub fn all(&self) -> Vec<SensorReading> {
        self.lock().clone()
    }

    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SensorReading>> {
        self.readings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
