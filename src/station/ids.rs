//! Correlation id allocation.

use std::sync::{Mutex, PoisonError};

/// Hands out 8-bit correlation ids: a monotone counter mod 256, no gap
/// reclaim. After 256 unanswered requests ids repeat and the correlator's
/// last-writer-wins policy takes over.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: Mutex<u8>,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator::default()
    }

    /// Return the current counter and post-increment it.
    pub fn next_id(&self) -> u8 {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let id = *next;
        *next = next.wrapping_add(1);
        id
    }
}
