//! Pending-request correlation between satellite replies and operators.

use super::Operator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Maps outstanding correlation ids to the operator awaiting the reply.
///
/// Holds only weak handles: the gateway owns the sessions, and an entry
/// must not keep a disconnected operator alive. A reply that finds a dead
/// handle is delivered nowhere.
#[derive(Default)]
pub struct Correlator {
    pending: Mutex<HashMap<u8, Weak<dyn Operator>>>,
}

impl Correlator {
    pub fn new() -> Self {
        Correlator::default()
    }

    /// Track `op` as the originator of request `id`. A collision overwrites:
    /// with 256 reusable ids, last writer wins.
    pub fn register(&self, id: u8, op: &Arc<dyn Operator>) {
        self.lock().insert(id, Arc::downgrade(op));
    }

    /// Remove the entry for `id` and return its operator, if both still
    /// exist. The entry is gone afterwards either way.
    pub fn complete(&self, id: u8) -> Option<Arc<dyn Operator>> {
        self.lock().remove(&id).and_then(|weak| weak.upgrade())
    }

    /// Return the operator for `id` without removing the entry.
    pub fn peek(&self, id: u8) -> Option<Arc<dyn Operator>> {
        self.lock().get(&id).and_then(|weak| weak.upgrade())
    }

    /// Whether an entry exists for `id`, live or not.
    pub fn is_pending(&self, id: u8) -> bool {
        self.lock().contains_key(&id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u8, Weak<dyn Operator>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
