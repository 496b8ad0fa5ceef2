//! Process-wide single-flight gate for detection rounds.

use std::sync::atomic::{AtomicBool, Ordering};

/// Ensures at most one detection round is in flight system-wide.
///
/// Whichever node wins the compare-and-set claims the round and emits
/// the first probes; every other node's initiation attempt is a silent
/// no-op until the gate is released. Only the node that confirms the
/// cycle (receives its own probe back) releases the gate.
pub struct DetectionGate {
    running: AtomicBool,
}

impl Default for DetectionGate {
    fn default() -> Self {
        Self::new()
    }
}

// Compile-time assertion: DetectionGate is shared across node threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<DetectionGate>();
};

impl DetectionGate {
    /// Create a gate with no round in flight.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Attempt to claim the gate for a new round.
    ///
    /// Returns `true` for exactly one caller under concurrent attempts;
    /// all others get `false` until [`finish`](DetectionGate::finish).
    pub fn try_begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the gate after a round concludes.
    pub fn finish(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether a round is currently in flight.
    pub fn in_flight(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
