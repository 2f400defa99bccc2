//! Atomic floating-point cell shared with the audio callback.

use std::sync::atomic::{AtomicU64, Ordering};

/// Provides atomic load/store for f64 values.
///
/// Uses atomic u64 operations internally by bit-casting the f64, so it is
/// lock-free and safe to touch from a real-time callback.
#[derive(Debug)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    /// Creates a new AtomicF64 with the given initial value.
    pub const fn new(val: f64) -> Self {
        Self {
            bits: AtomicU64::new(val.to_bits()),
        }
    }

    /// Atomically loads and returns the f64 value.
    #[inline]
    pub fn load(&self, ordering: Ordering) -> f64 {
        f64::from_bits(self.bits.load(ordering))
    }

    /// Atomically stores the given f64 value.
    #[inline]
    pub fn store(&self, val: f64, ordering: Ordering) {
        self.bits.store(val.to_bits(), ordering);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}
