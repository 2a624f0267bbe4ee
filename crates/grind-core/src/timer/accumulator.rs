//! Sub-second accumulation buffer.
//!
//! Ticks arrive in 10ms grains but mission counters are whole seconds.
//! The buffer carries the remainder forward so no grain is counted twice
//! or lost across flushes.

/// Millisecond remainder buffer, always in `[0, 1000)` between calls.
#[derive(Debug, Default)]
pub struct Accumulator {
    buffer_ms: u64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add elapsed milliseconds; returns the whole seconds extracted,
    /// keeping the remainder buffered.
    pub fn push(&mut self, delta_ms: u64) -> u64 {
        self.buffer_ms += delta_ms;
        if self.buffer_ms < 1000 {
            return 0;
        }
        let secs = self.buffer_ms / 1000;
        self.buffer_ms %= 1000;
        secs
    }

    /// Drop any buffered remainder. Called on explicit timer transitions.
    pub fn reset(&mut self) {
        self.buffer_ms = 0;
    }

    pub fn buffered_ms(&self) -> u64 {
        self.buffer_ms
    }
}
