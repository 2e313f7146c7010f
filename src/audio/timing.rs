// Audio clock - Monotonic time source for note scheduling
// All scheduling timestamps are audio-clock seconds, never wall-clock

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic audio clock read
pub trait AudioClock: Send {
    /// Current time in seconds
    fn now(&self) -> f64;
}

/// Shared audio timing state
/// The sample counter is advanced by the audio callback and read by the scheduler
#[derive(Clone)]
pub struct AudioTiming {
    /// Current sample position (incremented by audio callback)
    sample_position: Arc<AtomicU64>,
    /// Sample rate (for timestamp conversions)
    sample_rate: f64,
}

impl AudioTiming {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Get current sample position
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Relaxed)
    }

    /// Advance sample position (called from audio callback)
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Convert an audio-clock timestamp to an absolute sample position
    /// Negative timestamps map to sample 0
    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate).round() as u64
    }
}

impl AudioClock for AudioTiming {
    fn now(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }
}

/// Externally driven clock
/// Clones share the same time, so a test or offline renderer can move time
/// forward while the sequencer owns another handle.
#[derive(Clone, Default)]
pub struct ManualClock {
    seconds_bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_seconds: f64) -> Self {
        Self {
            seconds_bits: Arc::new(AtomicU64::new(start_seconds.to_bits())),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.seconds_bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds_bits.load(Ordering::Relaxed))
    }
}
