// Timeline - Tempo and the fixed master grid
// Converts BPM into the 16th-note tick period the scheduler advances by

use super::{SequencerError, SequencerResult};
use std::fmt;

/// Number of slots in the shared master timeline (one bar of 16th notes x2)
pub const MASTER_STEPS: usize = 32;

/// Look-ahead window in seconds
/// Notes falling inside `now + LOOKAHEAD_SECONDS` are committed on the current tick
pub const LOOKAHEAD_SECONDS: f64 = 0.1;

/// Duration of every fired note, shared by all tracks
pub const NOTE_DURATION_SECONDS: f64 = 0.2;

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Creates a new tempo
    /// BPM must be finite and strictly positive
    pub fn new(bpm: f64) -> SequencerResult<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SequencerError::InvalidTempo(bpm));
        }
        Ok(Self { bpm })
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat (quarter note) in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Duration of one master step (16th note) in seconds
    pub fn seconds_per_sixteenth(&self) -> f64 {
        self.beat_duration_seconds() / 4.0
    }

    /// Duration of one full master cycle in seconds
    pub fn cycle_duration_seconds(&self) -> f64 {
        self.seconds_per_sixteenth() * MASTER_STEPS as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 120.0 }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}
